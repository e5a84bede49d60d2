use image::{GrayImage, Luma};

use super::integral::reflect_101;

const BINS: usize = 256;

/// Contrast-limited adaptive histogram equalization.
///
/// The image is divided into a `tile_grid x tile_grid` grid. Each tile gets an
/// equalization lookup table built from its clipped histogram, and every
/// pixel is mapped through a bilinear blend of the four nearest tile tables.
/// When the image does not divide evenly, the last tiles read mirrored pixels
/// (reflect-101) past the right and bottom edges.
pub fn clahe(image: &GrayImage, clip_limit: f32, tile_grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || tile_grid == 0 {
        return image.clone();
    }

    let tile_w = width.div_ceil(tile_grid);
    let tile_h = height.div_ceil(tile_grid);
    let tile_area = tile_w * tile_h;
    let clip = ((clip_limit * tile_area as f32 / BINS as f32) as u32).max(1);

    let mut luts = Vec::with_capacity((tile_grid * tile_grid) as usize);
    for ty in 0..tile_grid {
        for tx in 0..tile_grid {
            let mut hist = [0u32; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect_101(y as i64, height);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect_101(x as i64, width);
                    hist[image.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, clip);
            luts.push(equalization_lut(&hist, tile_area));
        }
    }

    let grid = tile_grid as i64;
    let axis = |pos: u32, tile: u32| -> (usize, usize, f32) {
        let f = pos as f32 / tile as f32 - 0.5;
        let lo = f.floor();
        let frac = f - lo;
        let lo = lo as i64;
        let first = lo.max(0) as usize;
        let second = (lo + 1).min(grid - 1) as usize;
        (first, second, frac)
    };

    GrayImage::from_fn(width, height, |x, y| {
        let (tx1, tx2, xa) = axis(x, tile_w);
        let (ty1, ty2, ya) = axis(y, tile_h);
        let v = image.get_pixel(x, y)[0] as usize;
        let lut = |tx: usize, ty: usize| luts[ty * tile_grid as usize + tx][v] as f32;

        let top = lut(tx1, ty1) * (1.0 - xa) + lut(tx2, ty1) * xa;
        let bottom = lut(tx1, ty2) * (1.0 - xa) + lut(tx2, ty2) * xa;
        let value = top * (1.0 - ya) + bottom * ya;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Cap every bin at `clip` and hand the excess back evenly. Whatever does
/// not divide evenly goes one count at a time to bins spaced across the range.
fn clip_histogram(hist: &mut [u32; BINS], clip: u32) {
    let mut clipped = 0u32;
    for count in hist.iter_mut() {
        if *count > clip {
            clipped += *count - clip;
            *count = clip;
        }
    }

    let batch = clipped / BINS as u32;
    let mut residual = clipped - batch * BINS as u32;
    for count in hist.iter_mut() {
        *count += batch;
    }

    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn equalization_lut(hist: &[u32; BINS], tile_area: u32) -> [u8; BINS] {
    let scale = 255.0 / tile_area as f32;
    let mut lut = [0u8; BINS];
    let mut cumulative = 0u32;
    for (i, count) in hist.iter().enumerate() {
        cumulative += count;
        lut[i] = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}
