use image::{GrayImage, Luma};

use super::integral::{clamp_coord, IntegralImage};

/// Binarize using the mean of each pixel's `block_size x block_size` neighbourhood.
///
/// A pixel becomes 255 when it is brighter than its local mean minus `offset`,
/// otherwise 0. The neighbourhood replicates edge pixels past the border and
/// the mean is rounded to an integer before comparison.
pub fn adaptive_mean_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let r = (block_size / 2) as i64;
    let area = (block_size * block_size) as f64;
    let integral = IntegralImage::from_fn(width + 2 * r as u32, height + 2 * r as u32, |px, py| {
        let x = clamp_coord(px as i64 - r, width);
        let y = clamp_coord(py as i64 - r, height);
        image.get_pixel(x, y)[0] as u64
    });

    GrayImage::from_fn(width, height, |x, y| {
        let sum = integral.sum(x, y, x + block_size, y + block_size);
        let mean = (sum as f64 / area).round() as i32;
        let value = image.get_pixel(x, y)[0] as i32;
        if value > mean - offset {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
