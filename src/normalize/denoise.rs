use image::{GrayImage, Luma};
use rayon::prelude::*;

use super::integral::{reflect_101, IntegralImage};

/// Non-local means parameters
#[derive(Debug, Clone, Copy)]
pub struct NlMeansParams {
    /// Filter strength; larger removes more noise and more detail
    pub h: f32,
    /// Side of the square patch compared between pixels (odd)
    pub template_window: u32,
    /// Side of the square area searched for similar patches (odd)
    pub search_window: u32,
}

impl Default for NlMeansParams {
    fn default() -> Self {
        Self {
            h: 10.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

/// Non-local means denoising of a grayscale image.
///
/// Every output pixel is a weighted average of the pixels in its search
/// window, weighted by `exp(-d / h^2)` where `d` is the mean squared
/// difference between the two surrounding template patches. Patch distances
/// are taken from one summed-area table per search offset, and the rows of
/// each offset are accumulated in parallel. Pixels outside the image are
/// mirrored without repeating the edge (reflect-101).
pub fn non_local_means(image: &GrayImage, params: NlMeansParams) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let t = (params.template_window / 2) as i64;
    let s = (params.search_window / 2) as i64;
    let patch_area = (params.template_window * params.template_window) as u64;
    let weights = WeightTable::new(params.h);

    // Distances are needed for every template pixel around every output pixel
    let region_w = width + 2 * t as u32;
    let region_h = height + 2 * t as u32;
    let pixel = |x: i64, y: i64| -> i64 {
        image.get_pixel(reflect_101(x, width), reflect_101(y, height))[0] as i64
    };

    let row_len = width as usize;
    let len = row_len * height as usize;
    let mut weight_sums = vec![0f32; len];
    let mut value_sums = vec![0f32; len];
    let mut integral = IntegralImage::default();

    for dy in -s..=s {
        for dx in -s..=s {
            integral.rebuild(region_w, region_h, |rx, ry| {
                let x = rx as i64 - t;
                let y = ry as i64 - t;
                let diff = pixel(x, y) - pixel(x + dx, y + dy);
                (diff * diff) as u64
            });

            let integral = &integral;
            weight_sums
                .par_chunks_mut(row_len)
                .zip(value_sums.par_chunks_mut(row_len))
                .enumerate()
                .for_each(|(y, (weight_row, value_row))| {
                    let y = y as u32;
                    for x in 0..width {
                        let ssd = integral.sum(
                            x,
                            y,
                            x + params.template_window,
                            y + params.template_window,
                        );
                        let weight = weights.lookup(ssd / patch_area);
                        if weight == 0.0 {
                            continue;
                        }
                        weight_row[x as usize] += weight;
                        value_row[x as usize] +=
                            weight * pixel(x as i64 + dx, y as i64 + dy) as f32;
                    }
                });
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let idx = y as usize * row_len + x as usize;
        // The zero offset always contributes weight 1, so the sum is never 0
        let value = value_sums[idx] / weight_sums[idx];
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// `exp(-d / h^2)` for integer mean patch distances, cut off once negligible
struct WeightTable {
    table: Vec<f32>,
}

impl WeightTable {
    const CUTOFF: f32 = 1e-3;
    const MAX_DISTANCE: u64 = 255 * 255;

    fn new(h: f32) -> Self {
        let h2 = (h * h).max(f32::EPSILON);
        let mut table = Vec::new();
        for d in 0..=Self::MAX_DISTANCE {
            let w = (-(d as f32) / h2).exp();
            if w < Self::CUTOFF {
                break;
            }
            table.push(w);
        }
        Self { table }
    }

    fn lookup(&self, distance: u64) -> f32 {
        self.table.get(distance as usize).copied().unwrap_or(0.0)
    }
}
