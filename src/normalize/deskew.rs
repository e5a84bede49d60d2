use image::{GrayImage, Luma};
use imageproc::hough::{detect_lines, LineDetectionOptions};

use super::integral::clamp_coord;
use super::preprocessing;
use crate::config::DeskewConfig;

/// Estimate the dominant text-line skew in degrees.
///
/// Hough lines are found on the Canny edge map; each line's normal angle
/// minus 90 gives its tilt from horizontal. Tilts outside
/// `(-max_angle_deg, max_angle_deg)` are dropped and the median of the rest
/// is returned. Positive values mean lines fall towards the right.
/// Returns `None` when no usable line was found.
pub fn estimate_skew(image: &GrayImage, config: &DeskewConfig) -> Option<f32> {
    let edges = preprocessing::detect_edges(image, config.canny_low, config.canny_high);
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: config.hough_vote_threshold,
            suppression_radius: config.hough_suppression_radius,
        },
    );

    let mut angles: Vec<f32> = lines
        .iter()
        .map(|line| line.angle_in_degrees as f32 - 90.0)
        .filter(|angle| angle.abs() < config.max_angle_deg)
        .collect();

    tracing::trace!(
        candidates = lines.len(),
        in_range = angles.len(),
        "hough line candidates"
    );

    median(&mut angles)
}

/// Rotate the image so its text lines are horizontal.
///
/// The input is handed back untouched when there is no skew evidence or the
/// estimate is below `min_angle_deg`.
pub fn deskew(image: GrayImage, config: &DeskewConfig) -> GrayImage {
    let Some(angle) = estimate_skew(&image, config) else {
        tracing::debug!("no skew evidence, leaving image as-is");
        return image;
    };

    if angle.abs() < config.min_angle_deg {
        tracing::debug!("skew {:.2} deg below floor, leaving image as-is", angle);
        return image;
    }

    tracing::debug!("deskewed by {:.2} degrees", angle);
    rotate_replicate(&image, angle)
}

/// Rotate counter-clockwise (as displayed) by `angle_deg` about `(w/2, h/2)`.
///
/// Uses bicubic interpolation; samples falling outside the source take the
/// nearest edge pixel. Output has the input's dimensions.
pub fn rotate_replicate(image: &GrayImage, angle_deg: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let (sin, cos) = angle_deg.to_radians().sin_cos();

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let sx = cos * dx - sin * dy + cx;
        let sy = sin * dx + cos * dy + cy;
        Luma([bicubic_sample(image, sx, sy)])
    })
}

fn bicubic_sample(image: &GrayImage, sx: f32, sy: f32) -> u8 {
    let (width, height) = image.dimensions();
    let x0 = sx.floor();
    let y0 = sy.floor();
    let wx = cubic_weights(sx - x0);
    let wy = cubic_weights(sy - y0);
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let mut acc = 0.0f32;
    for (j, wy) in wy.iter().enumerate() {
        let py = clamp_coord(y0 - 1 + j as i64, height);
        let mut row = 0.0f32;
        for (i, wx) in wx.iter().enumerate() {
            let px = clamp_coord(x0 - 1 + i as i64, width);
            row += wx * image.get_pixel(px, py)[0] as f32;
        }
        acc += wy * row;
    }
    acc.round().clamp(0.0, 255.0) as u8
}

/// Cubic convolution weights (a = -0.75) for taps at -1, 0, 1, 2
fn cubic_weights(t: f32) -> [f32; 4] {
    const A: f32 = -0.75;
    let w0 = ((A * (t + 1.0) - 5.0 * A) * (t + 1.0) + 8.0 * A) * (t + 1.0) - 4.0 * A;
    let w1 = ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0;
    let w2 = ((A + 2.0) * (1.0 - t) - (A + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

fn median(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
