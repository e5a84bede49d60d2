use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;

/// Convert image to a single luminance channel.
/// Images that already are 8-bit grayscale are returned as-is.
pub fn to_grayscale(img: DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
