//! Integration tests for skew detection and correction.

mod common;

use receiptscan::config::DeskewConfig;
use receiptscan::normalize::deskew::{deskew, estimate_skew, rotate_replicate};

use common::*;

#[test]
fn test_blank_page_passes_through() {
    let config = DeskewConfig::default();
    let page = blank_page(200, 150);

    assert_eq!(estimate_skew(&page, &config), None);
    assert_eq!(deskew(page.clone(), &config), page);
}

#[test]
fn test_upright_page_is_untouched() {
    let config = DeskewConfig::default();
    let page = striped_page(400, 300, 0.0);

    let angle = estimate_skew(&page, &config).expect("bars should produce hough lines");
    assert!(angle.abs() < config.min_angle_deg);
    assert_eq!(deskew(page.clone(), &config), page);
}

#[test]
fn test_deskew_twice_on_upright_page_is_a_noop() {
    let config = DeskewConfig::default();
    let page = striped_page(400, 300, 0.0);

    let once = deskew(page, &config);
    let twice = deskew(once.clone(), &config);
    assert_eq!(once, twice);
}

#[test]
fn test_deskew_twice_on_tilted_page_is_a_noop() {
    let config = DeskewConfig::default();

    for angle in [3.0, -4.0] {
        let once = deskew(striped_page(400, 300, angle), &config);
        let twice = deskew(once.clone(), &config);
        assert_eq!(once, twice, "second pass changed a page tilted by {}", angle);
    }
}

#[test]
fn test_detects_tilted_lines() {
    let config = DeskewConfig::default();
    let page = striped_page(400, 300, 3.0);

    let angle = estimate_skew(&page, &config).expect("tilted bars should produce hough lines");
    assert!((angle - 3.0).abs() <= 1.0, "estimated {}", angle);
}

#[test]
fn test_correction_levels_tilted_lines() {
    let config = DeskewConfig::default();
    let page = striped_page(400, 300, 3.0);

    let corrected = deskew(page.clone(), &config);
    assert_eq!(corrected.dimensions(), page.dimensions());
    assert_ne!(corrected, page);

    let residual = estimate_skew(&corrected, &config);
    assert!(
        residual.map_or(true, |a| a.abs() <= 1.0),
        "residual skew {:?}",
        residual
    );
}

#[test]
fn test_rotation_replicates_border() {
    // A page that is white except for a black left column. After rotating,
    // the corners must not gain any dark fill that was not in the source.
    let page = image::GrayImage::from_fn(120, 80, |x, _| {
        if x < 4 { image::Luma([0u8]) } else { image::Luma([255u8]) }
    });
    let rotated = rotate_replicate(&page, 10.0);

    assert_eq!(rotated.dimensions(), (120, 80));
    assert_eq!(rotated.get_pixel(119, 0)[0], 255);
    assert_eq!(rotated.get_pixel(119, 79)[0], 255);
}

#[test]
fn test_far_out_of_range_angles_are_ignored() {
    // Vertical bars are near-vertical "lines" only; no text baseline evidence
    let config = DeskewConfig::default();
    let page = image::GrayImage::from_fn(300, 300, |x, _| {
        if x % 40 < 8 { image::Luma([30u8]) } else { image::Luma([230u8]) }
    });

    assert_eq!(estimate_skew(&page, &config), None);
    assert_eq!(deskew(page.clone(), &config), page);
}
