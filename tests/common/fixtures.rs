#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use receiptscan::document::PageRenderer;
use receiptscan::{BoundingBox, LineKey, RawDetection, Recognizer, Result, ScanError, SegmentationMode};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;

/// Shorthand for a detection at `(left, top, width, height)` on line `(block, par, line)`
pub fn det(
    text: &str,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    conf: i32,
    key: (u32, u32, u32),
) -> RawDetection {
    RawDetection::new(
        text,
        BoundingBox::new(left, top, width, height),
        conf,
        LineKey::new(key.0, key.1, key.2),
    )
}

/// The receipt header from the reference scenario plus an empty sentinel row
pub fn grocery_store_detections() -> Vec<RawDetection> {
    vec![
        det("GROCERY", 0, 0, 70, 20, 92, (1, 1, 1)),
        det("STORE", 75, 2, 60, 20, 88, (1, 1, 1)),
        det("", 0, 0, 0, 0, -1, (1, 1, 2)),
    ]
}

pub fn blank_page(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([255u8]))
}

/// Dark horizontal-ish bars on a light background, tilted by `angle_deg`
/// (positive falls towards the right). Stands in for lines of text.
pub fn striped_page(width: u32, height: u32, angle_deg: f32) -> GrayImage {
    let slope = angle_deg.to_radians().tan();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    ImageBuffer::from_fn(width, height, |x, y| {
        let offset = (y as f32 - cy) - (x as f32 - cx) * slope;
        if offset.rem_euclid(40.0) < 8.0 {
            Luma([30u8])
        } else {
            Luma([230u8])
        }
    })
}

/// Small colour "receipt": dark text-like blocks on an off-white background
pub fn small_receipt(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let in_row = (y % 12) >= 4 && (y % 12) < 8;
        let in_word = (x % 10) < 7 && x > 3 && x + 3 < width;
        if in_row && in_word {
            Rgb([20u8, 25u8, 30u8])
        } else {
            Rgb([240u8, 236u8, 228u8])
        }
    });
    DynamicImage::ImageRgb8(img)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

/// Recognizer that replays prepared results, one per call, and remembers
/// the size of every image it was given
pub struct ScriptedRecognizer {
    responses: Mutex<VecDeque<Result<Vec<RawDetection>>>>,
    pub seen_sizes: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedRecognizer {
    pub fn new(responses: Vec<Result<Vec<RawDetection>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            seen_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn pages(pages: Vec<Vec<RawDetection>>) -> Self {
        Self::new(pages.into_iter().map(Ok).collect())
    }
}

impl Recognizer for ScriptedRecognizer {
    fn engine_id(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, image: &GrayImage, _mode: SegmentationMode) -> Result<Vec<RawDetection>> {
        self.seen_sizes.lock().unwrap().push(image.dimensions());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScanError::Recognition("no scripted response left".into())))
    }
}

/// Renderer that hands back fixed page images
pub struct StaticRenderer {
    pub pages: Vec<DynamicImage>,
}

impl PageRenderer for StaticRenderer {
    fn render(&self, _document: &[u8]) -> Result<Vec<DynamicImage>> {
        Ok(self.pages.clone())
    }
}

pub struct FailingRenderer;

impl PageRenderer for FailingRenderer {
    fn render(&self, _document: &[u8]) -> Result<Vec<DynamicImage>> {
        Err(ScanError::Render("document is encrypted".into()))
    }
}

/// A config whose denoise search is small enough for quick tests
pub fn fast_config() -> receiptscan::ScanConfig {
    let mut config = receiptscan::ScanConfig::default();
    config.normalize.denoise_search_window = 7;
    config.normalize.denoise_template_window = 3;
    config
}

/// Lets a test keep a handle on a recognizer after handing it to a processor
pub struct SharedRecognizer(pub std::sync::Arc<ScriptedRecognizer>);

impl Recognizer for SharedRecognizer {
    fn engine_id(&self) -> &str {
        self.0.engine_id()
    }

    fn recognize(&self, image: &GrayImage, mode: SegmentationMode) -> Result<Vec<RawDetection>> {
        self.0.recognize(image, mode)
    }
}
