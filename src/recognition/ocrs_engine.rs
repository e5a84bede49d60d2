use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use std::path::{Path, PathBuf};

use super::{Recognizer, SegmentationMode};
use crate::config::EngineConfig;
use crate::error::{Result, ScanError};
use crate::models::{BoundingBox, LineKey, RawDetection};

/// ocrs does not score its output, so every recognised word reports this
pub const OCRS_WORD_CONFIDENCE: i32 = 90;

/// Recognizer backed by the `ocrs` neural OCR engine
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let model_dir = match &config.ocrs_model_dir {
            Some(dir) => dir.clone(),
            None => default_model_dir()?,
        };
        Self::from_model_dir(&model_dir)
    }

    /// Load `text-detection.rten` and `text-recognition.rten` from a directory
    pub fn from_model_dir(model_dir: &Path) -> Result<Self> {
        let detection_model_path = model_dir.join("text-detection.rten");
        let recognition_model_path = model_dir.join("text-recognition.rten");

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            return Err(ScanError::Recognition(format!(
                "OCR models not found. Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            )));
        }

        let detection_model = Model::load_file(&detection_model_path)
            .map_err(|e| ScanError::Recognition(format!("loading detection model: {}", e)))?;
        let recognition_model = Model::load_file(&recognition_model_path)
            .map_err(|e| ScanError::Recognition(format!("loading recognition model: {}", e)))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| ScanError::Recognition(e.to_string()))?;

        tracing::debug!("ocrs engine loaded from {}", model_dir.display());
        Ok(Self { engine })
    }
}

/// Standard ocrs model cache location (`~/.cache/ocrs`)
fn default_model_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ScanError::Config("cannot locate home directory for ocrs models".into()))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

impl Recognizer for OcrsRecognizer {
    fn engine_id(&self) -> &str {
        "ocrs"
    }

    fn recognize(&self, image: &GrayImage, _mode: SegmentationMode) -> Result<Vec<RawDetection>> {
        let engine_err = |e: &dyn std::fmt::Display| ScanError::Recognition(e.to_string());

        // ocrs expects interleaved RGB input
        let rgb = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
        let img_source =
            ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions()).map_err(|e| engine_err(&e))?;
        let ocr_input = self.engine.prepare_input(img_source).map_err(|e| engine_err(&e))?;

        let word_rects = self.engine.detect_words(&ocr_input).map_err(|e| engine_err(&e))?;
        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);
        let lines = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| engine_err(&e))?;

        // ocrs yields a single reading-ordered column: one block, one paragraph
        let mut detections = Vec::new();
        for (line_idx, line) in lines.iter().enumerate() {
            let Some(line) = line else {
                continue;
            };
            let key = LineKey::new(1, 1, line_idx as u32 + 1);

            for word in line.words() {
                let text: String = word.chars().iter().map(|c| c.char).collect();
                let rect = word.bounding_rect();
                let bbox = BoundingBox::new(
                    rect.left().max(0) as u32,
                    rect.top().max(0) as u32,
                    rect.width().max(0) as u32,
                    rect.height().max(0) as u32,
                );
                detections.push(RawDetection::new(text, bbox, OCRS_WORD_CONFIDENCE, key));
            }
        }

        tracing::debug!(words = detections.len(), "ocrs recognition finished");
        Ok(detections)
    }
}
