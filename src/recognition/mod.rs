pub mod ocrs_engine;
pub mod tesseract;

use image::GrayImage;

use crate::config::{EngineConfig, EngineKind};
use crate::error::Result;
use crate::models::RawDetection;

pub use self::ocrs_engine::OcrsRecognizer;
pub use self::tesseract::TesseractRecognizer;

/// Layout hint passed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentationMode {
    /// Treat the page as one uniform block of text (receipts, dense columns)
    #[default]
    SingleBlock,
}

/// A text-recognition engine.
///
/// Implementations return every fragment they found with its geometry,
/// confidence and line key. No ordering is promised.
pub trait Recognizer: Send + Sync {
    /// Identifier reported in the document output
    fn engine_id(&self) -> &str;

    fn recognize(&self, image: &GrayImage, mode: SegmentationMode) -> Result<Vec<RawDetection>>;
}

/// Create the recognizer selected in configuration
pub fn build_recognizer(config: &EngineConfig) -> Result<Box<dyn Recognizer>> {
    match config.kind {
        EngineKind::Ocrs => Ok(Box::new(OcrsRecognizer::from_config(config)?)),
        EngineKind::Tesseract => Ok(Box::new(TesseractRecognizer::from_config(config))),
    }
}
