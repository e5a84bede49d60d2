pub mod clahe;
pub mod denoise;
pub mod deskew;
pub mod integral;
pub mod preprocessing;
pub mod steps;
pub mod threshold;

use image::{DynamicImage, GrayImage};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::pipeline::Pipeline;

/// Turns a scanned page into the canonical image handed to recognition:
/// grayscale, denoise, deskew, binarize, contrast-enhance.
#[derive(Clone)]
pub struct Normalizer {
    pipeline: Pipeline,
}

impl Normalizer {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            pipeline: build_standard_pipeline(config),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.pipeline = self.pipeline.with_verbose(verbose);
        self
    }

    /// Save every intermediate stage under `output_dir` (must be empty or absent)
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run the full chain. Output dimensions equal input dimensions.
    pub fn normalize(&self, image: DynamicImage) -> Result<GrayImage> {
        let normalized = self.pipeline.run(image)?;
        Ok(preprocessing::to_grayscale(normalized))
    }

    /// Decode raw image bytes and normalize them
    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<GrayImage> {
        let image = decode_image(bytes)?;
        self.normalize(image)
    }
}

/// Decode any raster format `image` understands
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(ScanError::Decode("input is empty".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Build the standard normalization pipeline from configuration
pub fn build_standard_pipeline(config: &ScanConfig) -> Pipeline {
    use steps::*;

    let n = &config.normalize;
    Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(DenoiseStep::from_config(n)))
        .add_step(Arc::new(DeskewStep {
            config: config.deskew.clone(),
        }))
        .add_step(Arc::new(BinarizeStep {
            block_size: n.threshold_block_size,
            offset: n.threshold_offset,
        }))
        .add_step(Arc::new(ContrastStep {
            clip_limit: n.clahe_clip_limit,
            tile_grid: n.clahe_tile_grid,
        }))
}
