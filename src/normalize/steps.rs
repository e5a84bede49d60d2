use image::DynamicImage;

use crate::config::{DeskewConfig, NormalizeConfig};
use crate::error::Result;
use crate::normalize::{clahe, denoise, deskew, preprocessing, threshold};
use crate::pipeline::{PipelineContext, PipelineStep};

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageLuma8(preprocessing::to_grayscale(image)))
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Non-local means denoising
pub struct DenoiseStep {
    pub params: denoise::NlMeansParams,
}

impl DenoiseStep {
    pub fn from_config(config: &NormalizeConfig) -> Self {
        Self {
            params: denoise::NlMeansParams {
                h: config.denoise_strength,
                template_window: config.denoise_template_window,
                search_window: config.denoise_search_window,
            },
        }
    }
}

impl PipelineStep for DenoiseStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        let gray = preprocessing::to_grayscale(image);
        Ok(DynamicImage::ImageLuma8(denoise::non_local_means(&gray, self.params)))
    }

    fn name(&self) -> &str {
        "Denoise"
    }
}

/// Detect and undo text-line rotation
pub struct DeskewStep {
    pub config: DeskewConfig,
}

impl PipelineStep for DeskewStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        let gray = preprocessing::to_grayscale(image);
        Ok(DynamicImage::ImageLuma8(deskew::deskew(gray, &self.config)))
    }

    fn name(&self) -> &str {
        "Deskew"
    }
}

/// Adaptive mean thresholding to a strictly 0/255 image
pub struct BinarizeStep {
    pub block_size: u32,
    pub offset: i32,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        let gray = preprocessing::to_grayscale(image);
        let binary = threshold::adaptive_mean_threshold(&gray, self.block_size, self.offset);
        Ok(DynamicImage::ImageLuma8(binary))
    }

    fn name(&self) -> &str {
        "Binarize"
    }
}

/// Tile-wise contrast-limited histogram equalization
pub struct ContrastStep {
    pub clip_limit: f32,
    pub tile_grid: u32,
}

impl PipelineStep for ContrastStep {
    fn process(&self, image: DynamicImage, _context: &PipelineContext) -> Result<DynamicImage> {
        let gray = preprocessing::to_grayscale(image);
        let enhanced = clahe::clahe(&gray, self.clip_limit, self.tile_grid);
        Ok(DynamicImage::ImageLuma8(enhanced))
    }

    fn name(&self) -> &str {
        "Contrast Enhancement"
    }
}
