use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// Top-level configuration, loadable from TOML.
/// Every section falls back to its defaults when omitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub normalize: NormalizeConfig,
    pub deskew: DeskewConfig,
    pub render: RenderConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Non-local means filter strength
    pub denoise_strength: f32,
    pub denoise_template_window: u32,
    pub denoise_search_window: u32,
    pub threshold_block_size: u32,
    pub threshold_offset: i32,
    pub clahe_clip_limit: f32,
    pub clahe_tile_grid: u32,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            denoise_strength: 10.0,
            denoise_template_window: 7,
            denoise_search_window: 21,
            threshold_block_size: 11,
            threshold_offset: 2,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeskewConfig {
    pub canny_low: f32,
    pub canny_high: f32,
    pub hough_vote_threshold: u32,
    pub hough_suppression_radius: u32,
    /// Candidates outside (-max_angle, max_angle) are ignored
    pub max_angle_deg: f32,
    /// Skew below this magnitude is left alone
    pub min_angle_deg: f32,
}

impl Default for DeskewConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            hough_vote_threshold: 100,
            hough_suppression_radius: 8,
            max_angle_deg: 45.0,
            min_angle_deg: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub dpi: u32,
    pub pdftoppm_binary: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            pdftoppm_binary: PathBuf::from("pdftoppm"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Ocrs,
    Tesseract,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,
    /// Directory holding `text-detection.rten` and `text-recognition.rten`.
    /// Defaults to `~/.cache/ocrs` when unset.
    pub ocrs_model_dir: Option<PathBuf>,
    pub tesseract_binary: PathBuf,
    pub tesseract_language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            ocrs_model_dir: None,
            tesseract_binary: PathBuf::from("tesseract"),
            tesseract_language: "eng".to_string(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a TOML file, or defaults when the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: ScanConfig =
            toml::from_str(contents).map_err(|e| ScanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let n = &self.normalize;
        check_odd_window("denoise_template_window", n.denoise_template_window)?;
        check_odd_window("denoise_search_window", n.denoise_search_window)?;
        check_odd_window("threshold_block_size", n.threshold_block_size)?;
        if n.denoise_strength <= 0.0 {
            return Err(ScanError::Config("denoise_strength must be positive".into()));
        }
        if n.clahe_clip_limit <= 0.0 {
            return Err(ScanError::Config("clahe_clip_limit must be positive".into()));
        }
        if n.clahe_tile_grid == 0 {
            return Err(ScanError::Config("clahe_tile_grid must be at least 1".into()));
        }
        if self.deskew.max_angle_deg <= self.deskew.min_angle_deg {
            return Err(ScanError::Config(
                "deskew max_angle_deg must exceed min_angle_deg".into(),
            ));
        }
        if self.render.dpi == 0 {
            return Err(ScanError::Config("render dpi must be positive".into()));
        }
        Ok(())
    }
}

fn check_odd_window(name: &str, size: u32) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(ScanError::Config(format!(
            "{} must be a positive odd number, got {}",
            name, size
        )));
    }
    Ok(())
}
