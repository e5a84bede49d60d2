use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;

use super::{Recognizer, SegmentationMode};
use crate::config::EngineConfig;
use crate::error::{Result, ScanError};
use crate::models::{BoundingBox, LineKey, RawDetection};

/// Recognizer that shells out to the `tesseract` executable and reads its TSV report
pub struct TesseractRecognizer {
    pub binary: PathBuf,
    pub language: String,
}

impl TesseractRecognizer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            binary: config.tesseract_binary.clone(),
            language: config.tesseract_language.clone(),
        }
    }
}

fn psm_arg(mode: SegmentationMode) -> &'static str {
    match mode {
        SegmentationMode::SingleBlock => "6",
    }
}

impl Recognizer for TesseractRecognizer {
    fn engine_id(&self) -> &str {
        "tesseract5"
    }

    fn recognize(&self, image: &GrayImage, mode: SegmentationMode) -> Result<Vec<RawDetection>> {
        let input = tempfile::Builder::new()
            .prefix("receiptscan-page-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(input.path(), image::ImageFormat::Png)
            .map_err(|e| ScanError::Recognition(format!("writing page for tesseract: {}", e)))?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .args(["--psm", psm_arg(mode)])
            .args(["-l", self.language.as_str()])
            .arg("tsv")
            .output()
            .map_err(|e| {
                ScanError::Recognition(format!(
                    "failed to launch {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let report = String::from_utf8_lossy(&output.stdout);
        let detections = parse_tsv(&report)?;
        tracing::debug!(rows = detections.len(), "tesseract recognition finished");
        Ok(detections)
    }
}

/// Parse tesseract's TSV report into raw detections.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left,
/// top, width, height, conf, text. The header row is skipped, confidences
/// are truncated toward zero and a missing text column reads as empty.
pub fn parse_tsv(report: &str) -> Result<Vec<RawDetection>> {
    let mut detections = Vec::new();

    for (row_idx, row) in report.lines().enumerate() {
        if row.trim().is_empty() || row.starts_with("level") {
            continue;
        }

        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 11 {
            return Err(ScanError::Recognition(format!(
                "malformed tesseract row {}: expected at least 11 columns, got {}",
                row_idx + 1,
                cols.len()
            )));
        }

        let int = |idx: usize, name: &str| -> Result<u32> {
            cols[idx].trim().parse::<u32>().map_err(|e| {
                ScanError::Recognition(format!("row {}: bad {} '{}': {}", row_idx + 1, name, cols[idx], e))
            })
        };

        let confidence = cols[10].trim().parse::<f32>().map_err(|e| {
            ScanError::Recognition(format!("row {}: bad conf '{}': {}", row_idx + 1, cols[10], e))
        })?;

        let key = LineKey::new(int(2, "block_num")?, int(3, "par_num")?, int(4, "line_num")?);
        let bbox = BoundingBox::new(int(6, "left")?, int(7, "top")?, int(8, "width")?, int(9, "height")?);
        let text = cols.get(11).copied().unwrap_or("");

        detections.push(RawDetection::new(text, bbox, confidence.trunc() as i32, key));
    }

    Ok(detections)
}
