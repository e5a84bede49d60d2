use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::assemble;
use crate::config::{RenderConfig, ScanConfig};
use crate::error::{Result, ScanError};
use crate::models::{Document, Page};
use crate::normalize::{self, Normalizer};
use crate::pipeline;
use crate::recognition::{Recognizer, SegmentationMode};

/// What kind of payload the caller handed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Raster,
    Pdf,
}

impl InputKind {
    /// A PDF is recognised by a `.pdf` file name or by its `%PDF-` signature
    pub fn detect(file_name: Option<&str>, bytes: &[u8]) -> Self {
        let named_pdf = file_name
            .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false);
        if named_pdf || bytes.starts_with(b"%PDF-") {
            InputKind::Pdf
        } else {
            InputKind::Raster
        }
    }
}

/// Splits a multi-page document into one raster image per page
pub trait PageRenderer: Send + Sync {
    fn render(&self, document: &[u8]) -> Result<Vec<DynamicImage>>;
}

/// Renders PDF pages through poppler's `pdftoppm`
pub struct PdftoppmRenderer {
    pub binary: PathBuf,
    pub dpi: u32,
}

impl PdftoppmRenderer {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            binary: config.pdftoppm_binary.clone(),
            dpi: config.dpi,
        }
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render(&self, document: &[u8]) -> Result<Vec<DynamicImage>> {
        let render_err = |msg: String| ScanError::Render(msg);

        let work_dir = tempfile::TempDir::new()
            .map_err(|e| render_err(format!("creating work directory: {}", e)))?;
        let pdf_path = work_dir.path().join("input.pdf");
        std::fs::write(&pdf_path, document)
            .map_err(|e| render_err(format!("writing document: {}", e)))?;
        let prefix = work_dir.path().join("page");

        let dpi = self.dpi.to_string();
        let output = Command::new(&self.binary)
            .args(["-r", dpi.as_str(), "-png"])
            .arg(&pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| render_err(format!("failed to launch {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(render_err(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let page_files = rendered_pages(work_dir.path())?;
        if page_files.is_empty() {
            return Err(render_err("document has no pages".to_string()));
        }

        page_files
            .iter()
            .map(|path| {
                image::open(path).map_err(|e| {
                    render_err(format!("decoding rendered page {}: {}", path.display(), e))
                })
            })
            .collect()
    }
}

/// Collect `page-N.png` files in page-number order.
/// pdftoppm zero-pads N to the width of the page count, so sort numerically.
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| ScanError::Render(e.to_string()))? {
        let path = entry.map_err(|e| ScanError::Render(e.to_string()))?.path();
        let number = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_prefix("page-"))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(number) = number {
            pages.push((number, path));
        }
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

/// Mean of all word confidences above zero across every page, rounded to
/// one decimal place with ties going to the even digit. Zero-confidence
/// words are left out; 0.0 when nothing qualifies.
pub fn average_confidence(pages: &[Page]) -> f64 {
    let confidences: Vec<i32> = pages
        .iter()
        .flat_map(|page| page.words.iter())
        .map(|word| word.conf)
        .filter(|&conf| conf > 0)
        .collect();

    if confidences.is_empty() {
        return 0.0;
    }

    let total: i64 = confidences.iter().map(|&c| c as i64).sum();
    let mean = total as f64 / confidences.len() as f64;
    (mean * 10.0).round_ties_even() / 10.0
}

/// Runs normalize → recognize → assemble for every page of a document
pub struct DocumentProcessor {
    config: ScanConfig,
    recognizer: Box<dyn Recognizer>,
    renderer: Box<dyn PageRenderer>,
    debug_dir: Option<PathBuf>,
    verbose: bool,
}

impl DocumentProcessor {
    pub fn new(config: ScanConfig, recognizer: Box<dyn Recognizer>) -> Self {
        let renderer = Box::new(PdftoppmRenderer::from_config(&config.render));
        Self {
            config,
            recognizer,
            renderer,
            debug_dir: None,
            verbose: false,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Report each normalization step of every page at info level
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Save normalization stages under `output_dir/page_NN/`.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        pipeline::prepare_debug_dir(&output_dir)?;
        self.debug_dir = Some(output_dir);
        Ok(self)
    }

    pub fn engine_id(&self) -> &str {
        self.recognizer.engine_id()
    }

    /// Process an uploaded payload: a raster image or a multi-page PDF.
    /// Fails as a whole if any page fails.
    pub fn process_bytes(&self, bytes: &[u8], file_name: Option<&str>) -> Result<Document> {
        let images = match InputKind::detect(file_name, bytes) {
            InputKind::Pdf => {
                let pages = self.renderer.render(bytes)?;
                tracing::debug!(pages = pages.len(), "rendered document pages");
                pages
            }
            InputKind::Raster => vec![normalize::decode_image(bytes)?],
        };

        self.process_pages(images)
    }

    /// Process already-decoded page images in order
    pub fn process_pages(&self, images: Vec<DynamicImage>) -> Result<Document> {
        let mut pages = Vec::with_capacity(images.len());
        for (idx, image) in images.into_iter().enumerate() {
            let page = self.process_page(image, idx + 1)?;
            pages.push(page);
        }

        let avg_conf = average_confidence(&pages);
        tracing::info!(
            pages = pages.len(),
            engine = self.engine_id(),
            "OCR complete, avg_conf={:.1}",
            avg_conf
        );

        Ok(Document {
            pages,
            engine: self.engine_id().to_string(),
            avg_conf,
        })
    }

    /// Process one raster image as a single page
    pub fn process_image(&self, image: DynamicImage) -> Result<Page> {
        self.process_page(image, 1)
    }

    fn process_page(&self, image: DynamicImage, page_number: usize) -> Result<Page> {
        let mut normalizer = Normalizer::new(&self.config).with_verbose(self.verbose);
        if let Some(debug_dir) = &self.debug_dir {
            normalizer = normalizer.with_debug(debug_dir.join(format!("page_{:02}", page_number)))?;
        }

        let normalized = normalizer.normalize(image)?;
        let (width, height) = normalized.dimensions();

        let detections = self
            .recognizer
            .recognize(&normalized, SegmentationMode::SingleBlock)?;
        let assembly = assemble::assemble(&detections);

        tracing::info!(
            page = page_number,
            width,
            height,
            words = assembly.words.len(),
            lines = assembly.lines.len(),
            "page processed"
        );

        Ok(Page {
            width,
            height,
            words: assembly.words,
            lines: assembly.lines,
            orientation_deg: 0,
        })
    }
}
