use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, ScanError};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    /// Report every finished step at info level instead of debug
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    /// Write an intermediate image as `<output_dir>/<dir_name>/01.png` when debug mode is on
    fn save_debug_image(&self, dir_name: &str, image: &DynamicImage) -> Result<()> {
        let Some(debug_config) = &self.debug else {
            return Ok(());
        };

        let step_dir = debug_config.output_dir.join(dir_name);
        std::fs::create_dir_all(&step_dir)?;
        let output_path = step_dir.join("01.png");
        image
            .save(&output_path)
            .map_err(|e| ScanError::Io(std::io::Error::other(format!(
                "failed to save debug image {}: {}",
                output_path.display(),
                e
            ))))?;

        if self.verbose {
            tracing::info!("debug: saved {}/01.png", dir_name);
        } else {
            tracing::debug!("debug: saved {}/01.png", dir_name);
        }
        Ok(())
    }
}

/// One image-to-image stage of the normalization chain.
///
/// Each step consumes its input and returns a new owned image, so no stage
/// ever observes another stage's buffer.
pub trait PipelineStep: Send + Sync {
    fn process(&self, image: DynamicImage, context: &PipelineContext) -> Result<DynamicImage>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable verbose per-step reporting
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        prepare_debug_dir(&output_dir)?;
        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on the input image
    pub fn run(&self, input: DynamicImage) -> Result<DynamicImage> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<DynamicImage> {
        self.context.save_debug_image("00_input", &input)?;

        let mut image = input;
        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let started = std::time::Instant::now();
            image = step.process(image, &self.context)?;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            if self.context.verbose {
                tracing::info!(
                    step = step.name(),
                    elapsed_ms,
                    "step {}/{} finished",
                    step_idx + 1,
                    num_steps.min(self.steps.len())
                );
            } else {
                tracing::debug!(
                    step = step.name(),
                    width = image.width(),
                    height = image.height(),
                    elapsed_ms,
                    "pipeline step finished"
                );
            }

            let step_dir_name = format!(
                "{:02}_{}",
                step_idx + 1,
                step.name().to_lowercase().replace(' ', "_")
            );
            self.context.save_debug_image(&step_dir_name, &image)?;
        }

        Ok(image)
    }
}

/// Make sure a debug output directory exists and is empty
pub fn prepare_debug_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        let entries = std::fs::read_dir(output_dir)?;
        if entries.count() > 0 {
            return Err(ScanError::Config(format!(
                "debug directory is not empty: {}",
                output_dir.display()
            )));
        }
    } else {
        std::fs::create_dir_all(output_dir)?;
    }
    Ok(())
}
