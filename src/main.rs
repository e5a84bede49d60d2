use clap::Parser;
use std::path::PathBuf;

use receiptscan::config::{EngineKind, ScanConfig};
use receiptscan::recognition::build_recognizer;
use receiptscan::{DocumentProcessor, Normalizer};

#[derive(Parser)]
#[command(name = "receiptscan")]
#[command(about = "Extract positioned words and lines from scanned receipts and invoices")]
struct Cli {
    /// Path to input image or PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Recognition engine (overrides configuration)
    #[arg(long, value_enum)]
    engine: Option<EngineKind>,

    /// Rendering resolution for PDF pages (overrides configuration)
    #[arg(long)]
    dpi: Option<u32>,

    /// Save normalization stages to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Only normalize the image and write it to --output
    #[arg(long, requires = "output")]
    normalize_only: bool,

    /// Output path for --normalize-only
    #[arg(short, long, value_name = "PNG")]
    output: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    receiptscan::logging::init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    if let Some(engine) = args.engine {
        config.engine.kind = engine;
    }
    if let Some(dpi) = args.dpi {
        config.render.dpi = dpi;
    }
    config.validate()?;

    let bytes = std::fs::read(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.input.display(), e))?;
    tracing::debug!("loaded {} ({} bytes)", args.input.display(), bytes.len());

    if args.normalize_only {
        let mut normalizer = Normalizer::new(&config).with_verbose(args.verbose);
        if let Some(debug_dir) = args.debug_out {
            normalizer = normalizer.with_debug(debug_dir)?;
        }
        let normalized = normalizer.normalize_bytes(&bytes)?;
        // `requires = "output"` guarantees the path is present
        let output = args.output.ok_or_else(|| anyhow::anyhow!("--output is required"))?;
        normalized
            .save(&output)
            .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", output.display(), e))?;
        tracing::info!("normalized image written to {}", output.display());
        return Ok(());
    }

    let recognizer = build_recognizer(&config.engine)?;
    let mut processor = DocumentProcessor::new(config, recognizer).with_verbose(args.verbose);
    if let Some(debug_dir) = args.debug_out {
        processor = processor.with_debug(debug_dir)?;
    }

    let file_name = args.input.file_name().and_then(|name| name.to_str());
    let document = processor.process_bytes(&bytes, file_name)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    println!("{}", json);

    Ok(())
}
