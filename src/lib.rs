pub mod assemble;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod recognition;

pub use assemble::{assemble, Assembly};
pub use config::{EngineKind, ScanConfig};
pub use document::{average_confidence, DocumentProcessor, InputKind, PageRenderer};
pub use error::{Result, ScanError};
pub use models::{BoundingBox, Document, Line, LineKey, Page, RawDetection, Word};
pub use normalize::Normalizer;
pub use pipeline::{Pipeline, PipelineContext, PipelineStep};
pub use recognition::{Recognizer, SegmentationMode};
