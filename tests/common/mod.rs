mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from receiptscan for tests
pub use receiptscan::{
    BoundingBox, Document, Line, LineKey, Page, RawDetection, Recognizer, ScanConfig, ScanError,
    SegmentationMode, Word,
};
