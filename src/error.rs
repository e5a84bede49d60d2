use thiserror::Error;

/// Errors surfaced by the scanning core.
///
/// Every variant is terminal for the request that produced it: a document
/// either yields a result for all of its pages or fails with one of these.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to render document pages: {0}")]
    Render(String),

    #[error("recognition engine failed: {0}")]
    Recognition(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for ScanError {
    fn from(err: image::ImageError) -> Self {
        ScanError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
