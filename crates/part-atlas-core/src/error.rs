use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No eligible part images to pack")]
    NoEligibleFiles,
    #[error("Failed to fetch {layer} layer: {reason}")]
    SourceFetchFailed { layer: &'static str, reason: String },
    #[error("Failed to decode {layer} layer: {reason}")]
    DecodeFailed { layer: &'static str, reason: String },
    #[error("Persistence write failed: {0}")]
    PersistenceWriteFailed(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
