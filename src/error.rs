//! Error type shared by every stage of the press.

/// Error type for sampling, compression and composition operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PressError {
    /// Malformed input, zero-dimension image or a codec that refused to decode
    #[error("Failed to decode image: {0}")]
    Decode(String),
    /// The codec rejected the format, dimensions or quality
    #[error("Failed to encode image: {0}")]
    Encode(String),
    /// A decode budget value that is neither a valid bound nor the unbounded sentinel
    #[error("Invalid decode budget: {0}")]
    InvalidBudget(String),
    #[error("Quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to load image: {0}")]
    Load(String),
    #[error("Failed to save image: {0}")]
    Save(String),
}

pub type Result<T> = std::result::Result<T, PressError>;
