//! Wide string error types

use thiserror::Error;

/// Transcoding errors
#[derive(Debug, Error)]
pub enum WstrError {
    /// A NUL-terminated string cannot carry a NUL of its own
    #[error("interior NUL at position {position}")]
    InteriorNul { position: usize },

    /// Unpaired surrogate in the UTF-16 input
    #[error("UTF-16 error: {0}")]
    InvalidUtf16(#[from] std::string::FromUtf16Error),
}

/// Result type for transcoding operations
pub type Result<T> = std::result::Result<T, WstrError>;
