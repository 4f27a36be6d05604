//! Error types for wind grid decoding.

use thiserror::Error;

/// Errors that can occur while turning a payload into a wind grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The compressed stream could not be inflated.
    #[error("decompression error: {0}")]
    Decompress(String),

    /// The buffer ended before the fixed-size header was complete.
    #[error("buffer too short: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The header describes a grid that cannot be interpolated.
    #[error("invalid grid header: {0}")]
    InvalidHeader(String),

    /// The number of samples matches neither one nor two component grids.
    #[error("sample count {actual} does not match grid of {points} points (expected {points} or {})", points.saturating_mul(2))]
    SampleCount { points: usize, actual: usize },

    /// Component arrays handed to the grid have the wrong length.
    #[error("component length mismatch: expected {expected}, got u={u} v={v}")]
    ComponentLength { expected: usize, u: usize, v: usize },
}

impl GridError {
    /// Create an InvalidHeader error.
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Whether this error came from the decompression stage rather than decoding.
    pub fn is_decompress(&self) -> bool {
        matches!(self, Self::Decompress(_))
    }
}

impl From<std::io::Error> for GridError {
    fn from(err: std::io::Error) -> Self {
        Self::Decompress(err.to_string())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
