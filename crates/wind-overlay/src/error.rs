//! Error types for the wind overlay.

use thiserror::Error;
use wind_grid::GridError;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors that end a load attempt or reject an operation.
///
/// Every load error is terminal for the current attempt: the overlay stays
/// out of the active state until it is reloaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    // === Load Errors ===
    #[error("Failed to fetch wind payload: {0}")]
    FetchError(String),

    #[error("Failed to decompress wind payload: {0}")]
    DecompressError(String),

    #[error("Failed to decode wind payload: {0}")]
    DecodeError(String),

    #[error("Map projection unavailable: {0}")]
    ProjectionUnavailable(String),

    // === Usage Errors ===
    #[error("Invalid overlay configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation not allowed in state {0}")]
    InvalidState(String),
}

impl OverlayError {
    /// Short stable label, used as a metrics tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchError(_) => "fetch",
            Self::DecompressError(_) => "decompress",
            Self::DecodeError(_) => "decode",
            Self::ProjectionUnavailable(_) => "projection",
            Self::InvalidConfig(_) => "config",
            Self::InvalidState(_) => "state",
        }
    }
}

impl From<GridError> for OverlayError {
    fn from(err: GridError) -> Self {
        if err.is_decompress() {
            Self::DecompressError(err.to_string())
        } else {
            Self::DecodeError(err.to_string())
        }
    }
}

impl From<projection::ProjectionError> for OverlayError {
    fn from(err: projection::ProjectionError) -> Self {
        Self::ProjectionUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for OverlayError {
    fn from(err: reqwest::Error) -> Self {
        Self::FetchError(err.to_string())
    }
}
