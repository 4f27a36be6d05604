//! Projection error types.

use thiserror::Error;

/// Errors raised by map projections.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProjectionError {
    /// The map cannot project yet (not laid out, no size, no view set).
    #[error("projection unavailable: {0}")]
    Unavailable(String),

    /// The input coordinate is not a finite number.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

impl ProjectionError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
