//! Error types for surface indexing.

use thiserror::Error;

/// Errors that can occur while building a [`SurfaceIndex`](crate::SurfaceIndex).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// The surface is empty, contains non-finite coordinates, or has no
    /// triangle with a usable area.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type for indexing operations.
pub type Result<T> = std::result::Result<T, IndexError>;
