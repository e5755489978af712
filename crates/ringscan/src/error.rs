//! Error types for scanning.

use ringscan_index::IndexError;
use thiserror::Error;

/// Errors that can occur while configuring or running a scan.
///
/// A ray that misses the surface is not an error; it yields the fallback
/// point for its level.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Level count, ray count or height range is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The surface could not be indexed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Writing the point cloud failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the point cloud failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
