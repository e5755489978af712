//! Error types for mesh loading.

use thiserror::Error;

/// Errors that can occur while loading or preparing a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Reading the file failed or its contents are not valid STL.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file holds no triangles.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {vertex}, but only {count} vertices exist")]
    InvalidFace {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        vertex: usize,
        /// Number of vertices in the mesh.
        count: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
