//! Error types for the viewer core.
//!
//! Fallible operations return `ViewerResult<T>`.

use thiserror::Error;

/// Unified error type for the viewer core.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A mesh file could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A raw projection code has no matching projection mode.
    #[error("Invalid projection type: {0}")]
    InvalidProjection(u8),

    /// The world has no camera to view through.
    #[error("No camera in world")]
    NoCamera,

    /// A mesh handle does not refer to a live mesh.
    #[error("Unknown mesh handle: {0}")]
    UnknownMesh(usize),

    /// A camera handle does not refer to a live camera.
    #[error("Unknown camera handle: {0}")]
    UnknownCamera(usize),

    /// A matrix that must be inverted is singular.
    #[error("Singular {0} matrix")]
    SingularMatrix(&'static str),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, ViewerError>`.
pub type ViewerResult<T> = Result<T, ViewerError>;
