//! Error types for format adapters.

use std::path::PathBuf;
use thiserror::Error;

use model_core::ModelError;

/// Result type alias for import/export operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors that can occur while importing or exporting model files.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Error reading from a file.
    #[error("failed to read model from {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write model to {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a model file.
    #[error("failed to parse model from {path}: {details}")]
    Parse { path: PathBuf, details: String },

    /// No registered format handles the file extension.
    #[error("unsupported model format: {extension:?}")]
    UnsupportedFormat { extension: Option<String> },

    /// The imported data violated a core invariant.
    #[error(transparent)]
    Model(#[from] ModelError),
}
