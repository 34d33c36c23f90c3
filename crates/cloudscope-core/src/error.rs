//! Error types for cloudscope.

use thiserror::Error;

/// The main error type for cloudscope operations.
#[derive(Error, Debug)]
pub enum CloudscopeError {
    /// The file extension is not handled by any loader.
    #[error("unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    /// A volume file was readable but its contents are invalid.
    #[error("malformed dataset '{path}': {reason}")]
    MalformedDataset { path: String, reason: String },

    /// A camera path cache file could not be decoded.
    #[error("malformed camera path '{path}': {reason}")]
    MalformedCameraPath { path: String, reason: String },

    /// A manifest entry is structurally invalid.
    #[error("invalid manifest entry '{0}'")]
    ManifestEntry(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for cloudscope operations.
pub type Result<T> = std::result::Result<T, CloudscopeError>;
