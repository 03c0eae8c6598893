//! Error types for the uploader module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing an output file.
#[derive(Debug, Error)]
pub enum UploaderError {
    /// Uploader misconfigured.
    #[error("Uploader configuration error: {0}")]
    Configuration(String),

    /// Encoded output file not found.
    #[error("Output file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Failed to move the output into the public directory.
    #[error("Failed to move output from {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Remote host rejected the upload.
    #[error("Upload rejected: {reason}")]
    UploadRejected { reason: String },

    /// HTTP transport error.
    #[error("Upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploaderError {
    /// Short description safe to surface to API clients.
    pub fn public_reason(&self) -> String {
        "publishing the encoded video failed".to_string()
    }
}
