//! Error types for the encoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// FFmpeg ran but exited unsuccessfully.
    #[error("Encode failed with exit code {exit_code:?}")]
    EncodeFailed {
        exit_code: Option<i32>,
        /// Tail of the process stderr, kept for operator logs.
        stderr_tail: String,
    },

    /// FFmpeg exited successfully but produced no output file.
    #[error("Encode produced no output file: {path}")]
    OutputMissing { path: PathBuf },

    /// Encode exceeded the configured wall-clock timeout and was killed.
    #[error("Encode timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while spawning or supervising the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncoderError {
    pub fn encode_failed(exit_code: Option<i32>, stderr_tail: impl Into<String>) -> Self {
        Self::EncodeFailed {
            exit_code,
            stderr_tail: stderr_tail.into(),
        }
    }

    /// Short description safe to surface to API clients. Process stderr
    /// stays out of this.
    pub fn public_reason(&self) -> String {
        match self {
            Self::FfmpegNotFound { .. } => "encoder unavailable".to_string(),
            Self::InputNotFound { .. } => "uploaded video is missing".to_string(),
            Self::EncodeFailed {
                exit_code: Some(code),
                ..
            } => format!("encoding failed with exit code {code}"),
            Self::EncodeFailed {
                exit_code: None, ..
            } => "encoding failed".to_string(),
            Self::OutputMissing { .. } => "encoding produced no output".to_string(),
            Self::Timeout { timeout_secs } => {
                format!("encoding timed out after {timeout_secs} seconds")
            }
            Self::Io(_) => "encoding failed".to_string(),
        }
    }

    /// Whether retrying the same job could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_reason_hides_stderr() {
        let err = EncoderError::encode_failed(Some(1), "Invalid argument 'gradients'");
        let reason = err.public_reason();
        assert_eq!(reason, "encoding failed with exit code 1");
        assert!(!reason.contains("gradients"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(EncoderError::Timeout { timeout_secs: 300 }.is_retryable());
        assert!(!EncoderError::encode_failed(Some(1), "").is_retryable());
        assert!(!EncoderError::FfmpegNotFound {
            path: PathBuf::from("ffmpeg")
        }
        .is_retryable());
    }
}
