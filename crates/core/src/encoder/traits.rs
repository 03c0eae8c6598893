//! Trait definitions for the encoder module.

use async_trait::async_trait;

use super::error::EncoderError;
use super::types::{EncodeJob, EncodeResult};

/// An encoder that renders a filter graph over an input video.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Runs one encode job to completion.
    ///
    /// Auxiliary input files referenced by the job's graph are deleted
    /// before this returns, on every exit path.
    async fn encode(&self, job: EncodeJob) -> Result<EncodeResult, EncoderError>;

    /// Validates that the encoder is properly configured and ready.
    async fn validate(&self) -> Result<(), EncoderError>;
}
