//! Mock encoder for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::encoder::{EncodeJob, EncodeResult, Encoder, EncoderError};

/// A recorded encode job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedEncode {
    /// The job that was submitted.
    pub job: EncodeJob,
    /// Whether the encode succeeded.
    pub success: bool,
}

/// Mock implementation of the Encoder trait.
///
/// Provides controllable behavior for testing:
/// - Track encode jobs for assertions
/// - Inject a failure for the next encode
/// - Optionally write a placeholder output file so uploaders have
///   something to consume
/// - Simulate encode duration
pub struct MockEncoder {
    /// Recorded encodes.
    encodes: Arc<RwLock<Vec<RecordedEncode>>>,
    /// If set, the next encode fails with this error.
    next_error: Arc<RwLock<Option<EncoderError>>>,
    /// Simulated encode duration in milliseconds.
    encode_duration_ms: Arc<RwLock<u64>>,
    /// Whether to create the output file on success.
    write_output: Arc<RwLock<bool>>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Create a new mock encoder.
    pub fn new() -> Self {
        Self {
            encodes: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            encode_duration_ms: Arc::new(RwLock::new(10)),
            write_output: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded encodes.
    pub async fn recorded_encodes(&self) -> Vec<RecordedEncode> {
        self.encodes.read().await.clone()
    }

    /// Get the number of encodes performed.
    pub async fn encode_count(&self) -> usize {
        self.encodes.read().await.len()
    }

    /// Make the next encode fail with the given error.
    pub async fn set_next_error(&self, error: EncoderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated encode duration.
    pub async fn set_encode_duration_ms(&self, ms: u64) {
        *self.encode_duration_ms.write().await = ms;
    }

    /// Write a placeholder output file on successful encodes.
    pub async fn set_write_output(&self, write: bool) {
        *self.write_output.write().await = write;
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn encode(&self, job: EncodeJob) -> Result<EncodeResult, EncoderError> {
        let duration_ms = *self.encode_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            self.encodes.write().await.push(RecordedEncode {
                job,
                success: false,
            });
            return Err(error);
        }

        if *self.write_output.read().await {
            if let Some(parent) = job.output_path.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            tokio::fs::write(&job.output_path, b"mock video").await?;
        }

        let result = EncodeResult {
            job_id: job.job_id.clone(),
            output_path: job.output_path.clone(),
            output_size_bytes: 10,
            duration_ms,
        };

        self.encodes.write().await.push(RecordedEncode {
            job,
            success: true,
        });

        Ok(result)
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtergraph::GraphSpec;
    use std::path::PathBuf;

    fn job(id: &str) -> EncodeJob {
        EncodeJob {
            job_id: id.to_string(),
            input_path: PathBuf::from("/in.mp4"),
            output_path: PathBuf::from("/out.mp4"),
            graph: GraphSpec {
                stages: vec![],
                aux_inputs: vec![],
                output_label: "composite".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_records_encodes() {
        let encoder = MockEncoder::new();
        encoder.set_encode_duration_ms(0).await;

        encoder.encode(job("a")).await.unwrap();
        encoder.encode(job("b")).await.unwrap();

        let recorded = encoder.recorded_encodes().await;
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].job.job_id, "a");
        assert!(recorded[0].success);
    }

    #[tokio::test]
    async fn test_next_error_fails_once() {
        let encoder = MockEncoder::new();
        encoder.set_encode_duration_ms(0).await;
        encoder
            .set_next_error(EncoderError::Timeout { timeout_secs: 1 })
            .await;

        assert!(encoder.encode(job("a")).await.is_err());
        assert!(encoder.encode(job("b")).await.is_ok());
    }
}
