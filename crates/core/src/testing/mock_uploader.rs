//! Mock uploader for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::uploader::{Uploader, UploaderError};

/// A recorded publish call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPublish {
    pub job_id: String,
    pub path: PathBuf,
}

/// Mock implementation of the Uploader trait. Returns
/// `https://media.test/output-{job_id}.mp4` unless an error is injected.
pub struct MockUploader {
    publishes: Arc<RwLock<Vec<RecordedPublish>>>,
    next_error: Arc<RwLock<Option<UploaderError>>>,
}

impl Default for MockUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUploader {
    /// Create a new mock uploader.
    pub fn new() -> Self {
        Self {
            publishes: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded publish calls.
    pub async fn recorded_publishes(&self) -> Vec<RecordedPublish> {
        self.publishes.read().await.clone()
    }

    /// Make the next publish fail with the given error.
    pub async fn set_next_error(&self, error: UploaderError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Uploader for MockUploader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(&self, job_id: &str, path: &Path) -> Result<String, UploaderError> {
        self.publishes.write().await.push(RecordedPublish {
            job_id: job_id.to_string(),
            path: path.to_path_buf(),
        });

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(format!("https://media.test/output-{job_id}.mp4"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_stable_url() {
        let uploader = MockUploader::new();
        let url = uploader
            .publish("abc", Path::new("/out.mp4"))
            .await
            .unwrap();
        assert_eq!(url, "https://media.test/output-abc.mp4");
        assert_eq!(uploader.recorded_publishes().await.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_error() {
        let uploader = MockUploader::new();
        uploader
            .set_next_error(UploaderError::UploadRejected {
                reason: "quota".to_string(),
            })
            .await;

        assert!(uploader.publish("abc", Path::new("/out.mp4")).await.is_err());
        assert!(uploader.publish("abc", Path::new("/out.mp4")).await.is_ok());
    }
}
