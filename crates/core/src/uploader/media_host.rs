//! Remote media host delivery over multipart HTTP upload.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use super::config::MediaHostConfig;
use super::error::UploaderError;
use super::traits::Uploader;

/// Uploader that pushes outputs to an object-storage-style media host
/// and returns the durable URL from its response.
pub struct MediaHostUploader {
    config: MediaHostConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl MediaHostUploader {
    pub fn new(config: MediaHostConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    async fn upload(&self, job_id: &str, path: &Path) -> Result<String, UploaderError> {
        let bytes = fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UploaderError::SourceNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                UploaderError::Io(e)
            }
        })?;

        let file_name = format!("output-{job_id}.mp4");
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("video/mp4")?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("resource_type", "video")
            .text("folder", self.config.folder.clone())
            .text("public_id", format!("output-{job_id}"));

        let mut request = self.client.post(&self.config.upload_url).multipart(form);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploaderError::UploadRejected {
                reason: format!("status {status}: {}", truncate(&body, 200)),
            });
        }

        let parsed: UploadResponse =
            response
                .json()
                .await
                .map_err(|e| UploaderError::UploadRejected {
                    reason: format!("unparseable response: {e}"),
                })?;

        Ok(parsed.secure_url)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl Uploader for MediaHostUploader {
    fn name(&self) -> &str {
        "media_host"
    }

    async fn publish(&self, job_id: &str, path: &Path) -> Result<String, UploaderError> {
        let result = self.upload(job_id, path).await;

        // The local output is deleted after the attempt either way, a
        // failed upload must not leak files into the work dir.
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    job_id,
                    path = %path.display(),
                    error = %e,
                    "failed to delete output after upload"
                );
            }
        }

        result
    }
}
