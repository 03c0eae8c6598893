//! Local delivery: move outputs into a statically served directory.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use super::config::LocalDeliveryConfig;
use super::error::UploaderError;
use super::traits::Uploader;

/// Uploader that moves outputs into a local public directory and returns
/// a relative URL under the configured prefix.
pub struct LocalUploader {
    config: LocalDeliveryConfig,
}

impl LocalUploader {
    pub fn new(config: LocalDeliveryConfig) -> Self {
        Self { config }
    }

    fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            file_name
        )
    }
}

#[async_trait]
impl Uploader for LocalUploader {
    fn name(&self) -> &str {
        "local"
    }

    async fn publish(&self, job_id: &str, path: &Path) -> Result<String, UploaderError> {
        if !path.exists() {
            return Err(UploaderError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        fs::create_dir_all(&self.config.public_dir).await?;

        let file_name = format!("output-{job_id}.mp4");
        let destination = self.config.public_dir.join(&file_name);

        match fs::rename(path, &destination).await {
            Ok(()) => {}
            // Cross-filesystem moves fail with EXDEV (18 on Linux), fall
            // back to copy + delete.
            Err(e)
                if e.kind() == std::io::ErrorKind::CrossesDevices
                    || e.raw_os_error() == Some(18) =>
            {
                fs::copy(path, &destination).await.map_err(|error| {
                    UploaderError::MoveFailed {
                        source: path.to_path_buf(),
                        destination: destination.clone(),
                        error,
                    }
                })?;
                fs::remove_file(path).await?;
            }
            Err(error) => {
                return Err(UploaderError::MoveFailed {
                    source: path.to_path_buf(),
                    destination,
                    error,
                });
            }
        }

        Ok(self.public_url(&file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn uploader(public_dir: PathBuf) -> LocalUploader {
        LocalUploader::new(LocalDeliveryConfig {
            public_dir,
            base_url: "/outputs".to_string(),
        })
    }

    #[tokio::test]
    async fn test_publish_moves_file_and_returns_relative_url() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("work").join("output-abc.mp4");
        fs::create_dir_all(output.parent().unwrap()).await.unwrap();
        fs::write(&output, b"video bytes").await.unwrap();

        let public_dir = dir.path().join("public");
        let url = uploader(public_dir.clone())
            .publish("abc", &output)
            .await
            .unwrap();

        assert_eq!(url, "/outputs/output-abc.mp4");
        assert!(!output.exists());
        let moved = fs::read(public_dir.join("output-abc.mp4")).await.unwrap();
        assert_eq!(moved, b"video bytes");
    }

    #[tokio::test]
    async fn test_publish_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = uploader(dir.path().join("public"))
            .publish("abc", &dir.path().join("missing.mp4"))
            .await;

        assert!(matches!(result, Err(UploaderError::SourceNotFound { .. })));
    }

    #[tokio::test]
    async fn test_publish_creates_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output-x.mp4");
        fs::write(&output, b"v").await.unwrap();

        let public_dir = dir.path().join("nested").join("public");
        uploader(public_dir.clone())
            .publish("x", &output)
            .await
            .unwrap();

        assert!(public_dir.join("output-x.mp4").exists());
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let u = LocalUploader::new(LocalDeliveryConfig {
            public_dir: PathBuf::from("public"),
            base_url: "/outputs/".to_string(),
        });
        assert_eq!(u.public_url("output-1.mp4"), "/outputs/output-1.mp4");
    }
}
