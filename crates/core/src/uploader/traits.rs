//! Trait definitions for the uploader module.

use async_trait::async_trait;
use std::path::Path;

use super::error::UploaderError;

/// Publishes an encoded output file and returns its durable public URL.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Returns the name of this uploader implementation.
    fn name(&self) -> &str;

    /// Publish the file at `path` as the result of `job_id`.
    ///
    /// The local file is consumed either way: the local backend moves it
    /// into the public directory, remote backends delete it once the
    /// upload attempt finishes, success or failure.
    async fn publish(&self, job_id: &str, path: &Path) -> Result<String, UploaderError>;
}
