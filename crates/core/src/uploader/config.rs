//! Configuration for result delivery.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Delivery backend type.
    #[serde(default)]
    pub backend: DeliveryBackend,
    /// Local backend configuration.
    #[serde(default)]
    pub local: Option<LocalDeliveryConfig>,
    /// Media host backend configuration (required when backend = "media_host").
    #[serde(default)]
    pub media_host: Option<MediaHostConfig>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            backend: DeliveryBackend::Local,
            local: Some(LocalDeliveryConfig::default()),
            media_host: None,
        }
    }
}

/// Available delivery backends.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryBackend {
    #[default]
    Local,
    MediaHost,
}

impl DeliveryBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::MediaHost => "media_host",
        }
    }
}

/// Local delivery: outputs are moved into a directory the server serves
/// statically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalDeliveryConfig {
    /// Directory served at `base_url`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// URL prefix returned to clients.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for LocalDeliveryConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            base_url: default_base_url(),
        }
    }
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_base_url() -> String {
    "/outputs".to_string()
}

/// Remote media host delivery over multipart HTTP upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaHostConfig {
    /// Upload endpoint URL.
    pub upload_url: String,
    /// Bearer token, sent when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Remote folder to file outputs under.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Request timeout in seconds.
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u32,
}

fn default_folder() -> String {
    "clipbox/outputs".to_string()
}

fn default_upload_timeout() -> u32 {
    60
}
