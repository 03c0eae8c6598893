use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::credits::CreditsConfig;
use crate::encoder::EncoderConfig;
use crate::uploader::{DeliveryBackend, DeliveryConfig};
use crate::worker::WorkerConfig;

/// Root configuration. Every section has defaults so an empty file
/// (or no file plus env overrides) yields a working local setup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub credits: CreditsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    3001
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub method: AuthMethod,
    /// Required when method = "api_key"
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("clipbox.db")
}

/// Upload storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory where uploaded videos and images land.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// Maximum accepted video upload size in bytes (default: 100 MB).
    #[serde(default = "default_max_video_bytes")]
    pub max_video_bytes: u64,
    /// Maximum accepted image upload size in bytes (default: 5 MB).
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_video_bytes: default_max_video_bytes(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_video_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_max_image_bytes() -> u64 {
    5 * 1024 * 1024
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub encoder: EncoderConfig,
    pub delivery: SanitizedDeliveryConfig,
    pub worker: WorkerConfig,
    pub credits: CreditsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub api_key_configured: bool,
}

/// Sanitized delivery config (media host API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDeliveryConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_host: Option<SanitizedMediaHostConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMediaHostConfig {
    pub upload_url: String,
    pub api_key_configured: bool,
    pub folder: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                api_key_configured: config
                    .auth
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            encoder: config.encoder.clone(),
            delivery: SanitizedDeliveryConfig {
                backend: match config.delivery.backend {
                    DeliveryBackend::Local => "local".to_string(),
                    DeliveryBackend::MediaHost => "media_host".to_string(),
                },
                media_host: config
                    .delivery
                    .media_host
                    .as_ref()
                    .map(|m| SanitizedMediaHostConfig {
                        upload_url: m.upload_url.clone(),
                        api_key_configured: m
                            .api_key
                            .as_ref()
                            .is_some_and(|k| !k.is_empty()),
                        folder: m.folder.clone(),
                        timeout_secs: m.timeout_secs,
                    }),
            },
            worker: config.worker.clone(),
            credits: config.credits.clone(),
        }
    }
}
