//! Result delivery backends.
//!
//! An [`Uploader`] consumes an encoded output file and turns it into a
//! durable public URL, either by moving it into a locally served
//! directory or by pushing it to a remote media host.

mod config;
mod error;
mod local;
mod media_host;
mod traits;

pub use config::*;
pub use error::*;
pub use local::*;
pub use media_host::*;
pub use traits::*;

/// Factory function to create the uploader selected in config.
pub fn create_uploader(config: &DeliveryConfig) -> Result<Box<dyn Uploader>, UploaderError> {
    match config.backend {
        DeliveryBackend::Local => {
            let local = config.local.clone().unwrap_or_default();
            Ok(Box::new(LocalUploader::new(local)))
        }
        DeliveryBackend::MediaHost => {
            let media_host = config.media_host.clone().ok_or_else(|| {
                UploaderError::Configuration(
                    "delivery.media_host must be set when backend = \"media_host\"".to_string(),
                )
            })?;
            Ok(Box::new(MediaHostUploader::new(media_host)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uploader_local_default() {
        let config = DeliveryConfig::default();
        let uploader = create_uploader(&config).unwrap();
        assert_eq!(uploader.name(), "local");
    }

    #[test]
    fn test_create_uploader_media_host() {
        let config = DeliveryConfig {
            backend: DeliveryBackend::MediaHost,
            local: None,
            media_host: Some(MediaHostConfig {
                upload_url: "https://media.example/upload".to_string(),
                api_key: Some("secret".to_string()),
                folder: "clipbox/outputs".to_string(),
                timeout_secs: 60,
            }),
        };
        let uploader = create_uploader(&config).unwrap();
        assert_eq!(uploader.name(), "media_host");
    }

    #[test]
    fn test_create_uploader_media_host_missing_config() {
        let config = DeliveryConfig {
            backend: DeliveryBackend::MediaHost,
            local: None,
            media_host: None,
        };
        let result = create_uploader(&config);
        assert!(matches!(result, Err(UploaderError::Configuration(_))));
    }
}
