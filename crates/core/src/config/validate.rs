use crate::config::AuthMethod;
use crate::uploader::DeliveryBackend;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - ApiKey auth has a non-empty key
/// - MediaHost delivery has its [delivery.media_host] section
/// - Encoder CRF is within libx264's 0..=51 range
/// - Worker concurrency is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is \"api_key\"".to_string(),
        ));
    }

    if config.delivery.backend == DeliveryBackend::MediaHost && config.delivery.media_host.is_none()
    {
        return Err(ConfigError::ValidationError(
            "delivery.media_host must be set when delivery.backend is \"media_host\"".to_string(),
        ));
    }

    if config.encoder.crf > 51 {
        return Err(ConfigError::ValidationError(format!(
            "encoder.crf must be between 0 and 51, got {}",
            config.encoder.crf
        )));
    }

    if config.worker.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "worker.concurrency cannot be 0".to_string(),
        ));
    }

    Ok(())
}
