//! Server configuration: serde types, figment loading, validation, and
//! the redacted view served at `/api/config`.

mod loader;
mod types;
mod validate;

pub use loader::*;
pub use types::*;
pub use validate::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    ParseError(String),

    #[error("Configuration rejected: {0}")]
    ValidationError(String),
}
