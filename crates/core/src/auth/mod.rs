//! Request authentication.
//!
//! The server extracts headers and the peer address into an
//! [`AuthRequest`] and asks the configured [`Authenticator`] for an
//! [`Identity`]. The identity's `user_id` is what credit accounting
//! keys on.

mod api_key;
mod none;

pub use api_key::ApiKeyAuthenticator;
pub use none::NoneAuthenticator;

use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AuthConfig, AuthMethod};

#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials were presented at all.
    #[error("Authentication required")]
    NotAuthenticated,

    /// Credentials were presented but did not check out.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The authenticator itself is misconfigured.
    #[error("Auth configuration error: {0}")]
    ConfigurationError(String),
}

/// The parts of an HTTP request that authentication looks at. Header
/// names are lowercased by the caller.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Who a request is acting as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve a request to an identity, or reject it.
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    fn method_name(&self) -> &'static str;
}

/// Build the authenticator selected in config.
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::ApiKey => match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(Box::new(ApiKeyAuthenticator::new(key))),
            _ => Err(AuthError::ConfigurationError(
                "auth method 'api_key' requires a non-empty api_key".to_string(),
            )),
        },
    }
}
