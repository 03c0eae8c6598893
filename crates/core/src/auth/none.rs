//! No-op authentication for local and single-user deployments.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Lets every request through as the anonymous identity.
#[derive(Default)]
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_everyone_is_anonymous() {
        let auth = NoneAuthenticator::new();
        let identity = auth
            .authenticate(&AuthRequest {
                headers: HashMap::new(),
                source_ip: "127.0.0.1".parse().unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(identity.user_id, "anonymous");
        assert_eq!(auth.method_name(), "none");
    }
}
