//! Shared-key authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Checks requests against a single configured key, presented as either
/// `Authorization: Bearer <key>` or `X-API-Key: <key>`.
pub struct ApiKeyAuthenticator {
    expected_key: String,
}

impl ApiKeyAuthenticator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            expected_key: api_key.into(),
        }
    }
}

/// Pull the presented key out of the request, if any.
fn presented_key(request: &AuthRequest) -> Option<&str> {
    if let Some(value) = request.headers.get("authorization") {
        let mut parts = value.splitn(2, ' ');
        let scheme = parts.next().unwrap_or_default();
        if scheme.eq_ignore_ascii_case("bearer") {
            return parts.next().map(str::trim);
        }
    }
    request.headers.get("x-api-key").map(String::as_str)
}

/// Compare keys without short-circuiting on the first mismatched byte.
fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let presented = presented_key(request).ok_or(AuthError::NotAuthenticated)?;

        if !keys_match(presented.as_bytes(), self.expected_key.as_bytes()) {
            return Err(AuthError::InvalidCredentials("wrong API key".to_string()));
        }

        // One shared key means one logical user.
        Ok(Identity {
            user_id: "api_key_user".to_string(),
            method: "api_key".to_string(),
        })
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn request_with(headers: &[(&str, &str)]) -> AuthRequest {
        AuthRequest {
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            source_ip: "10.0.0.7".parse::<IpAddr>().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_accepts_bearer_header() {
        let auth = ApiKeyAuthenticator::new("k-0042");
        for header in ["Bearer k-0042", "bearer k-0042", "BEARER k-0042"] {
            let identity = auth
                .authenticate(&request_with(&[("Authorization", header)]))
                .await
                .unwrap();
            assert_eq!(identity.user_id, "api_key_user");
            assert_eq!(identity.method, "api_key");
        }
    }

    #[tokio::test]
    async fn test_accepts_x_api_key_header() {
        let auth = ApiKeyAuthenticator::new("k-0042");
        let identity = auth
            .authenticate(&request_with(&[("X-API-Key", "k-0042")]))
            .await
            .unwrap();
        assert_eq!(identity.user_id, "api_key_user");
    }

    #[tokio::test]
    async fn test_rejects_wrong_key() {
        let auth = ApiKeyAuthenticator::new("k-0042");
        let result = auth
            .authenticate(&request_with(&[("Authorization", "Bearer nope")]))
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_rejects_bare_request() {
        let auth = ApiKeyAuthenticator::new("k-0042");
        let result = auth.authenticate(&request_with(&[])).await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_rejects_non_bearer_scheme() {
        let auth = ApiKeyAuthenticator::new("k-0042");
        let result = auth
            .authenticate(&request_with(&[("Authorization", "Basic k-0042")]))
            .await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(b"abc", b"abc"));
        assert!(!keys_match(b"abc", b"abd"));
        assert!(!keys_match(b"abc", b"ab"));
        assert!(keys_match(b"", b""));
    }
}
