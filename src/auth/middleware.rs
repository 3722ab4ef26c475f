//! Bearer-token authentication interceptor

use crate::{
    auth::{
        claims::{Access, ClaimSet, Refresh, TokenKind},
        jwt::{verify, SigningKey},
    },
    error::AppError,
    pipeline::{Interceptor, Next},
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};

/// Verified claims attached to the request by [`Authenticate`]
#[derive(Debug, Clone)]
pub struct Authenticated<K: TokenKind>(pub ClaimSet<K>);

/// Caller identity from a verified access token
pub type AuthContext = Authenticated<Access>;

/// Caller identity from a verified refresh token
pub type RefreshContext = Authenticated<Refresh>;

impl<S, K> FromRequestParts<S> for Authenticated<K>
where
    S: Send + Sync,
    K: TokenKind,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClaimSet<K>>()
            .cloned()
            .map(Authenticated)
            .ok_or(AppError::Unauthorized)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// Verifies the bearer token against the key for kind `K` and attaches the
/// claims to the request. Any failure is a generic 401.
pub struct Authenticate<K: TokenKind> {
    key: SigningKey<K>,
}

impl<K: TokenKind> Authenticate<K> {
    pub fn new(key: SigningKey<K>) -> Self {
        Self { key }
    }
}

#[async_trait]
impl<K: TokenKind> Interceptor for Authenticate<K> {
    async fn intercept(&self, mut req: Request, next: Next<'_>) -> Response {
        let verified = extract_token(req.headers())
            .and_then(|token| verify(token, &self.key).map_err(AppError::from));

        match verified {
            Ok(claims) => {
                tracing::debug!(
                    user_id = %claims.user_id,
                    purpose = K::PURPOSE.as_str(),
                    "Token verified"
                );
                req.extensions_mut().insert(claims);
                next.run(req).await
            }
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_valid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        let token = extract_token(&headers).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn test_extract_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "InvalidFormat".parse().unwrap());
        assert!(extract_token(&headers).is_err());

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert!(extract_token(&headers).is_err());
    }
}
