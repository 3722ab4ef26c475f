//! JWT token generation and validation
//! Implements access token + refresh token pattern with one secret per kind

use crate::{
    auth::claims::{
        build_access_claims, build_refresh_claims, Access, ClaimSet, Purpose, Refresh, TokenKind,
    },
    config::AppConfig,
    error::AppError,
    models::{auth::TokenPair, user::Identity},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;

/// Token codec failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token could not be parsed")]
    Malformed,

    #[error("token purpose does not match")]
    WrongPurpose,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// On-the-wire claims
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaims {
    username: String,
    user_id: String,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    access: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    refresh: bool,
    iat: i64,
    exp: i64,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl WireClaims {
    fn purpose(&self) -> Option<Purpose> {
        match (self.access, self.refresh) {
            (true, false) => Some(Purpose::Access),
            (false, true) => Some(Purpose::Refresh),
            _ => None,
        }
    }
}

/// HMAC secret for one token kind
pub struct SigningKey<K: TokenKind> {
    encoding: EncodingKey,
    decoding: DecodingKey,
    kind: PhantomData<K>,
}

impl<K: TokenKind> SigningKey<K> {
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::Signing(format!(
                "{} secret is empty",
                K::PURPOSE.as_str()
            )));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            kind: PhantomData,
        })
    }
}

impl<K: TokenKind> Clone for SigningKey<K> {
    fn clone(&self) -> Self {
        Self {
            encoding: self.encoding.clone(),
            decoding: self.decoding.clone(),
            kind: PhantomData,
        }
    }
}

/// Sign `claims` with `key`, expiring `ttl` from now
pub fn sign<K: TokenKind>(
    claims: &ClaimSet<K>,
    key: &SigningKey<K>,
    ttl: Duration,
) -> Result<String, TokenError> {
    sign_at(claims, key, Utc::now(), ttl)
}

/// Sign as if issued at `issued_at`
pub fn sign_at<K: TokenKind>(
    claims: &ClaimSet<K>,
    key: &SigningKey<K>,
    issued_at: DateTime<Utc>,
    ttl: Duration,
) -> Result<String, TokenError> {
    if ttl <= Duration::zero() {
        return Err(TokenError::Signing("token ttl must be positive".to_string()));
    }

    let wire = WireClaims {
        username: claims.username.clone(),
        user_id: claims.user_id.clone(),
        name: claims.name.clone(),
        access: K::PURPOSE == Purpose::Access,
        refresh: K::PURPOSE == Purpose::Refresh,
        iat: issued_at.timestamp(),
        exp: (issued_at + ttl).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &wire, &key.encoding).map_err(|e| {
        tracing::error!(purpose = K::PURPOSE.as_str(), "Failed to encode token: {:?}", e);
        TokenError::Signing(e.to_string())
    })
}

/// Verify signature and expiry, then check the purpose flag against `K`
pub fn verify<K: TokenKind>(token: &str, key: &SigningKey<K>) -> Result<ClaimSet<K>, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let wire = decode::<WireClaims>(token, &key.decoding, &validation)
        .map_err(|e| {
            tracing::debug!(
                purpose = K::PURPOSE.as_str(),
                "Token validation failed: {:?}",
                e.kind()
            );
            TokenError::from(e)
        })?
        .claims;

    if wire.purpose() != Some(K::PURPOSE) {
        tracing::debug!(expected = K::PURPOSE.as_str(), "Token purpose mismatch");
        return Err(TokenError::WrongPurpose);
    }

    Ok(ClaimSet::new(wire.user_id, wire.username, wire.name))
}

/// JWT service: both signing keys and their lifetimes
pub struct JwtService {
    access_key: SigningKey<Access>,
    refresh_key: SigningKey<Refresh>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_token_exp_secs: u64,
        refresh_token_exp_secs: u64,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            access_key: SigningKey::new(access_secret.as_bytes())?,
            refresh_key: SigningKey::new(refresh_secret.as_bytes())?,
            access_ttl: Duration::seconds(access_token_exp_secs as i64),
            refresh_ttl: Duration::seconds(refresh_token_exp_secs as i64),
        })
    }

    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let security = &config.security;

        Self::new(
            security.access_secret.expose_secret(),
            security.refresh_secret.expose_secret(),
            security.access_token_exp_secs,
            security.refresh_token_exp_secs,
        )
        .map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn access_key(&self) -> &SigningKey<Access> {
        &self.access_key
    }

    pub fn refresh_key(&self) -> &SigningKey<Refresh> {
        &self.refresh_key
    }

    /// Build, sign and return both tokens for `identity`; all or nothing
    pub fn generate_token_pair(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        let access_token = sign(
            &build_access_claims(identity),
            &self.access_key,
            self.access_ttl,
        )?;
        let refresh_token = sign(
            &build_refresh_claims(identity),
            &self.refresh_key,
            self.refresh_ttl,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl.num_seconds() as u64,
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<ClaimSet<Access>, TokenError> {
        verify(token, &self.access_key)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<ClaimSet<Refresh>, TokenError> {
        verify(token, &self.refresh_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "test_access_secret_32_characters_long!";
    const REFRESH_SECRET: &str = "test_refresh_secret_32_characters_long";

    fn service() -> JwtService {
        JwtService::new(ACCESS_SECRET, REFRESH_SECRET, 900, 604800).unwrap()
    }

    fn identity() -> Identity {
        Identity {
            id: "64b0c2".to_string(),
            username: "testuser".to_string(),
            name: "Test User".to_string(),
        }
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let key = SigningKey::<Access>::new(ACCESS_SECRET.as_bytes()).unwrap();
        let claims = build_access_claims(&identity());

        let token = sign(&claims, &key, Duration::minutes(5)).unwrap();
        assert_eq!(verify(&token, &key).unwrap(), claims);
    }

    #[test]
    fn test_expired_token() {
        let key = SigningKey::<Access>::new(ACCESS_SECRET.as_bytes()).unwrap();
        let claims = build_access_claims(&identity());

        let token = sign_at(
            &claims,
            &key,
            Utc::now() - Duration::hours(2),
            Duration::hours(1),
        )
        .unwrap();
        assert_eq!(verify(&token, &key), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let key = SigningKey::<Access>::new(ACCESS_SECRET.as_bytes()).unwrap();
        let other = SigningKey::<Access>::new(b"some_other_secret_value_of_32_chars!").unwrap();

        let token = sign(&build_access_claims(&identity()), &key, Duration::minutes(5)).unwrap();
        assert_eq!(verify(&token, &other), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_malformed_token() {
        let key = SigningKey::<Refresh>::new(REFRESH_SECRET.as_bytes()).unwrap();
        assert_eq!(verify("invalid_token", &key), Err(TokenError::Malformed));
        assert_eq!(verify("", &key), Err(TokenError::Malformed));
    }

    #[test]
    fn test_purpose_flag_checked_even_with_same_secret() {
        let access = SigningKey::<Access>::new(ACCESS_SECRET.as_bytes()).unwrap();
        let refresh_same_secret = SigningKey::<Refresh>::new(ACCESS_SECRET.as_bytes()).unwrap();

        let token = sign(&build_access_claims(&identity()), &access, Duration::minutes(5)).unwrap();
        assert_eq!(
            verify(&token, &refresh_same_secret),
            Err(TokenError::WrongPurpose)
        );
    }

    #[test]
    fn test_non_positive_ttl_is_signing_error() {
        let key = SigningKey::<Access>::new(ACCESS_SECRET.as_bytes()).unwrap();
        let result = sign(&build_access_claims(&identity()), &key, Duration::zero());
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SigningKey::<Access>::new(b""),
            Err(TokenError::Signing(_))
        ));
    }

    #[test]
    fn test_generate_and_validate_token_pair() {
        let service = service();
        let pair = service.generate_token_pair(&identity()).unwrap();

        let access = service.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(access.username, "testuser");
        assert_eq!(access.user_id, "64b0c2");

        let refresh = service.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.username, "testuser");
        assert_eq!(pair.expires_in, 900);
    }

    #[test]
    fn test_token_kinds_not_interchangeable() {
        let service = service();
        let pair = service.generate_token_pair(&identity()).unwrap();

        assert!(service.validate_refresh_token(&pair.access_token).is_err());
        assert!(service.validate_access_token(&pair.refresh_token).is_err());
    }
}
