//! Authentication-related models

use serde::{Deserialize, Serialize};

/// Authorize (login) request
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub username: String,
    pub password: String,
}

/// Freshly minted access + refresh token pair
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub expires_in: u64,
}
