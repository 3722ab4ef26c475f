//! Session flows: authorize with credentials, refresh with a refresh token
//!
//! Both flows are stateless. A token pair is returned whole or not at all.

use crate::{
    auth::{claims::RefreshClaims, jwt::JwtService, password::PasswordHasher},
    error::AppError,
    models::{
        auth::{AuthorizeRequest, TokenPair},
        user::{Identity, User},
    },
    repository::{UserFilter, UserStore},
};
use std::sync::Arc;

pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            store,
            jwt_service,
            hasher: PasswordHasher::new(),
        }
    }

    /// Verify `{username, password}` and mint a token pair.
    ///
    /// Unknown user, wrong password and lookup failures all come back as
    /// `InvalidCredentials` so callers cannot probe for usernames.
    pub async fn authorize(&self, req: AuthorizeRequest) -> Result<TokenPair, AppError> {
        // Match username and digest in one lookup
        let filter = UserFilter::Credentials {
            username: req.username.clone(),
            digest: self.hasher.hash(&req.password),
        };

        let doc = match self.store.find_one(&filter).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::info!(username = %req.username, "Login rejected");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(error = %e, "Credential lookup failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        // Both tokens or none
        let user = User::from(doc);
        let token_pair = self.jwt_service.generate_token_pair(&Identity::from(&user))?;

        tracing::info!(user_id = %user.id, "User authorized");
        Ok(token_pair)
    }

    /// Mint a fresh pair for the subject of an already verified refresh token.
    ///
    /// The identity is reloaded from the store rather than trusted from the
    /// token, so changes since issuance are picked up.
    pub async fn refresh(&self, claims: &RefreshClaims) -> Result<TokenPair, AppError> {
        let doc = self
            .store
            .find_one(&UserFilter::Id(claims.user_id.clone()))
            .await?
            .ok_or_else(|| {
                tracing::info!(user_id = %claims.user_id, "Refresh for unknown identity");
                AppError::IdentityNotFound
            })?;

        let user = User::from(doc);
        let token_pair = self.jwt_service.generate_token_pair(&Identity::from(&user))?;

        tracing::info!(user_id = %user.id, "Token pair refreshed");
        Ok(token_pair)
    }
}
