//! Session endpoints: authorize and refresh

use super::JsonBody;
use crate::{
    auth::middleware::{Authenticated, RefreshContext},
    error::AppError,
    middleware::AppState,
    models::auth::{AuthorizeRequest, TokenPair},
};
use axum::{extract::State, Json};
use std::sync::Arc;

/// Exchange `{username, password}` for a token pair
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<AuthorizeRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let token_pair = state.auth_service.authorize(req).await?;
    Ok(Json(token_pair))
}

/// Exchange a verified refresh token for a new pair.
///
/// The refresh token itself was checked by the interceptor in front of this
/// handler; its claims arrive through the request extensions.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Authenticated(claims): RefreshContext,
) -> Result<Json<TokenPair>, AppError> {
    let token_pair = state.auth_service.refresh(&claims).await?;
    Ok(Json(token_pair))
}
