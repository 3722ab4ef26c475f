//! User management endpoints

use super::JsonBody;
use crate::{
    auth::middleware::{AuthContext, Authenticated},
    error::AppError,
    middleware::AppState,
    models::user::{InsertAck, UpdateAck, UpdateUser, User, UserRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Register a new user
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<UserRequest>,
) -> Result<(StatusCode, Json<InsertAck>), AppError> {
    let ack = state.user_service.create(req).await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

/// Fetch the users named in the JSON array body
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Authenticated(claims): AuthContext,
    JsonBody(usernames): JsonBody<Vec<String>>,
) -> Result<Json<Vec<User>>, AppError> {
    tracing::debug!(caller = %claims.user_id, count = usernames.len(), "Listing users");
    let users = state.user_service.list(&usernames).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Path(username): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = state.user_service.get_by_username(&username).await?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Authenticated(claims): AuthContext,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<UpdateUser>,
) -> Result<Json<UpdateAck>, AppError> {
    tracing::debug!(caller = %claims.user_id, target = %id, "Updating user");
    let ack = state.user_service.update(&id, update).await?;
    Ok(Json(ack))
}
