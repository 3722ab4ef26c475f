//! HTTP handlers

pub mod auth;
pub mod health;
pub mod user;

use crate::error::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

/// JSON request body.
///
/// Unlike `axum::Json` this does not insist on a `Content-Type` header, and
/// every decode failure is reported as a 400 in the service error format.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "Failed to read request body");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge
            } else {
                decode_failed()
            }
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode request body");
            decode_failed()
        })
    }
}

fn decode_failed() -> AppError {
    AppError::BadRequest("Failed to decode the request body".to_string())
}
