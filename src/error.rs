//! Unified error model
//! Error types and the JSON error envelope returned to clients

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{auth::jwt::TokenError, repository::StoreError};

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Resource not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Request body too large")]
    PayloadTooLarge,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::IdentityNotFound | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Store(_) | AppError::Config(_) | AppError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message, never carrying internals or token data
    pub fn user_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::IdentityNotFound | AppError::Unauthorized => {
                "Unauthorized access".to_string()
            }
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::NotFound => "Resource not found".to_string(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Store(_) => "DB request failed".to_string(),
            AppError::Signing(_) => "Token generation failed".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::PayloadTooLarge => "Request body too large".to_string(),
        }
    }

    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// Every token verification failure collapses into one generic rejection,
/// except signing failures which are server-side misconfiguration.
impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(msg) => AppError::Signing(msg),
            _ => AppError::Unauthorized,
        }
    }
}

/// Error response DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::debug!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}
