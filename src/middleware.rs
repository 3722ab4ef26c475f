//! Application state and the outer request-tracking layer

use crate::{
    auth::jwt::JwtService,
    config::AppConfig,
    error::AppError,
    repository::UserStore,
    services::{AuthService, UserService},
};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::{sync::Arc, time::Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Process-wide state, built once at startup and read-only afterwards
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn UserStore>,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn UserStore>) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);

        Ok(Self {
            auth_service: Arc::new(AuthService::new(store.clone(), jwt_service.clone())),
            user_service: Arc::new(UserService::new(store.clone())),
            config,
            store,
            jwt_service,
        })
    }
}

/// Request tracking: one span per request carrying trace_id / request_id,
/// both echoed back as response headers
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method.clone(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// Reuse the caller's `x-trace-id` or generate one
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
