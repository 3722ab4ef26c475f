//! Liveness and readiness probes

use crate::middleware::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::{sync::Arc, sync::OnceLock, time::Instant};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record process start; later calls are no-ops
pub fn set_start_time() {
    APP_START_TIME.get_or_init(Instant::now);
}

pub fn get_uptime() -> u64 {
    APP_START_TIME.get().map_or(0, |start| start.elapsed().as_secs())
}

/// Liveness: answers without touching dependencies
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// Readiness: pings the user store
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store_check = match state.store.ping().await {
        Ok(()) => HealthCheck {
            name: "store".to_string(),
            status: "healthy".to_string(),
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            HealthCheck {
                name: "store".to_string(),
                status: "unhealthy".to_string(),
                message: Some(e.to_string()),
            }
        }
    };

    let checks = vec![store_check];
    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
