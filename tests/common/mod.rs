//! Shared helpers for the HTTP integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use std::{collections::HashMap, sync::Arc};
use users_service::{
    auth::password::PasswordHasher,
    config::{AppConfig, LoggingConfig, SecurityConfig, ServerConfig, StoreBackend, StoreConfig},
    middleware::AppState,
    models::user::UserDocument,
    repository::{MemoryUserStore, UserStore},
    routes,
};

pub const ACCESS_SECRET: &str = "test-access-secret-for-testing-only-32+";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-testing-only-32";

pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            url: None,
            database: "users".to_string(),
            collection: "users".to_string(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            access_secret: Secret::new(ACCESS_SECRET.to_string()),
            refresh_secret: Secret::new(REFRESH_SECRET.to_string()),
            access_token_exp_secs: 300,
            refresh_token_exp_secs: 3600,
        },
    }
}

/// Router over a fresh in-memory store, with the store and state kept for
/// direct inspection
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryUserStore>,
    pub state: Arc<AppState>,
}

pub fn create_test_app() -> TestApp {
    let store = Arc::new(MemoryUserStore::new());
    let state = Arc::new(
        AppState::new(create_test_config(), store.clone()).expect("Failed to build app state"),
    );

    TestApp {
        router: routes::create_router(state.clone()),
        store,
        state,
    }
}

/// Insert a user straight into the store and return its id
pub async fn create_test_user(store: &MemoryUserStore, username: &str, password: &str) -> String {
    let id = format!("id-{}", username);
    store
        .insert(UserDocument {
            id: id.clone(),
            username: username.to_string(),
            name: format!("{} name", username),
            rating: HashMap::from([("blitz".to_string(), 1500)]),
            password: PasswordHasher::new().hash(password),
        })
        .await
        .expect("Failed to create test user");
    id
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn bearer_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(body)
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
