//! Route registration
//!
//! Every API endpoint is an interceptor chain ending in a handler. Chains are
//! immutable, so the shared bases below are extended per route without
//! affecting each other.

use crate::{
    auth::middleware::Authenticate,
    handlers,
    middleware::{request_tracking_middleware, AppState},
    pipeline::{handler, interceptors::ContentType, interceptors::Cors, Chain},
};
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware::from_fn,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Upper bound on request bodies
const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Shared bases: JSON content type, then the bearer check for each token kind
    let base = Chain::new().add(ContentType::json());
    let authenticated = base.add(Authenticate::new(state.jwt_service.access_key().clone()));
    let refreshing = base.add(Authenticate::new(state.jwt_service.refresh_key().clone()));

    // Session endpoints
    let authorize = base
        .add(Cors::allow(Method::POST))
        .then(handler(handlers::auth::authorize, state.clone()));

    let refresh = refreshing
        .add(Cors::allow(Method::POST))
        .then(handler(handlers::auth::refresh, state.clone()));

    // User management; registration is open, everything else needs an access token
    let create_user = base
        .add(Cors::allow(Method::POST))
        .then(handler(handlers::user::create_user, state.clone()));

    let list_users = authenticated
        .add(Cors::allow(Method::GET))
        .then(handler(handlers::user::list_users, state.clone()));

    let get_user = authenticated
        .add(Cors::allow(Method::GET))
        .then(handler(handlers::user::get_user, state.clone()));

    let update_user = authenticated
        .add(Cors::allow(Method::PUT))
        .then(handler(handlers::user::update_user, state.clone()));

    Router::new()
        // Probes (no chain)
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route_service("/authorize", authorize)
        .route_service("/refresh", refresh)
        .route_service("/user", create_user)
        .route_service("/users", list_users)
        .route_service("/users/username/{username}", get_user)
        .route_service("/user/username/{id}", update_user)
        // Outer layers, applied to every route
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(from_fn(request_tracking_middleware))
        .with_state(state)
}
