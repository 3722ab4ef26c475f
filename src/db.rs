//! Store bootstrap
//! Builds the configured user store: a PostgreSQL pool or the in-memory map

use crate::{
    config::{StoreBackend, StoreConfig},
    repository::{MemoryUserStore, PgUserStore, UserStore},
};
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};

/// Create the database connection pool
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, DbError> {
    let db_url = config.url.as_ref().ok_or(DbError::MissingUrl)?;

    tracing::debug!("Creating database connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true)
        .connect(db_url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create database pool: {}", e);
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool created successfully"
    );

    Ok(pool)
}

/// Build the user store selected by `config.backend`
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn UserStore>, DbError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory user store; data is lost on restart");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = create_pool(config).await?;
            let store = PgUserStore::new(pool, &config.database, &config.collection);
            store
                .ensure_schema()
                .await
                .map_err(|e| DbError::SchemaFailed(e.to_string()))?;
            Ok(Arc::new(store))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("store.url is not set")]
    MissingUrl,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Schema setup failed: {0}")]
    SchemaFailed(String),
}
