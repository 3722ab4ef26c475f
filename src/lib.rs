//! User accounts service
//! Credential login, paired access/refresh tokens, and user management over HTTP

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
