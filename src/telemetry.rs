//! Logging and metrics setup

use crate::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level` when set.
pub fn init_telemetry(config: &AppConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_layer = match config.logging.format.to_lowercase().as_str() {
        "pretty" => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.logging.level,
        format = %config.logging.format,
        "Telemetry initialized"
    );
}

/// Metrics are registered lazily on first use; this only describes them
pub fn init_metrics() {
    metrics::describe_counter!("http_requests_total", "HTTP requests by method and status");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
    tracing::debug!("Metrics initialized");
}
