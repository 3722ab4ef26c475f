//! User accounts service entry point

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use users_service::{
    config::AppConfig, db, handlers::health, middleware::AppState, routes, telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI arguments =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("users-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // Load .env files (development only)
    // Priority: .env.<USERS_ENV> if set, otherwise .env.local > .env
    // Production sets real environment variables and ships no .env file
    if let Ok(env) = std::env::var("USERS_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    // Record process start for /health uptime
    health::set_start_time();

    // 1. Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. Logging and metrics
    telemetry::init_telemetry(&config);
    telemetry::init_metrics();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Users service starting...");

    // 3. User store (postgres pool + schema, or in-memory)
    let store = db::create_store(&config.store).await?;
    tracing::info!(backend = ?config.store.backend, "User store initialized");

    // 4. Application state: token keys and services over the shared store
    let app_state = Arc::new(AppState::new(config.clone(), store)?);

    // 5. Routes
    let app = routes::create_router(app_state);

    // 6. Bind and serve
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 7. Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, then arms a hard-exit timer so in-flight
/// requests get at most `timeout_secs` to drain
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // Hard exit once the drain timeout passes
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

fn print_help() {
    println!("users-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: users-service [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --version     Print version information and exit");
    println!("  --help        Print this help and exit");
    println!();
    println!("Environment:");
    println!("  All configuration comes from USERS_* variables, e.g.");
    println!("  USERS_SECURITY__ACCESS_SECRET, USERS_SECURITY__REFRESH_SECRET,");
    println!("  USERS_STORE__BACKEND, USERS_STORE__URL, USERS_SERVER__ADDR");
}
