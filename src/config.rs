//! Configuration
//! Loaded once from defaults and environment variables; secrets are wrapped in `Secret`

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. "0.0.0.0:3000"
    pub addr: String,
    /// Graceful shutdown timeout (seconds)
    pub graceful_shutdown_timeout_secs: u64,
}

/// Which user store implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Connection URL, only required for the postgres backend
    pub url: Option<Secret<String>>,
    /// Database (schema) holding the user collection
    pub database: String,
    /// Collection (table) holding user documents
    pub collection: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error
    pub level: String,
    /// json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Signing secret for access tokens
    pub access_secret: Secret<String>,
    /// Signing secret for refresh tokens, must differ from the access secret
    pub refresh_secret: Secret<String>,
    /// Access token lifetime (seconds)
    pub access_token_exp_secs: u64,
    /// Refresh token lifetime (seconds)
    pub refresh_token_exp_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// Load configuration from environment variables (prefix `USERS_`, section separator `__`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("store.backend", "postgres")?
            .set_default("store.database", "users")?
            .set_default("store.collection", "users")?
            .set_default("store.max_connections", 10)?
            .set_default("store.acquire_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.access_token_exp_secs", 900)?
            .set_default("security.refresh_token_exp_secs", 604800)?
            .add_source(
                Environment::with_prefix("USERS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the loaded values; any failure is fatal at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.store.backend == StoreBackend::Postgres && self.store.url.is_none() {
            return Err(ConfigError::Message(
                "store.url is required for the postgres backend".to_string(),
            ));
        }

        for (field, value) in [
            ("store.database", &self.store.database),
            ("store.collection", &self.store.collection),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::Message(format!(
                    "{} must be a non-empty identifier of [A-Za-z0-9_], got '{}'",
                    field, value
                )));
            }
        }

        let access = self.security.access_secret.expose_secret();
        let refresh = self.security.refresh_secret.expose_secret();

        if access.len() < 32 || refresh.len() < 32 {
            return Err(ConfigError::Message(
                "Token secrets must be at least 32 characters long".to_string(),
            ));
        }

        if access == refresh {
            return Err(ConfigError::Message(
                "Access and refresh secrets must differ".to_string(),
            ));
        }

        if self.security.access_token_exp_secs < 60 || self.security.access_token_exp_secs > 86400 {
            return Err(ConfigError::Message(
                "access_token_exp_secs must be between 60 and 86400 (1 minute to 24 hours)"
                    .to_string(),
            ));
        }

        if self.security.refresh_token_exp_secs < 3600
            || self.security.refresh_token_exp_secs > 2592000
        {
            return Err(ConfigError::Message(
                "refresh_token_exp_secs must be between 3600 and 2592000 (1 hour to 30 days)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "USERS_STORE__BACKEND",
        "USERS_STORE__URL",
        "USERS_SECURITY__ACCESS_SECRET",
        "USERS_SECURITY__REFRESH_SECRET",
        "USERS_LOGGING__LEVEL",
        "USERS_SERVER__ADDR",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn set_valid_env() {
        std::env::set_var("USERS_STORE__BACKEND", "memory");
        std::env::set_var(
            "USERS_SECURITY__ACCESS_SECRET",
            "access-secret-for-tests-at-least-32-chars",
        );
        std::env::set_var(
            "USERS_SECURITY__REFRESH_SECRET",
            "refresh-secret-for-tests-at-least-32-chars",
        );
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        set_valid_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:3000");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.collection, "users");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.security.access_token_exp_secs, 900);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_secrets_are_fatal() {
        clear_env();
        std::env::set_var("USERS_STORE__BACKEND", "memory");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_equal_secrets_rejected() {
        clear_env();
        set_valid_env();
        std::env::set_var(
            "USERS_SECURITY__REFRESH_SECRET",
            "access-secret-for-tests-at-least-32-chars",
        );

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_postgres_requires_url() {
        clear_env();
        set_valid_env();
        std::env::set_var("USERS_STORE__BACKEND", "postgres");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_log_level() {
        clear_env();
        set_valid_env();
        std::env::set_var("USERS_LOGGING__LEVEL", "invalid");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("users_v2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("users; DROP TABLE"));
    }
}
