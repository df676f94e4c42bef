//! Configuration management.
//!
//! Configuration is read from environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `DATA_DIR` - Optional. Directory for the database and account file. Defaults to `./data`.
//! - `TASK_STORE` - Optional. Storage backend, `memory` or `sqlite`. Defaults to `sqlite`.
//! - `DEV_MODE` - Optional. When truthy, `/tarefas` endpoints skip auth. Defaults to `false`.
//! - `JWT_SECRET` - Optional. Secret for login tokens; auth is enforced only when set.
//! - `JWT_TTL_DAYS` - Optional. Token lifetime in days. Defaults to `30`.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Auth configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// JWT signing secret. Unset means auth is not configured.
    pub jwt_secret: Option<String>,
    /// Token lifetime in days.
    pub jwt_ttl_days: i64,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory holding the SQLite database and the account file
    pub data_dir: PathBuf,

    /// Task store backend
    pub store: StoreKind,

    /// Dev mode disables auth checks
    pub dev_mode: bool,

    /// Auth configuration
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let store = StoreKind::parse(
            &std::env::var("TASK_STORE").unwrap_or_else(|_| "sqlite".to_string()),
        );

        let dev_mode = env_var_bool("DEV_MODE", false);

        let jwt_ttl_days = std::env::var("JWT_TTL_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("JWT_TTL_DAYS".to_string(), format!("{}", e))
            })?;

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            jwt_ttl_days,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            store,
            dev_mode,
            auth,
        })
    }

    /// Whether `/tarefas` requests must carry a valid bearer token.
    ///
    /// The original app shipped with no real auth, so an unconfigured
    /// secret keeps the API open; setting `JWT_SECRET` (outside dev mode)
    /// turns enforcement on without code changes.
    pub fn auth_required(&self) -> bool {
        !self.dev_mode && self.auth.jwt_secret.is_some()
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(data_dir: PathBuf, store: StoreKind) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir,
            store,
            dev_mode: true,
            auth: AuthConfig {
                jwt_secret: None,
                jwt_ttl_days: 30,
            },
        }
    }
}

/// Parse an environment variable as a boolean, returning `default` if unset.
///
/// Recognises `1`, `true`, `yes`, `y`, `on` (case-insensitive) as `true`.
fn env_var_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_required_needs_secret_and_non_dev() {
        let mut config = Config::new(PathBuf::from("/tmp"), StoreKind::Memory);
        assert!(!config.auth_required());

        config.auth.jwt_secret = Some("s".to_string());
        assert!(!config.auth_required()); // still dev mode

        config.dev_mode = false;
        assert!(config.auth_required());

        config.auth.jwt_secret = None;
        assert!(!config.auth_required()); // unconfigured stays open
    }
}
