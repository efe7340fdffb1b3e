use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Runtime configuration, sourced from the environment.
///
/// `dotenvy` is loaded by `main` before this runs, so a local `.env` file
/// behaves the same as real environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// When absent the server runs with the in-memory record store.
    pub database_url: Option<String>,
    /// External product-analysis endpoint; analyze requests degrade
    /// gracefully when unset.
    pub analyze_service_url: Option<String>,
    pub duplicate_window_secs: u64,
    pub persist_timeout: Duration,
    pub analyze_timeout: Duration,
    /// Comma-separated origin list; empty means allow any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or("SERVER_HOST", "0.0.0.0"),
            port: parse_var("SERVER_PORT", 3001)?,
            database_url: non_empty_var("DATABASE_URL"),
            analyze_service_url: non_empty_var("ANALYZE_SERVICE_URL"),
            duplicate_window_secs: parse_var("DUPLICATE_WINDOW_SECS", 300)?,
            persist_timeout: Duration::from_secs(parse_var("PERSIST_TIMEOUT_SECS", 5)?),
            analyze_timeout: Duration::from_secs(parse_var("ANALYZE_TIMEOUT_SECS", 10)?),
            cors_allowed_origins: non_empty_var("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(var: &'static str, default: &str) -> String {
    non_empty_var(var).unwrap_or_else(|| default.to_string())
}

fn non_empty_var(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(var) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
