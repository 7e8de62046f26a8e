// src/config.rs

use std::env;

use dotenvy::dotenv;
use thiserror::Error;

/// Average score a `beginner` needs to be promoted to `average`.
pub const BEGINNER_PROMOTION_THRESHOLD: f64 = 75.0;

/// Average score an `average` student needs to be promoted to `advanced`.
pub const AVERAGE_PROMOTION_THRESHOLD: f64 = 90.0;

/// Average quiz score a student needs for a module to count as completed.
pub const MODULE_COMPLETION_THRESHOLD: f64 = 60.0;

/// Instructor-facing target for a module's average grade.
/// Not related to module completion; keep the two apart.
pub const GRADE_REPORT_TARGET: f64 = 80.0;

/// Time limit given to a quiz when the author does not pick one.
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub log_dir: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let log_dir = lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string());

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: raw,
            })?,
            None => 5,
        };

        Ok(Self {
            database_url,
            rust_log,
            log_dir,
            max_connections,
        })
    }
}
