//! Environment-driven configuration.

use std::path::PathBuf;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

/// Gateway configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port (`PORT`, default 5000).
    pub port: u16,
    /// Embedded store directory (`DATABASE_PATH`, default `./switchboard.db`).
    pub database_path: PathBuf,
    /// Default sandbox root (`SANDBOX_PATH`, default `./sandbox`), created
    /// at startup when missing.
    pub sandbox_path: PathBuf,
    /// Session secret (`SESSION_SECRET`); sessions are server-side, so
    /// this is only warned about when absent.
    pub session_secret: Option<String>,
    /// Seed admin username (`ADMIN_USERNAME`, default `admin`).
    pub admin_username: String,
    /// Seed admin password (`ADMIN_PASSWORD`); generated when unset.
    pub admin_password: Option<String>,
    /// Log output format (`LOG_FORMAT`: `pretty` | `json`).
    pub log_format: LogFormat,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when `PORT` is set but not a valid port number.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a number in 1..=65535, got {raw}"))?,
            Err(_) => 5000,
        };

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            port,
            database_path: std::env::var("DATABASE_PATH")
                .map_or_else(|_| PathBuf::from("./switchboard.db"), PathBuf::from),
            sandbox_path: std::env::var("SANDBOX_PATH")
                .map_or_else(|_| PathBuf::from("./sandbox"), PathBuf::from),
            session_secret: std::env::var("SESSION_SECRET").ok(),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
            log_format,
        })
    }
}
