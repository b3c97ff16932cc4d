use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// File emulating browser local storage; holds the signed-in user.
    pub session_file: PathBuf,
    pub auth_delay: Duration,
    pub assistant_delay: Duration,
    pub marker_navigate_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            session_file: PathBuf::from(".milaan/local_storage.json"),
            auth_delay: Duration::from_millis(1000),
            assistant_delay: Duration::from_millis(1000),
            marker_navigate_delay: Duration::from_millis(1500),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            session_file: std::env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            auth_delay: millis_env("AUTH_DELAY_MS", defaults.auth_delay)?,
            assistant_delay: millis_env("ASSISTANT_DELAY_MS", defaults.assistant_delay)?,
            marker_navigate_delay: millis_env(
                "MARKER_NAVIGATE_DELAY_MS",
                defaults.marker_navigate_delay,
            )?,
        })
    }
}

fn millis_env(key: &str, default: Duration) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("{key} must be a whole number of milliseconds")),
        Err(_) => Ok(default),
    }
}
