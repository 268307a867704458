use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:data/matchday.db";
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Runtime settings, read from the environment (after `.env` is loaded).
/// CLI flags override individual fields.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind: String,
    pub port: u16,
    /// Base URL the watcher uses to reach a running server.
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = match env::var("MATCHDAY_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid MATCHDAY_PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            bind: env::var("MATCHDAY_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            port,
            api_url: env::var("MATCHDAY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        }
    }
}
