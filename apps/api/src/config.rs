use anyhow::{bail, Context, Result};

use crate::thoughts::scoring::DEFAULT_POWERFUL_COUNT;

/// Application configuration loaded from environment variables.
/// Fails at startup if `DATABASE_URL` is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Absent disables classification and post drafting.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Default size of the "what matters now" ranking.
    pub powerful_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            powerful_limit: parse_powerful_limit(std::env::var("POWERFUL_LIMIT").ok().as_deref())?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_powerful_limit(raw: Option<&str>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_POWERFUL_COUNT);
    };
    let limit = raw
        .trim()
        .parse::<usize>()
        .context("POWERFUL_LIMIT must be a positive integer")?;
    if limit == 0 {
        bail!("POWERFUL_LIMIT must be at least 1");
    }
    Ok(limit)
}
