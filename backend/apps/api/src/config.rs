//! Server configuration read from the environment
//!
//! `.env` is loaded by `main` before any of this runs.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;

/// Upper bounds keep `exp` far from the end of the `i64` range
const MAX_ACCESS_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const MAX_REFRESH_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

pub struct ServerConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            database_url,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            port: parse_or("PORT", 5000)?,
            frontend_origins,
            auth: auth_config()?,
        })
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    // Debug builds fall back to random keys and a non-Secure cookie
    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::with_random_secrets()
    };

    if let Some(secret) = secret("ACCESS_TOKEN_SECRET")? {
        config.access_token_secret = secret;
    }
    if let Some(secret) = secret("REFRESH_TOKEN_SECRET")? {
        config.refresh_token_secret = secret;
    }
    config.access_token_ttl = ttl("ACCESS_TOKEN_TTL_SECS", 900, MAX_ACCESS_TOKEN_TTL_SECS)?;
    config.refresh_token_ttl = ttl("REFRESH_TOKEN_TTL_SECS", 86_400, MAX_REFRESH_TOKEN_TTL_SECS)?;
    config.password_pepper = env::var("PASSWORD_PEPPER")
        .ok()
        .filter(|pepper| !pepper.is_empty())
        .map(String::into_bytes);

    Ok(config)
}

/// Required in release builds; optional in debug builds
fn secret(key: &str) -> anyhow::Result<Option<Vec<u8>>> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(Some(value.into_bytes())),
        _ if cfg!(debug_assertions) => {
            tracing::warn!(key, "Secret not set, using a random key for this run");
            Ok(None)
        }
        _ => bail!("{key} must be set in production"),
    }
}

fn ttl(key: &str, default: u64, max: u64) -> anyhow::Result<Duration> {
    bounded_ttl(key, parse_or(key, default)?, max)
}

fn bounded_ttl(key: &str, secs: u64, max: u64) -> anyhow::Result<Duration> {
    if secs == 0 || secs > max {
        bail!("{key} must be between 1 and {max} seconds, got {secs}");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
