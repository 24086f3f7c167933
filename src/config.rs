//! Service configuration from the environment (and `.env` via dotenvy).

use std::str::FromStr;
use std::time::Duration;

use actix_web::cookie::Key;

use crate::auth::rate_limit::LoginLimits;

/// One year. Keeps `now + ttl` far inside chrono's range.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub session_key: Option<String>,
    pub session_ttl: chrono::Duration,
    pub cookie_secure: bool,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub login_limits: LoginLimits,
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
            expected,
        }),
    }
}

fn positive<T: Default + PartialEq + ToString>(value: T, key: &'static str) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            expected: "a positive integer",
        });
    }
    Ok(value)
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: v,
                expected: "a boolean",
            }),
        },
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = move |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ttl_hours: i64 = parse(&lookup, "SESSION_TTL_HOURS", 12, "a whole number of hours")?;
        let session_ttl = (1..=MAX_SESSION_TTL_HOURS)
            .contains(&ttl_hours)
            .then(|| chrono::TimeDelta::try_hours(ttl_hours))
            .flatten()
            .ok_or_else(|| ConfigError::Invalid {
                key: "SESSION_TTL_HOURS",
                value: ttl_hours.to_string(),
                expected: "between 1 and 8760 hours",
            })?;
        let max_attempts: usize = positive(
            parse(&lookup, "LOGIN_MAX_ATTEMPTS", 5, "a positive integer")?,
            "LOGIN_MAX_ATTEMPTS",
        )?;
        let database_max_connections: u32 = positive(
            parse(&lookup, "DATABASE_MAX_CONNECTIONS", 8, "a positive integer")?,
            "DATABASE_MAX_CONNECTIONS",
        )?;
        let window_secs: u64 = parse(&lookup, "LOGIN_WINDOW_SECS", 900, "a number of seconds")?;

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            database_url: lookup("DATABASE_URL"),
            database_max_connections,
            session_key: lookup("SESSION_KEY"),
            session_ttl,
            cookie_secure: parse_bool(&lookup, "COOKIE_SECURE", false)?,
            admin_username: lookup("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: lookup("ADMIN_PASSWORD"),
            login_limits: LoginLimits {
                max_attempts,
                window: Duration::from_secs(window_secs),
            },
        })
    }

    /// Cookie encryption key. Sessions survive restarts only with a
    /// `SESSION_KEY` of 64 bytes or more.
    pub fn cookie_key(&self) -> Key {
        match &self.session_key {
            Some(val) if val.len() >= 64 => {
                log::info!("Using SESSION_KEY from environment");
                Key::from(val.as_bytes())
            }
            Some(val) => {
                log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
                Key::generate()
            }
            None => {
                log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
                Key::generate()
            }
        }
    }
}
