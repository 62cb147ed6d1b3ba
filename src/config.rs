use std::env;

use crate::error::AppError;

/// Longest accepted session lifetime, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Runtime configuration, read from the process environment
/// (after `dotenv` has loaded any `.env` file).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Lifetime of a login session.
    pub session_ttl_hours: i64,
    /// Marks the session cookie `Secure`; enable behind HTTPS.
    pub cookie_secure: bool,
    /// Browser origin allowed to call the API with credentials.
    pub cors_origin: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://turify.db?mode=rwc".to_string()),
            server_port: parse_var("SERVER_PORT", 3000)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            session_ttl_hours: parse_ttl_hours()?,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:4321".to_string()),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            ttl_hours: self.session_ttl_hours,
            cookie_secure: self.cookie_secure,
        }
    }
}

/// The part of the configuration the auth handlers need, shared as app data.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            cookie_secure: false,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

fn parse_ttl_hours() -> Result<i64, AppError> {
    let hours = parse_var("SESSION_TTL_HOURS", 24)?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(AppError::Config(format!(
            "SESSION_TTL_HOURS must be between 1 and {}, got {}",
            MAX_SESSION_TTL_HOURS, hours
        )));
    }
    Ok(hours)
}
