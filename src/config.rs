//! Runtime configuration read from environment variables
//!
//! # Environment Variables
//!
//! - `PORT` - Server port number (default: 8080)
//! - `DATABASE_URL` - Path to database file (default: "data.db")
//! - `SECRET_KEY` - Session cookie signing key, at least 64 bytes.
//!   A random key is generated when unset, so sessions do not survive a restart.
//! - `SESSION_MAX_AGE_SECS` - Session cookie lifetime (default: 86400)

use std::env;

use axum_extra::extract::cookie::Key;
use redb::Database;
use thiserror::Error;

use crate::database::{AppState, Store};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "data.db";
pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 24 * 60 * 60;
pub const MIN_SECRET_KEY_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SECRET_KEY must be at least 64 bytes, got {0}")]
    SecretKeyTooShort(usize),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub secret_key: Option<String>,
    pub session_max_age_secs: i64,
}

impl AppConfig {
    /// Reads the configuration, using defaults for missing or unparsable values
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let secret_key = env::var("SECRET_KEY").ok().filter(|key| !key.is_empty());

        let session_max_age_secs = env::var("SESSION_MAX_AGE_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .filter(|secs: &i64| *secs > 0)
            .unwrap_or(DEFAULT_SESSION_MAX_AGE_SECS);

        Self {
            port,
            database_url,
            secret_key,
            session_max_age_secs,
        }
    }

    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        match &self.secret_key {
            Some(secret) if secret.len() < MIN_SECRET_KEY_LEN => {
                Err(ConfigError::SecretKeyTooShort(secret.len()))
            }
            Some(secret) => Ok(Key::from(secret.as_bytes())),
            None => {
                tracing::warn!("SECRET_KEY is not set, using a random session key");
                Ok(Key::generate())
            }
        }
    }

    pub fn session_max_age(&self) -> time::Duration {
        time::Duration::seconds(self.session_max_age_secs)
    }

    /// Builds the shared handler state on top of an initialized database
    pub fn app_state(&self, db: Database) -> Result<AppState, ConfigError> {
        Ok(AppState {
            store: Store::new(db),
            cookie_key: self.cookie_key()?,
            session_max_age: self.session_max_age(),
        })
    }
}
