use std::env;
use std::sync::Mutex;

use tinylink::config::{AppConfig, ConfigError, DEFAULT_PORT, DEFAULT_SESSION_MAX_AGE_SECS};

// Mutex to ensure tests that modify env vars don't run in parallel
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for name in ["PORT", "DATABASE_URL", "SECRET_KEY", "SESSION_MAX_AGE_SECS"] {
        env::remove_var(name);
    }
}

#[test]
fn test_config_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();

    let config = AppConfig::from_env();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.database_url, "data.db");
    assert!(config.secret_key.is_none());
    assert_eq!(config.session_max_age_secs, DEFAULT_SESSION_MAX_AGE_SECS);
    assert!(config.cookie_key().is_ok());
}

#[test]
fn test_config_from_env() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("PORT", "3000");
    env::set_var("DATABASE_URL", "/tmp/links.db");
    env::set_var("SESSION_MAX_AGE_SECS", "600");
    env::set_var("SECRET_KEY", "k".repeat(64));

    let config = AppConfig::from_env();
    assert_eq!(config.port, 3000);
    assert_eq!(config.database_url, "/tmp/links.db");
    assert_eq!(config.session_max_age(), time::Duration::seconds(600));
    assert!(config.cookie_key().is_ok());

    clear_env();
}

#[test]
fn test_config_invalid_values_fall_back() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("PORT", "not-a-port");
    env::set_var("SESSION_MAX_AGE_SECS", "-5");

    let config = AppConfig::from_env();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.session_max_age_secs, DEFAULT_SESSION_MAX_AGE_SECS);

    clear_env();
}

#[test]
fn test_short_secret_key_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("SECRET_KEY", "too-short");

    let config = AppConfig::from_env();
    assert!(matches!(
        config.cookie_key(),
        Err(ConfigError::SecretKeyTooShort(9))
    ));

    clear_env();
}
