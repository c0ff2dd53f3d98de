//! Configuration loading tests
//!
//! Environment-driven tests are serialized because they mutate process-wide
//! env vars.

use serial_test::serial;
use std::io::Write;

use vigia::config::Config;

const ENV_KEYS: &[&str] = &[
    "PORT",
    "CHECK_INTERVAL_MS",
    "TARGET_DATE_LIMIT",
    "PACING_MIN_MS",
    "PACING_MAX_MS",
    "ENABLE_MADRID",
    "ENABLE_ALICANTE",
    "ENABLE_SEDE",
    "SIMULATE",
    "ENABLE_HEARTBEAT",
    "RENDER_EXTERNAL_URL",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "SEDE_URL",
    "SEDE_BODY",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.app.port, 3000);
    assert_eq!(config.app.check_interval_ms, 300_000);
    assert!(config.app.target_date_limit.is_none());
    assert!(!config.app.simulate);
    assert!(config.madrid.enabled);
    assert!(!config.alicante.enabled);
    assert!(!config.sede.enabled);
    assert!(config.telegram.bot_token.is_none());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("PORT", "8080");
    std::env::set_var("CHECK_INTERVAL_MS", "60000");
    std::env::set_var("TARGET_DATE_LIMIT", "15/02/2026");
    std::env::set_var("ENABLE_MADRID", "false");
    std::env::set_var("ENABLE_ALICANTE", "true");
    std::env::set_var("SIMULATE", "true");
    std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
    std::env::set_var("TELEGRAM_CHAT_ID", "42");

    let config = Config::from_env().unwrap();

    assert_eq!(config.app.port, 8080);
    assert_eq!(config.app.check_interval_ms, 60_000);
    assert_eq!(config.app.target_date_limit.as_deref(), Some("15/02/2026"));
    assert!(!config.madrid.enabled);
    assert!(config.alicante.enabled);
    assert!(config.app.simulate);
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
    assert_eq!(config.telegram.chat_id.as_deref(), Some("42"));

    clear_env();
}

#[test]
#[serial]
fn test_unparseable_env_values_fall_back() {
    clear_env();
    std::env::set_var("PORT", "not-a-port");
    std::env::set_var("CHECK_INTERVAL_MS", "soon");
    std::env::set_var("ENABLE_MADRID", "yes"); // only "true" enables

    let config = Config::from_env().unwrap();

    assert_eq!(config.app.port, 3000);
    assert_eq!(config.app.check_interval_ms, 300_000);
    assert!(!config.madrid.enabled);

    clear_env();
}

#[test]
#[serial]
fn test_sede_env_wiring() {
    clear_env();
    std::env::set_var("ENABLE_SEDE", "true");
    std::env::set_var("SEDE_URL", "https://sede.example.es/cita");
    std::env::set_var("SEDE_BODY", "tramite=42");

    let config = Config::from_env().unwrap();

    assert!(config.sede.enabled);
    assert_eq!(config.sede.url, "https://sede.example.es/cita");
    assert_eq!(config.sede.body, "tramite=42");
    assert!(config.validate().is_ok());

    clear_env();
}

#[test]
fn test_from_file_round_trip() {
    let config = Config::default();
    let serialized = toml::to_string(&config).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serialized.as_bytes()).unwrap();

    let loaded = Config::from_file(file.path()).unwrap();

    assert_eq!(loaded.app.port, config.app.port);
    assert_eq!(loaded.app.check_interval_ms, config.app.check_interval_ms);
    assert_eq!(loaded.madrid.base_url, config.madrid.base_url);
    assert_eq!(loaded.alicante.url, config.alicante.url);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_from_file_rejects_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"this is not toml [").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_file_missing_path() {
    let path = std::path::Path::new("/nonexistent/vigia.toml");
    assert!(Config::from_file(path).is_err());
}
