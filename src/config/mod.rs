//! Configuration management for the vigia watcher
//!
//! This module handles loading and validating configuration from environment
//! variables and files. Environment variable names follow the deployment
//! surface the watcher is operated with (`CHECK_INTERVAL_MS`,
//! `TARGET_DATE_LIMIT`, `ENABLE_MADRID`, ...).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Watcher-level configuration
    pub app: AppConfig,

    /// Madrid target configuration
    pub madrid: MadridConfig,

    /// Alicante target configuration
    pub alicante: AlicanteConfig,

    /// Sede secondary-system target configuration
    pub sede: SedeConfig,

    /// Telegram notification configuration
    pub telegram: TelegramConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Watcher-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Liveness endpoint port
    pub port: u16,

    /// Sweep interval in milliseconds
    pub check_interval_ms: u64,

    /// End of the probe window, format DD/MM/YYYY, inclusive.
    /// Absent or unparseable values fall back to a 30-day window.
    pub target_date_limit: Option<String>,

    /// Lower bound of the randomized inter-probe pacing delay (ms)
    pub pacing_min_ms: u64,

    /// Upper bound of the randomized inter-probe pacing delay (ms)
    pub pacing_max_ms: u64,

    /// Consecutive probe failures before a target's window is abandoned
    /// for the current sweep
    pub error_threshold: u32,

    /// Replace live probes with canned results (no network I/O)
    pub simulate: bool,

    /// Send a startup heartbeat notification
    pub enable_heartbeat: bool,

    /// Self URL pinged every 5 minutes so free-tier hosts do not idle
    /// the process out
    pub keep_alive_url: Option<String>,
}

/// Madrid target configuration (JSON slot API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MadridConfig {
    pub enabled: bool,

    /// Slot lookup endpoint
    pub base_url: String,

    /// Public booking page linked from notifications
    pub booking_url: String,

    /// Service identifier sent with every lookup
    pub id_servicio: String,

    /// Group identifier sent with every lookup
    pub id_grupo: String,

    /// Appointment duration parameter sent with every lookup
    pub tiempo_cita: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Alicante target configuration (HTML slot page)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlicanteConfig {
    pub enabled: bool,

    /// Booking page URL (also the scrape target)
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Sede secondary-system configuration (form POST, heuristic response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SedeConfig {
    pub enabled: bool,

    /// Availability endpoint
    pub url: String,

    /// x-www-form-urlencoded request body
    pub body: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Telegram notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token; notifications are skipped when absent
    pub bot_token: Option<String>,

    /// Chat to deliver to; notifications are skipped when absent
    pub chat_id: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| v == "true")
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);

        let mut config = Self {
            app: AppConfig {
                port,
                check_interval_ms: env_u64("CHECK_INTERVAL_MS", 5 * 60 * 1000),
                target_date_limit: env_opt("TARGET_DATE_LIMIT"),
                pacing_min_ms: env_u64("PACING_MIN_MS", 1000),
                pacing_max_ms: env_u64("PACING_MAX_MS", 3000),
                error_threshold: 5,
                simulate: env_bool("SIMULATE", false),
                enable_heartbeat: env_bool("ENABLE_HEARTBEAT", false),
                keep_alive_url: env_opt("RENDER_EXTERNAL_URL"),
            },
            madrid: MadridConfig {
                enabled: env_bool("ENABLE_MADRID", true),
                ..MadridConfig::default()
            },
            alicante: AlicanteConfig {
                enabled: env_bool("ENABLE_ALICANTE", false),
                ..AlicanteConfig::default()
            },
            sede: SedeConfig {
                enabled: env_bool("ENABLE_SEDE", false),
                ..SedeConfig::default()
            },
            telegram: TelegramConfig {
                bot_token: env_opt("TELEGRAM_BOT_TOKEN"),
                chat_id: env_opt("TELEGRAM_CHAT_ID"),
                timeout_secs: 10,
            },
            logging: LoggingConfig {
                level: std::env::var("VIGIA_LOG_LEVEL").unwrap_or_else(|_| String::from("info")),
                format: std::env::var("VIGIA_LOG_FORMAT").unwrap_or_else(|_| String::from("text")),
            },
        };

        if let Some(url) = env_opt("SEDE_URL") {
            config.sede.url = url;
        }
        if let Some(body) = env_opt("SEDE_BODY") {
            config.sede.body = body;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.app.check_interval_ms == 0 {
            anyhow::bail!("check_interval_ms must be greater than 0");
        }

        if self.app.pacing_min_ms > self.app.pacing_max_ms {
            anyhow::bail!("pacing_min_ms must not exceed pacing_max_ms");
        }

        if self.app.error_threshold == 0 {
            anyhow::bail!("error_threshold must be greater than 0");
        }

        if self.sede.enabled && self.sede.url.is_empty() {
            anyhow::bail!("SEDE_URL is required when the sede target is enabled");
        }

        Ok(())
    }

    /// Get the sweep interval as Duration
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.app.check_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            madrid: MadridConfig::default(),
            alicante: AlicanteConfig::default(),
            sede: SedeConfig::default(),
            telegram: TelegramConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            check_interval_ms: 5 * 60 * 1000,
            target_date_limit: None,
            pacing_min_ms: 1000,
            pacing_max_ms: 3000,
            error_threshold: 5,
            simulate: false,
            enable_heartbeat: false,
            keep_alive_url: None,
        }
    }
}

impl Default for MadridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: String::from(
                "https://gestiona.comunidad.madrid/ctac_cita/cita/muestraHoras",
            ),
            booking_url: String::from("https://gestiona.comunidad.madrid/ctac_cita/registro"),
            id_servicio: String::from("3734"),
            id_grupo: String::from("1362"),
            tiempo_cita: String::from("20"),
            timeout_secs: 10,
        }
    }
}

impl Default for AlicanteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::from("https://santjoandalacant.sedelectronica.es/citaprevia.0"),
            timeout_secs: 15,
        }
    }
}

impl Default for SedeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            body: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}
