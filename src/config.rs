//! Demo configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::pool::PoolConfig;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: s.to_owned(),
            }),
        }
    }
}

/// Settings for the demo tick loop.
///
/// Loaded once at startup via [`DemoConfig::from_env`].
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Pool sizing.
    pub pool: PoolConfig,

    /// Number of ticks to run.
    pub ticks: u32,

    /// Length of one tick.
    pub tick: Duration,

    /// Spawn one pooled instance every this many ticks.
    pub spawn_every: u32,

    /// How long a spawned instance stays active.
    pub active_for: Duration,

    /// Log output format.
    pub log_format: LogFormat,
}

impl DemoConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is missing or unparseable.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `LOG_FORMAT` is set to
    /// something other than `pretty`, `text` or `json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let pool = PoolConfig {
            initial_size: Some(parse_env("POOL_INITIAL_SIZE", 4)),
            max_size: parse_env("POOL_MAX_SIZE", 8),
            can_resize: parse_env_bool("POOL_CAN_RESIZE", false),
        };

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse::<LogFormat>()?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            pool,
            ticks: parse_env("DEMO_TICKS", 120),
            tick: Duration::from_millis(parse_env("DEMO_TICK_MS", 16).max(1)),
            spawn_every: parse_env("DEMO_SPAWN_EVERY", 3).max(1),
            active_for: Duration::from_millis(parse_env("DEMO_ACTIVE_MS", 200)),
            log_format,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
