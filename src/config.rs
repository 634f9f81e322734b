use std::collections::HashMap;
use thiserror::Error;

/// Seconds in one day; the tick interval must divide this evenly so the
/// per-tick increment split stays exact.
const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Accrual tick cadence. Reference deployment uses 3 seconds
    /// (28800 ticks per day).
    pub tick_interval_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let tick_interval_secs = env_map
            .get("TICK_INTERVAL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("3")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "TICK_INTERVAL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        if tick_interval_secs == 0 || SECONDS_PER_DAY % tick_interval_secs != 0 {
            return Err(ConfigError::InvalidValue(
                "TICK_INTERVAL_SECS".to_string(),
                format!("must be a divisor of {}, got {}", SECONDS_PER_DAY, tick_interval_secs),
            ));
        }

        Ok(Config {
            port,
            database_path,
            tick_interval_secs,
        })
    }
}
