//! Configuration surface for the core services
//!
//! Retry knobs, cache/state paths, and the scraping proxy key are read from
//! the environment; anything unset falls back to a default. API keys for the
//! excluded presentation features stay out of this struct.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::client::{ClientError, RetryPolicy};

/// Scraping proxy API key
const ENV_SCRAPER_API_KEY: &str = "SCRAPER_API_KEY";
/// Override for the state file path
const ENV_STATE_FILE: &str = "GIGSCOUT_STATE_FILE";
/// Override for the cache directory
const ENV_CACHE_DIR: &str = "GIGSCOUT_CACHE_DIR";
/// Retry policy overrides
const ENV_MAX_ATTEMPTS: &str = "GIGSCOUT_MAX_ATTEMPTS";
const ENV_BASE_DELAY_MS: &str = "GIGSCOUT_BASE_DELAY_MS";
const ENV_MAX_DELAY_MS: &str = "GIGSCOUT_MAX_DELAY_MS";
const ENV_RATE_LIMIT_DELAY_MS: &str = "GIGSCOUT_RATE_LIMIT_DELAY_MS";

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but unparseable
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },

    /// The resulting retry policy is inconsistent
    #[error(transparent)]
    Policy(#[from] ClientError),
}

/// Runtime configuration for the core
#[derive(Debug, Clone)]
pub struct Config {
    /// Retry/backoff settings for the HTTP client
    pub retry: RetryPolicy,
    /// Cache directory; `None` means the XDG default
    pub cache_dir: Option<PathBuf>,
    /// State file path; `None` means the XDG default
    pub state_file: Option<PathBuf>,
    /// Scraping proxy API key; `None` disables the page fetcher
    pub scraper_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            cache_dir: None,
            state_file: None,
            scraper_api_key: None,
        }
    }
}

impl Config {
    /// Builds a configuration from environment variables
    ///
    /// Unset variables fall back to defaults; a set-but-unparseable value is
    /// an error rather than a silent default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = RetryPolicy::default();

        let max_attempts = match env_value(ENV_MAX_ATTEMPTS) {
            Some(value) => parse_u32(ENV_MAX_ATTEMPTS, &value)?,
            None => defaults.max_attempts,
        };
        let base_delay = match env_value(ENV_BASE_DELAY_MS) {
            Some(value) => parse_duration_ms(ENV_BASE_DELAY_MS, &value)?,
            None => defaults.base_delay,
        };
        let max_delay = match env_value(ENV_MAX_DELAY_MS) {
            Some(value) => parse_duration_ms(ENV_MAX_DELAY_MS, &value)?,
            None => defaults.max_delay,
        };
        let rate_limit_delay = match env_value(ENV_RATE_LIMIT_DELAY_MS) {
            Some(value) => parse_duration_ms(ENV_RATE_LIMIT_DELAY_MS, &value)?,
            None => defaults.rate_limit_delay,
        };

        let retry = RetryPolicy::new(max_attempts, base_delay, max_delay, rate_limit_delay)?;

        Ok(Self {
            retry,
            cache_dir: env_value(ENV_CACHE_DIR).map(PathBuf::from),
            state_file: env_value(ENV_STATE_FILE).map(PathBuf::from),
            scraper_api_key: env_value(ENV_SCRAPER_API_KEY),
        })
    }
}

/// Reads an environment variable, treating empty as unset
fn env_value(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Parses a positive integer setting
fn parse_u32(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
            var,
            message: e.to_string(),
        })
}

/// Parses a millisecond duration setting
fn parse_duration_ms(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let ms: u64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
            var,
            message: e.to_string(),
        })?;
    Ok(Duration::from_millis(ms))
}
