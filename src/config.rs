//! Adapter configuration.
//!
//! Every field is optional and falls back to the retry defaults. Values can be
//! deserialized (camelCase keys) or read from the environment:
//!
//! | key                      | env                      | default |
//! |--------------------------|--------------------------|---------|
//! | `retryAttempts`          | `BUS_RETRY_ATTEMPTS`     | 2       |
//! | `retryDelayInMs`         | `BUS_RETRY_DELAY_MS`     | 500     |
//! | `retryBackoffRate`       | `BUS_RETRY_BACKOFF_RATE` | 1.5     |

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::retry::{
    RetryPolicy, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_RATE, DEFAULT_RETRY_DELAY,
};

pub const ENV_RETRY_ATTEMPTS: &str = "BUS_RETRY_ATTEMPTS";
pub const ENV_RETRY_DELAY_MS: &str = "BUS_RETRY_DELAY_MS";
pub const ENV_RETRY_BACKOFF_RATE: &str = "BUS_RETRY_BACKOFF_RATE";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusConfig {
    /// Retries after the first try.
    pub retry_attempts: u32,
    /// Delay before the first retry.
    pub retry_delay_in_ms: u64,
    /// Factor applied to the delay for each further retry.
    pub retry_backoff_rate: f64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_in_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            retry_backoff_rate: DEFAULT_RETRY_BACKOFF_RATE,
        }
    }
}

impl BusConfig {
    /// Read overrides from `BUS_RETRY_*` environment variables.
    ///
    /// Unset variables keep their default; unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            retry_attempts: parse_var(&lookup, ENV_RETRY_ATTEMPTS)?
                .unwrap_or(defaults.retry_attempts),
            retry_delay_in_ms: parse_var(&lookup, ENV_RETRY_DELAY_MS)?
                .unwrap_or(defaults.retry_delay_in_ms),
            retry_backoff_rate: parse_var(&lookup, ENV_RETRY_BACKOFF_RATE)?
                .unwrap_or(defaults.retry_backoff_rate),
        })
    }

    /// Validate and convert into a [`RetryPolicy`].
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_in_ms),
            self.retry_backoff_rate,
        )
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value: raw }),
    }
}
