use std::env;
use std::time::Duration;

use anyhow::Context;
use sheetlink_batch::{RetryPolicy, MAX_RATE_LIMIT_RETRIES, MAX_RETRY_SLEEP_MS};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the remote service, without a trailing slash
    pub base_url: String,
    /// Bearer token sent with every call, if any
    pub access_token: Option<String>,
    /// Retry ceiling for rate-limited transactions
    pub max_retries: u32,
    /// Longest single backoff sleep in milliseconds
    pub max_retry_sleep_ms: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            max_retries: MAX_RATE_LIMIT_RETRIES,
            max_retry_sleep_ms: MAX_RETRY_SLEEP_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so tests do not have to touch the process environment
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("SHEETLINK_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let access_token = lookup("SHEETLINK_ACCESS_TOKEN").filter(|token| !token.is_empty());
        let max_retries = match lookup("SHEETLINK_MAX_RETRIES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SHEETLINK_MAX_RETRIES is not a number: {}", raw))?,
            None => defaults.max_retries,
        };
        let max_retry_sleep_ms = match lookup("SHEETLINK_MAX_RETRY_SLEEP_MS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SHEETLINK_MAX_RETRY_SLEEP_MS is not a number: {}", raw))?,
            None => defaults.max_retry_sleep_ms,
        };
        let timeout_secs = match lookup("SHEETLINK_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SHEETLINK_TIMEOUT_SECS is not a number: {}", raw))?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            base_url,
            access_token,
            max_retries,
            max_retry_sleep_ms,
            timeout_secs,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.max_retry_sleep_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
