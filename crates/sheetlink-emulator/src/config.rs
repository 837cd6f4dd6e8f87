use std::env;
use std::time::Duration;

/// Emulator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Transactions accepted per spreadsheet in each window
    pub rate_limit_quota: u32,
    /// Length of the rate limit window in seconds
    pub rate_limit_window_secs: u64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            rate_limit_quota: 60,
            rate_limit_window_secs: 60,
        }
    }
}

impl EmulatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;
        let rate_limit_quota = env::var("RATE_LIMIT_QUOTA")
            .unwrap_or_else(|_| "60".to_string())
            .parse()?;
        let rate_limit_window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()?;

        Ok(Self {
            host,
            port,
            rate_limit_quota,
            rate_limit_window_secs,
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
