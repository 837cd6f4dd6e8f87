use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

/// Fixed-window transaction quota, counted per spreadsheet.
///
/// A quota of zero rejects every transaction.
#[derive(Debug)]
pub struct RateLimiter {
    quota: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Take one unit of quota for `spreadsheet_id`. Returns false when the
    /// current window is already spent.
    pub async fn try_acquire(&self, spreadsheet_id: &str) -> bool {
        self.try_acquire_at(spreadsheet_id, Instant::now()).await
    }

    async fn try_acquire_at(&self, spreadsheet_id: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry(spreadsheet_id.to_string())
            .or_insert(Window { started: now, used: 0 });

        if now.duration_since(window.started) >= self.window {
            *window = Window { started: now, used: 0 };
        }
        if window.used >= self.quota {
            return false;
        }
        window.used += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_quota_is_per_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.try_acquire_at("a", start).await);
        assert!(limiter.try_acquire_at("a", start).await);
        assert!(!limiter.try_acquire_at("a", start + Duration::from_secs(59)).await);
        assert!(limiter.try_acquire_at("a", start + Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_spreadsheets_have_separate_quotas() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.try_acquire("a").await);
        assert!(!limiter.try_acquire("a").await);
        assert!(limiter.try_acquire("b").await);
    }

    #[tokio::test]
    async fn test_zero_quota_rejects_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        assert!(!limiter.try_acquire("a").await);
    }
}
