use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BatchError;
use crate::transport::TransportFailure;

/// Retries allowed before a rate-limited call gives up
pub const MAX_RATE_LIMIT_RETRIES: u32 = 10;
/// Status the remote uses to signal "too many requests"
pub const RATE_LIMIT_STATUS: u16 = 429;
/// Upper bound on a single backoff sleep
pub const MAX_RETRY_SLEEP_MS: u64 = 32_000;

/// How a failed round-trip is classified for retry purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The remote asked us to slow down
    RateLimited,
    /// Any other well-formed error response
    Remote,
    /// No structured response at all
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    RetryCeilingExceeded,
    NotRetryable(FailureKind),
}

/// Decision taken after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Retry(Duration),
    Abort(AbortReason),
}

/// Blocks the calling thread between attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<F> Sleeper for F
where
    F: Fn(Duration) + Send + Sync,
{
    fn sleep(&self, duration: Duration) {
        self(duration)
    }
}

fn default_max_retries() -> u32 {
    MAX_RATE_LIMIT_RETRIES
}

fn default_max_sleep_ms() -> u64 {
    MAX_RETRY_SLEEP_MS
}

/// Narrow retry policy: only rate-limit responses are retried, with
/// exponential backoff plus up to one second of jitter, capped per sleep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retry ceiling; the attempt after this one aborts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Longest single sleep (milliseconds)
    #[serde(default = "default_max_sleep_ms")]
    pub max_sleep_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            max_sleep_ms: default_max_sleep_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, max_sleep: Duration) -> Self {
        Self {
            max_retries,
            max_sleep_ms: u64::try_from(max_sleep.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn max_sleep(&self) -> Duration {
        Duration::from_millis(self.max_sleep_ms)
    }

    /// Decide what to do after failure number `attempt` (starting at 1)
    pub fn next_delay(&self, attempt: u32, failure: FailureKind) -> Backoff {
        self.next_delay_with_jitter(attempt, failure, rand::random::<f64>())
    }

    /// Same as [`RetryPolicy::next_delay`] with the jitter supplied by the caller.
    /// `jitter` is clamped into `[0, 1)`.
    pub fn next_delay_with_jitter(
        &self,
        attempt: u32,
        failure: FailureKind,
        jitter: f64,
    ) -> Backoff {
        if attempt > self.max_retries {
            return Backoff::Abort(AbortReason::RetryCeilingExceeded);
        }
        match failure {
            FailureKind::RateLimited => {
                let jitter = if jitter.is_finite() {
                    jitter.clamp(0.0, 0.999_999)
                } else {
                    0.0
                };
                let exponent = attempt.min(62) as i32;
                let millis =
                    ((2f64.powi(exponent) + jitter) * 1000.0).min(self.max_sleep_ms as f64);
                Backoff::Retry(Duration::from_millis(millis as u64))
            }
            other => Backoff::Abort(AbortReason::NotRetryable(other)),
        }
    }

    /// Run `call` until it succeeds or the policy aborts, sleeping through
    /// `sleeper` between rate-limited attempts.
    pub fn run<R, F>(&self, sleeper: &dyn Sleeper, mut call: F) -> Result<R, BatchError>
    where
        F: FnMut() -> Result<R, TransportFailure>,
    {
        let mut attempts: u32 = 0;
        loop {
            let failure = match call() {
                Ok(result) => return Ok(result),
                Err(failure) => failure,
            };
            attempts = attempts.saturating_add(1);

            match self.next_delay(attempts, failure.kind()) {
                Backoff::Retry(delay) => {
                    warn!(
                        "Retrying request after a rate limit error [{} of {}], sleeping {:?}",
                        attempts, self.max_retries, delay
                    );
                    sleeper.sleep(delay);
                }
                Backoff::Abort(AbortReason::RetryCeilingExceeded) => {
                    return Err(BatchError::RateLimitExceeded {
                        attempts,
                        last: failure,
                    });
                }
                Backoff::Abort(AbortReason::NotRetryable(_)) => {
                    return Err(BatchError::from_failure(failure));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Mutex;

    fn retry_millis(backoff: Backoff) -> u64 {
        match backoff {
            Backoff::Retry(d) => d.as_millis() as u64,
            Backoff::Abort(reason) => panic!("expected retry, got abort {:?}", reason),
        }
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 10);
        assert_eq!(policy.max_sleep(), Duration::from_secs(32));
    }

    #[test]
    fn test_exponential_delay() {
        let policy = RetryPolicy::default();
        let delay = |attempt, jitter| {
            retry_millis(policy.next_delay_with_jitter(attempt, FailureKind::RateLimited, jitter))
        };
        assert_eq!(delay(1, 0.0), 2_000);
        assert_eq!(delay(2, 0.5), 4_500);
        assert_eq!(delay(4, 0.25), 16_250);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default();
        for attempt in 5..=10 {
            assert_eq!(
                retry_millis(policy.next_delay_with_jitter(attempt, FailureKind::RateLimited, 0.9)),
                32_000
            );
        }
    }

    #[test]
    fn test_ceiling_aborts_regardless_of_kind() {
        let policy = RetryPolicy::default();
        for kind in [FailureKind::RateLimited, FailureKind::Remote, FailureKind::Transport] {
            assert_eq!(
                policy.next_delay(11, kind),
                Backoff::Abort(AbortReason::RetryCeilingExceeded)
            );
        }
        assert!(matches!(policy.next_delay(10, FailureKind::RateLimited), Backoff::Retry(_)));
    }

    #[test]
    fn test_non_rate_limit_failures_abort_immediately() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.next_delay(1, FailureKind::Remote),
            Backoff::Abort(AbortReason::NotRetryable(FailureKind::Remote))
        );
        assert_eq!(
            policy.next_delay(1, FailureKind::Transport),
            Backoff::Abort(AbortReason::NotRetryable(FailureKind::Transport))
        );
    }

    #[test]
    fn test_delays_grow_within_the_ceiling() {
        let policy = RetryPolicy::new(10, Duration::from_secs(3600));
        let delay = |attempt, jitter| {
            retry_millis(policy.next_delay_with_jitter(attempt, FailureKind::RateLimited, jitter))
        };
        let mut previous = 0;
        for attempt in 1..=10 {
            // worst case for growth: previous attempt at max jitter, this one at none
            let low = delay(attempt, 0.0);
            assert!(low >= previous, "attempt {} shrank", attempt);
            previous = delay(attempt, 0.999);
        }
    }

    #[test]
    fn test_random_jitter_stays_within_one_second() {
        let policy = RetryPolicy::new(10, Duration::from_secs(3600));
        for _ in 0..100 {
            let millis = retry_millis(policy.next_delay(3, FailureKind::RateLimited));
            assert!((8_000..9_000).contains(&millis));
        }
    }

    #[test]
    fn test_run_retries_rate_limits_then_succeeds() {
        let policy = RetryPolicy::default();
        let sleeps = Mutex::new(Vec::new());
        let sleeper = |d: Duration| sleeps.lock().unwrap().push(d);
        let calls = Cell::new(0);

        let result = policy.run(&sleeper, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(TransportFailure::status(429, "quota"))
            } else {
                Ok("done")
            }
        });

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 3);
        assert_eq!(sleeps.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_run_gives_up_at_the_ceiling() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let calls = Cell::new(0);

        let result: Result<(), _> = policy.run(&|_: Duration| {}, || {
            calls.set(calls.get() + 1);
            Err(TransportFailure::status(429, "quota"))
        });

        assert_eq!(calls.get(), 4);
        assert_eq!(
            result,
            Err(BatchError::RateLimitExceeded {
                attempts: 4,
                last: TransportFailure::status(429, "quota"),
            })
        );
    }

    #[test]
    fn test_run_surfaces_remote_and_transport_errors() {
        let policy = RetryPolicy::default();
        let no_sleep = |_: Duration| panic!("must not sleep");

        let remote: Result<(), _> =
            policy.run(&no_sleep, || Err(TransportFailure::status(400, "bad range")));
        assert_eq!(
            remote,
            Err(BatchError::Remote {
                status: 400,
                message: "bad range".to_string()
            })
        );

        let network: Result<(), _> =
            policy.run(&no_sleep, || Err(TransportFailure::Network("connection refused".into())));
        assert_eq!(network, Err(BatchError::Transport("connection refused".to_string())));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"max_retries": 3}"#).unwrap();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.max_sleep_ms, MAX_RETRY_SLEEP_MS);
    }

    proptest::proptest! {
        #[test]
        fn prop_delay_is_bounded(
            attempt in 1u32..=10,
            jitter in 0.0f64..1.0,
            cap_ms in 1u64..100_000
        ) {
            let policy = RetryPolicy { max_retries: 10, max_sleep_ms: cap_ms };
            let backoff = policy.next_delay_with_jitter(attempt, FailureKind::RateLimited, jitter);
            let millis = retry_millis(backoff);
            let base = 2u64.pow(attempt) * 1000;
            proptest::prop_assert!(millis <= cap_ms);
            proptest::prop_assert!(millis >= base.min(cap_ms));
            proptest::prop_assert!(millis < base + 1000);
        }
    }
}
