pub mod error;
pub mod executor;
pub mod retry;
pub mod transport;

pub use error::BatchError;
pub use executor::{BatchExecutor, BatchState};
pub use retry::{
    AbortReason, Backoff, FailureKind, RetryPolicy, Sleeper, ThreadSleeper,
    MAX_RATE_LIMIT_RETRIES, MAX_RETRY_SLEEP_MS, RATE_LIMIT_STATUS,
};
pub use transport::{Transport, TransportFailure};
