use thiserror::Error;

use crate::transport::TransportFailure;

/// Terminal outcome of a remote transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Every attempt was rate limited until the retry ceiling was reached
    #[error("rate limit retry attempts exceeded after {attempts} attempts")]
    RateLimitExceeded {
        attempts: u32,
        #[source]
        last: TransportFailure,
    },

    /// The remote rejected the transaction
    #[error("cannot run remote request [{status}]: {message}")]
    Remote { status: u16, message: String },

    /// No structured response could be obtained
    #[error("request failed through a network error - {0}")]
    Transport(String),
}

impl BatchError {
    /// Classify a failure that will not be retried
    pub fn from_failure(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::Status { status, message } => BatchError::Remote { status, message },
            other => BatchError::Transport(other.to_string()),
        }
    }

    /// Check if this error came from exhausting rate-limit retries
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BatchError::RateLimitExceeded { .. })
    }
}
