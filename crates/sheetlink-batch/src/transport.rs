use std::sync::Arc;

use sheetlink_core::{BatchUpdateResponse, Request};
use thiserror::Error;

use crate::retry::{FailureKind, RATE_LIMIT_STATUS};

/// Why a single round-trip to the remote service failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The remote answered with a well-formed error status
    #[error("remote service returned {status}: {message}")]
    Status { status: u16, message: String },
    /// No usable response: connection refused, timeout, TLS failure...
    #[error("{0}")]
    Network(String),
    /// A response arrived but could not be decoded
    #[error("unreadable response: {0}")]
    Decode(String),
}

impl TransportFailure {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        TransportFailure::Status {
            status,
            message: message.into(),
        }
    }

    /// Only the rate-limit status is ever worth retrying
    pub fn kind(&self) -> FailureKind {
        match self {
            TransportFailure::Status { status, .. } if *status == RATE_LIMIT_STATUS => {
                FailureKind::RateLimited
            }
            TransportFailure::Status { .. } => FailureKind::Remote,
            TransportFailure::Network(_) | TransportFailure::Decode(_) => FailureKind::Transport,
        }
    }
}

/// The remote spreadsheet service, reduced to its one transactional call
pub trait Transport {
    /// Apply `requests`, in order, as a single transaction on `spreadsheet_id`
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse, TransportFailure>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse, TransportFailure> {
        (**self).batch_update(spreadsheet_id, requests)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: &[Request],
    ) -> Result<BatchUpdateResponse, TransportFailure> {
        (**self).batch_update(spreadsheet_id, requests)
    }
}
