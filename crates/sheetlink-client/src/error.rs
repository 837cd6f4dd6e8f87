use sheetlink_batch::BatchError;
use sheetlink_core::RangeError;
use thiserror::Error;

/// Errors raised by [`crate::Sheet`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("Invalid range: {0}")]
    Range(#[from] RangeError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;
