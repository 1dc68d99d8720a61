use crate::retry::{RetryDisposition, classify_db_error};
use connectors::{file::csv::error::FileError, sql::base::error::DbError};
use model::records::batch::BatchError;
use std::time::Duration;
use thiserror::Error;

/// Why a transfer run ended without committing.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[source] FileError),

    #[error("Source read failed after {records_read} records: {source}")]
    SourceRead { records_read: u64, source: FileError },

    #[error("Failed to clear table `{table}`: {source}")]
    ClearFailed { table: String, source: DbError },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] DbError),

    #[error("Batch {seq} rejected by the store: {source}")]
    BatchRejected { seq: usize, source: DbError },

    #[error("Invalid batch: {0}")]
    InvalidBatch(#[from] BatchError),

    #[error("Batch {seq} timed out after {timeout:?}")]
    Timeout { seq: usize, timeout: Duration },

    #[error("Transfer cancelled")]
    Cancelled,
}

impl TransferError {
    /// Whether re-running the whole transfer may succeed.
    pub fn disposition(&self) -> RetryDisposition {
        match self {
            TransferError::ClearFailed { source, .. }
            | TransferError::StoreUnavailable(source)
            | TransferError::BatchRejected { source, .. } => classify_db_error(source),
            TransferError::Timeout { .. } => RetryDisposition::Retry,
            TransferError::SourceUnavailable(_)
            | TransferError::SourceRead { .. }
            | TransferError::InvalidBatch(_)
            | TransferError::Cancelled => RetryDisposition::Stop,
        }
    }
}
