//! Drives one transfer: source stream, mapping, batching, loading, and the
//! final commit or rollback.

use crate::{
    accumulator::{BatchAccumulator, DEFAULT_BATCH_SIZE},
    connectors::destination::{Destination, LoadSession},
    error::TransferError,
    loader::BulkLoader,
    mapper::RowMapper,
    retry::RetryPolicy,
};
use connectors::file::csv::error::FileError;
use model::{
    records::{batch::Batch, source::SourceRecord},
    transfer::TransferOutcome,
};
use std::{num::NonZeroUsize, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

pub const DEFAULT_TABLE: &str = "unite_legale";

#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub table: String,
    pub batch_size: NonZeroUsize,
    /// Truncate the target before loading.
    pub clear_first: bool,
    /// Upper bound for a single batch round-trip.
    pub batch_timeout: Option<Duration>,
}

impl Default for TransferSettings {
    fn default() -> Self {
        TransferSettings {
            table: DEFAULT_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            clear_first: false,
            batch_timeout: None,
        }
    }
}

pub struct TransferController {
    run_id: Uuid,
    destination: Arc<dyn Destination>,
    mapper: RowMapper,
    loader: BulkLoader,
    settings: TransferSettings,
    cancel: CancellationToken,
}

impl TransferController {
    pub fn new(destination: Arc<dyn Destination>, settings: TransferSettings) -> Self {
        TransferController {
            run_id: Uuid::new_v4(),
            destination,
            mapper: RowMapper::unite_legale(),
            loader: BulkLoader::new(&settings.table),
            settings,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_mapper(mut self, mapper: RowMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Runs one transfer.
    ///
    /// The source is opened before the store is touched. Either every batch
    /// is committed, or the run transaction is rolled back and the error
    /// returned. A clear requested through the settings is not undone by
    /// the rollback.
    pub async fn run<S, F>(&self, open: F) -> Result<TransferOutcome, TransferError>
    where
        F: FnOnce() -> Result<S, FileError>,
        S: Iterator<Item = Result<SourceRecord, FileError>>,
    {
        let span = info_span!("transfer", run_id = %self.run_id, table = %self.settings.table);
        self.run_inner(open).instrument(span).await
    }

    /// Runs the transfer, re-running it from the start when it fails with a
    /// transient error. Each attempt re-opens the source; rows committed by
    /// an earlier attempt are skipped as duplicates.
    pub async fn run_with_retry<S, F>(
        &self,
        mut open: F,
        policy: &RetryPolicy,
    ) -> Result<TransferOutcome, TransferError>
    where
        F: FnMut() -> Result<S, FileError>,
        S: Iterator<Item = Result<SourceRecord, FileError>>,
    {
        let this = self;
        policy
            .run(
                move || {
                    let opened = open();
                    this.run(move || opened)
                },
                TransferError::disposition,
            )
            .await
            .map_err(|e| e.into_inner())
    }

    async fn run_inner<S, F>(&self, open: F) -> Result<TransferOutcome, TransferError>
    where
        F: FnOnce() -> Result<S, FileError>,
        S: Iterator<Item = Result<SourceRecord, FileError>>,
    {
        let source = open().map_err(TransferError::SourceUnavailable)?;
        let table = &self.settings.table;

        if self.settings.clear_first {
            let clear = self.destination.truncate(table);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(TransferError::Cancelled),
                res = clear => res.map_err(|source| TransferError::ClearFailed {
                    table: table.clone(),
                    source,
                })?,
            }
            info!("Target table cleared");
        }

        // Nothing to roll back yet.
        if self.cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }
        let mut session = self
            .destination
            .begin()
            .await
            .map_err(TransferError::StoreUnavailable)?;

        info!(
            destination = %self.destination.name(),
            batch_size = self.settings.batch_size.get(),
            "Transfer started"
        );

        match self.stream(source, session.as_mut()).await {
            Ok(outcome) => {
                session
                    .commit()
                    .await
                    .map_err(TransferError::StoreUnavailable)?;
                info!(
                    records_read = outcome.records_read,
                    records_persisted = outcome.records_persisted,
                    records_skipped = outcome.records_skipped,
                    batches = outcome.batches_loaded,
                    "Transfer committed"
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = session.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                error!(error = %err, "Transfer rolled back");
                Err(err)
            }
        }
    }

    async fn stream<S>(
        &self,
        source: S,
        session: &mut dyn LoadSession,
    ) -> Result<TransferOutcome, TransferError>
    where
        S: Iterator<Item = Result<SourceRecord, FileError>>,
    {
        let mut outcome = TransferOutcome::default();
        let mut accumulator = BatchAccumulator::new(self.settings.batch_size);

        for item in source {
            if self.cancel.is_cancelled() {
                return Err(TransferError::Cancelled);
            }

            let record = item.map_err(|source| TransferError::SourceRead {
                records_read: outcome.records_read,
                source,
            })?;
            outcome.record_read();

            if let Some(batch) = accumulator.add(self.mapper.map(&record))? {
                self.load(session, &batch, &mut outcome).await?;
            }
        }

        if let Some(batch) = accumulator.flush()? {
            self.load(session, &batch, &mut outcome).await?;
        }

        Ok(outcome)
    }

    async fn load(
        &self,
        session: &mut dyn LoadSession,
        batch: &Batch,
        outcome: &mut TransferOutcome,
    ) -> Result<(), TransferError> {
        let seq = batch.seq;
        let guarded = async {
            match self.settings.batch_timeout {
                Some(limit) => tokio::time::timeout(limit, self.loader.load(session, batch))
                    .await
                    .map_err(|_| TransferError::Timeout {
                        seq,
                        timeout: limit,
                    })?
                    .map_err(|source| TransferError::BatchRejected { seq, source }),
                None => self
                    .loader
                    .load(session, batch)
                    .await
                    .map_err(|source| TransferError::BatchRejected { seq, source }),
            }
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TransferError::Cancelled),
            res = guarded => res,
        }?;

        outcome.absorb(result);
        info!(
            batch = seq,
            records_read = outcome.records_read,
            records_persisted = outcome.records_persisted,
            records_skipped = outcome.records_skipped,
            "Progress"
        );
        Ok(())
    }
}
