use crate::settings::import::ImportSettings;
use chrono::{DateTime, Utc};
use engine_core::controller::TransferSettings;
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Running,
    Committed,
    RolledBack,
}

/// Machine-readable record of one import run.
#[derive(Serialize, Debug, Clone)]
pub struct TransferReport {
    pub run_id: Uuid,
    pub source: String,
    pub table: String,
    pub batch_size: usize,
    pub truncate: bool,
    pub status: TransferStatus,
    pub records_read: u64,
    pub records_persisted: u64,
    pub records_skipped: u64,
    pub batches_loaded: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl TransferReport {
    pub fn start(run_id: Uuid, source: &Path, settings: &TransferSettings) -> Self {
        TransferReport {
            run_id,
            source: source.display().to_string(),
            table: settings.table.clone(),
            batch_size: settings.batch_size.get(),
            truncate: settings.clear_first,
            status: TransferStatus::Running,
            records_read: 0,
            records_persisted: 0,
            records_skipped: 0,
            batches_loaded: 0,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: None,
        }
    }

    pub fn for_import(run_id: Uuid, settings: &ImportSettings) -> Self {
        Self::start(run_id, &settings.csv_file, &settings.transfer_settings())
    }

    pub fn committed(
        mut self,
        records_read: u64,
        records_persisted: u64,
        records_skipped: u64,
        batches_loaded: u64,
    ) -> Self {
        self.records_read = records_read;
        self.records_persisted = records_persisted;
        self.records_skipped = records_skipped;
        self.batches_loaded = batches_loaded;
        self.status = TransferStatus::Committed;
        self.finish()
    }

    /// Nothing of a rolled back run is persisted, so the counters stay at zero.
    pub fn rolled_back(mut self, error: impl ToString) -> Self {
        self.status = TransferStatus::RolledBack;
        self.error = Some(error.to_string());
        self.finish()
    }

    fn finish(mut self) -> Self {
        let now = Utc::now();
        self.duration_ms = Some((now - self.started_at).num_milliseconds());
        self.finished_at = Some(now);
        self
    }
}
