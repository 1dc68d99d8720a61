use serde::{Deserialize, Serialize};

/// What one batch insert did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub persisted: u64,
    /// Rows the store did not persist: key conflicts, plus anything else
    /// MySQL silently drops under `INSERT IGNORE`.
    pub skipped: u64,
}

impl LoadResult {
    /// Derives the split from the batch size and the store's affected-row
    /// count. Affected rows are clamped to the batch size.
    pub fn from_affected(batch_len: usize, affected: u64) -> Self {
        let total = batch_len as u64;
        let persisted = affected.min(total);
        LoadResult {
            persisted,
            skipped: total - persisted,
        }
    }
}

/// Running totals of a transfer. Counters only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub records_read: u64,
    pub records_persisted: u64,
    pub records_skipped: u64,
    pub batches_loaded: u64,
}

impl TransferOutcome {
    pub fn record_read(&mut self) {
        self.records_read += 1;
    }

    pub fn absorb(&mut self, result: LoadResult) {
        self.records_persisted += result.persisted;
        self.records_skipped += result.skipped;
        self.batches_loaded += 1;
    }
}
