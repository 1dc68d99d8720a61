use crate::error::ConfigError;
use engine_core::accumulator::DEFAULT_BATCH_SIZE;
use std::num::NonZeroUsize;

/// Upper bound on bound parameters in one MySQL prepared statement.
pub const MAX_PLACEHOLDERS: usize = 65_535;

/// A batch size that fits a single multi-row insert of `columns` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    pub fn new(rows: usize, columns: usize) -> Result<Self, ConfigError> {
        let size = NonZeroUsize::new(rows).ok_or_else(|| {
            ConfigError::InvalidSettings("batch size must be at least 1".into())
        })?;

        let placeholders = rows.saturating_mul(columns.max(1));
        if placeholders > MAX_PLACEHOLDERS {
            return Err(ConfigError::InvalidSettings(format!(
                "batch size {rows} x {columns} columns needs {placeholders} placeholders, \
                 more than the {MAX_PLACEHOLDERS} MySQL allows; use at most {}",
                MAX_PLACEHOLDERS / columns.max(1)
            )));
        }

        Ok(BatchSize(size))
    }

    pub fn get(&self) -> NonZeroUsize {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        BatchSize(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(BatchSize::new(0, 34).is_err());
        assert_eq!(BatchSize::new(1000, 34).unwrap().get().get(), 1000);
        assert!(BatchSize::new(1927, 34).is_ok());
        assert!(BatchSize::new(1928, 34).is_err());
        assert_eq!(BatchSize::default().get().get(), 1000);
    }
}
