use crate::{error::ConfigError, settings::batch_size::BatchSize};
use engine_core::{
    controller::{DEFAULT_TABLE, TransferSettings},
    retry::RetryPolicy,
};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_CSV_FILE: &str = "data/StockUniteLegale_utf8.csv";

/// Validated settings of one import run.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub csv_file: PathBuf,
    pub batch_size: BatchSize,
    pub truncate: bool,
    pub table: String,
    pub delimiter: u8,
    pub max_attempts: usize,
    pub batch_timeout: Option<Duration>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            csv_file: PathBuf::from(DEFAULT_CSV_FILE),
            batch_size: BatchSize::default(),
            truncate: false,
            table: DEFAULT_TABLE.to_string(),
            delimiter: b',',
            max_attempts: 1,
            batch_timeout: None,
        }
    }
}

impl ImportSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.is_empty()
            || !self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidSettings(format!(
                "table name '{}' must be non-empty and only contain [A-Za-z0-9_]",
                self.table
            )));
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidSettings(
                "max attempts must be at least 1".into(),
            ));
        }

        if !self.delimiter.is_ascii() || self.delimiter == b'\n' || self.delimiter == b'"' {
            return Err(ConfigError::InvalidSettings(format!(
                "delimiter {:?} is not usable",
                self.delimiter as char
            )));
        }

        if self.batch_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidSettings(
                "batch timeout must be positive".into(),
            ));
        }

        Ok(())
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            table: self.table.clone(),
            batch_size: self.batch_size.get(),
            clear_first: self.truncate,
            batch_timeout: self.batch_timeout,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_attempts(self.max_attempts)
    }
}

/// Parses a delimiter flag: a single ASCII character, or `\t` / `tab`.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(ConfigError::InvalidValue {
            key: "delimiter".into(),
            reason: format!("'{other}' is not a single ASCII character"),
        }),
    }
}
