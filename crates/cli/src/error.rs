use connectors::sql::base::error::{ConnectorError, DbError};
use engine_config::error::ConfigError;
use engine_core::error::TransferError;
use query_service::error::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Interrupted by a shutdown signal")]
    Cancelled,
}

impl CliError {
    /// Errors caused by the caller's input rather than the environment.
    pub fn is_usage_error(&self) -> bool {
        match self {
            CliError::Config(_) => true,
            CliError::Query(e) => e.is_client_error(),
            _ => false,
        }
    }
}
