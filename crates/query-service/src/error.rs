use connectors::sql::base::error::DbError;
use model::pagination::page::PageRequestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid page request: {0}")]
    InvalidPageRequest(#[from] PageRequestError),

    #[error("SIREN must be 9 digits, got '{0}'")]
    InvalidSiren(String),

    #[error("Search term must be at least {min} characters, got '{term}'")]
    InvalidSearchTerm { term: String, min: usize },

    #[error("Limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: u64, max: u64 },

    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Analytics client is not open")]
    AnalyticsClosed,
}

impl QueryError {
    /// True for errors caused by the request rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidPageRequest(_)
                | QueryError::InvalidSiren(_)
                | QueryError::InvalidSearchTerm { .. }
                | QueryError::InvalidLimit { .. }
                | QueryError::NotFound(_)
        )
    }
}
