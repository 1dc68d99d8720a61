use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any MySQL driver or server error.
    #[error("MySQL error: {0}")]
    MySqlError(#[from] mysql_async::Error),

    /// Writing rows to the database failed at the application level.
    #[error("Write error: {0}")]
    Write(String),

    /// An error occurred while building a SQL query.
    #[error("Query build error: {0}")]
    QueryBuildError(String),

    /// A row came back in a shape the caller did not expect.
    #[error("Row decode error: {0}")]
    Decode(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("MySQL connector creation failed: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("Invalid MySQL connection URL: {0}")]
    InvalidUrl(#[from] mysql_async::UrlError),
}

impl From<ConnectorError> for DbError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::MySql(e) => DbError::MySqlError(e),
            ConnectorError::InvalidUrl(e) => DbError::MySqlError(mysql_async::Error::Url(e)),
        }
    }
}
