use async_trait::async_trait;
use connectors::sql::base::error::DbError;
use planner::query::ast::insert::Insert;

pub mod mysql;

/// A store that can receive a run's batches.
#[async_trait]
pub trait Destination: Send + Sync {
    fn name(&self) -> String;

    /// Empties `table`. Takes effect immediately, independent of any session.
    async fn truncate(&self, table: &str) -> Result<(), DbError>;

    /// Opens the transaction a run loads into.
    async fn begin(&self) -> Result<Box<dyn LoadSession>, DbError>;
}

/// One open transaction on a [`Destination`].
///
/// Nothing executed through a session is visible to other readers until
/// `commit`. `rollback` discards all of it.
#[async_trait]
pub trait LoadSession: Send {
    /// Executes one insert and returns the number of rows the store persisted.
    async fn execute_insert(&mut self, insert: &Insert) -> Result<u64, DbError>;

    async fn commit(self: Box<Self>) -> Result<(), DbError>;

    async fn rollback(self: Box<Self>) -> Result<(), DbError>;
}
