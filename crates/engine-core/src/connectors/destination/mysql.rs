use crate::connectors::destination::{Destination, LoadSession};
use async_trait::async_trait;
use connectors::sql::{
    base::error::DbError,
    mysql::adapter::{MySqlAdapter, MySqlTransaction},
};
use planner::query::{ast::insert::Insert, dialect, renderer::render};
use tracing::debug;

#[derive(Clone)]
pub struct MySqlDestination {
    adapter: MySqlAdapter,
}

impl MySqlDestination {
    pub fn new(adapter: MySqlAdapter) -> Self {
        MySqlDestination { adapter }
    }
}

#[async_trait]
impl Destination for MySqlDestination {
    fn name(&self) -> String {
        "mysql".to_string()
    }

    async fn truncate(&self, table: &str) -> Result<(), DbError> {
        self.adapter.truncate_table(table).await
    }

    async fn begin(&self) -> Result<Box<dyn LoadSession>, DbError> {
        let tx = self.adapter.begin().await?;
        Ok(Box::new(MySqlLoadSession { tx }))
    }
}

pub struct MySqlLoadSession {
    tx: MySqlTransaction,
}

#[async_trait]
impl LoadSession for MySqlLoadSession {
    async fn execute_insert(&mut self, insert: &Insert) -> Result<u64, DbError> {
        let (sql, params) = render(insert, &dialect::MySql);
        debug!(rows = insert.row_count(), params = params.len(), "Executing insert");
        self.tx.exec_affected(&sql, &params).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        self.tx.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        self.tx.rollback().await
    }
}
