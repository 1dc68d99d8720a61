use crate::sql::{
    base::error::{ConnectorError, DbError},
    mysql::params::MySqlParamStore,
};
use model::core::value::Value;
use mysql_async::{Opts, Pool, Row, Transaction, TxOpts, prelude::*};
use planner::query::dialect::{self, Dialect};
use tracing::{debug, info};

pub const CREATE_UNITE_LEGALE_SQL: &str = include_str!("sql/create_unite_legale.sql");
const QUERY_TABLE_EXISTS_SQL: &str = include_str!("sql/table_exists.sql");

/// Pooled MySQL access used by both the load path and the read path.
#[derive(Clone)]
pub struct MySqlAdapter {
    pool: Pool,
    dialect: dialect::MySql,
}

impl MySqlAdapter {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let opts = Opts::from_url(url)?;
        let pool = Pool::new(opts);

        // Fail early on bad credentials or an unreachable host.
        let conn = pool.get_conn().await?;
        drop(conn);

        Ok(MySqlAdapter {
            pool,
            dialect: dialect::MySql,
        })
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get_conn().await?;
        let val: Option<i32> = conn.query_first("SELECT 1").await?;
        match val {
            Some(1) => Ok(()),
            other => Err(DbError::Unknown(format!(
                "ping returned unexpected result: {other:?}"
            ))),
        }
    }

    /// Runs a statement without parameters, e.g. DDL.
    pub async fn exec(&self, sql: &str) -> Result<(), DbError> {
        debug!(sql, "Executing statement");
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop(sql).await?;
        Ok(())
    }

    pub async fn create_unite_legale(&self) -> Result<(), DbError> {
        self.exec(CREATE_UNITE_LEGALE_SQL).await?;
        info!("Table `unite_legale` is in place");
        Ok(())
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get_conn().await?;
        let count: Option<u64> = conn.exec_first(QUERY_TABLE_EXISTS_SQL, (table,)).await?;
        Ok(count.unwrap_or(0) > 0)
    }

    /// Empties `table`. TRUNCATE is DDL on MySQL, so this commits on its
    /// own, outside of any load transaction.
    pub async fn truncate_table(&self, table: &str) -> Result<(), DbError> {
        let sql = format!("TRUNCATE TABLE {}", self.dialect.quote_identifier(table));
        self.exec(&sql).await
    }

    pub async fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
        debug!(sql, params = params.len(), "Fetching rows");
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<Row> = conn
            .exec(sql, MySqlParamStore::from_values(params).params())
            .await?;
        Ok(rows)
    }

    /// Runs a single-column numeric query such as `SELECT COUNT(*) ...`.
    pub async fn query_count(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        debug!(sql, params = params.len(), "Counting rows");
        let mut conn = self.pool.get_conn().await?;
        let count: Option<u64> = conn
            .exec_first(sql, MySqlParamStore::from_values(params).params())
            .await?;
        Ok(count.unwrap_or(0))
    }

    pub async fn begin(&self) -> Result<MySqlTransaction, DbError> {
        let tx = self.pool.start_transaction(TxOpts::default()).await?;
        debug!("Transaction started");
        Ok(MySqlTransaction { tx })
    }

    pub async fn disconnect(self) -> Result<(), DbError> {
        self.pool.disconnect().await?;
        Ok(())
    }
}

/// A transaction holding one pooled connection until commit or rollback.
/// Dropping it without either rolls back.
pub struct MySqlTransaction {
    tx: Transaction<'static>,
}

impl MySqlTransaction {
    /// Executes a parameterized statement and returns the affected-row count.
    pub async fn exec_affected(&mut self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        self.tx
            .exec_drop(sql, MySqlParamStore::from_values(params).params())
            .await?;
        Ok(self.tx.affected_rows())
    }

    pub async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
