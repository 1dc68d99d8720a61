use crate::connectors::destination::LoadSession;
use connectors::sql::base::error::DbError;
use model::{records::batch::Batch, transfer::LoadResult};
use planner::query::ast::{
    common::TableRef,
    expr::Expr,
    insert::{ConflictAction, Insert},
};
use std::time::Instant;
use tracing::info;

/// Writes one batch with one duplicate-tolerant multi-row insert.
///
/// Rows whose key already exists are left untouched and counted as
/// skipped. The loader never retries; a store error fails the batch as a
/// whole and it contributes nothing.
#[derive(Debug, Clone)]
pub struct BulkLoader {
    table: TableRef,
}

impl BulkLoader {
    pub fn new(table: &str) -> Self {
        BulkLoader {
            table: TableRef::new(table),
        }
    }

    pub fn table(&self) -> &str {
        &self.table.name
    }

    pub fn build_insert(&self, batch: &Batch) -> Insert {
        let values = batch
            .rows()
            .iter()
            .map(|row| row.values().cloned().map(Expr::Value).collect())
            .collect();

        Insert {
            table: self.table.clone(),
            columns: batch.columns(),
            values,
            on_conflict: Some(ConflictAction::Ignore),
        }
    }

    pub async fn load(
        &self,
        session: &mut dyn LoadSession,
        batch: &Batch,
    ) -> Result<LoadResult, DbError> {
        let start = Instant::now();
        let insert = self.build_insert(batch);
        let affected = session.execute_insert(&insert).await?;
        let result = LoadResult::from_affected(batch.len(), affected);

        let duration = start.elapsed();
        let rows_per_sec = batch.len() as f64 / duration.as_secs_f64().max(f64::EPSILON);
        info!(
            batch_id = %batch.id(),
            rows = batch.len(),
            persisted = result.persisted,
            skipped = result.skipped,
            duration_ms = duration.as_millis() as u64,
            rows_per_sec = %format!("{:.2}", rows_per_sec),
            "Batch loaded"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{
        core::value::Value,
        records::row::{FieldValue, TargetRecord},
    };
    use planner::query::{dialect::MySql, renderer::render};

    fn record(siren: &str, sigle: Option<&str>) -> TargetRecord {
        TargetRecord::new(vec![
            FieldValue {
                name: "siren".into(),
                value: Value::from(siren),
            },
            FieldValue {
                name: "sigle_unite_legale".into(),
                value: Value::from(sigle.map(str::to_string)),
            },
        ])
    }

    #[test]
    fn test_insert_names_exactly_the_batch_columns() {
        let batch = Batch::new(
            1,
            vec![record("000325175", None), record("005880596", Some("GEP"))],
        )
        .unwrap();
        let insert = BulkLoader::new("unite_legale").build_insert(&batch);

        assert!(insert.ignores_conflicts());
        assert_eq!(insert.columns, vec!["siren", "sigle_unite_legale"]);
        assert_eq!(insert.row_count(), 2);

        let (sql, params) = render(&insert, &MySql);
        assert_eq!(
            sql,
            "INSERT IGNORE INTO `unite_legale` (`siren`, `sigle_unite_legale`) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(params[1], Value::Null);
        assert_eq!(params[3], Value::String("GEP".into()));
    }
}
