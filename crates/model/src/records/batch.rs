use crate::records::row::TargetRecord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BatchError {
    #[error("A batch must contain at least one record")]
    Empty,

    #[error("Record {index} of batch {seq} has a different column set than the first record")]
    ShapeMismatch { seq: usize, index: usize },
}

/// A non-empty group of records written with a single statement.
///
/// Every record has the same columns in the same order, so one column list
/// and one statement shape serve the whole batch.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based position of this batch within its run.
    pub seq: usize,
    rows: Vec<TargetRecord>,
}

impl Batch {
    pub fn new(seq: usize, rows: Vec<TargetRecord>) -> Result<Self, BatchError> {
        let first = rows.first().ok_or(BatchError::Empty)?;
        if let Some(index) = rows.iter().position(|row| !row.same_shape(first)) {
            return Err(BatchError::ShapeMismatch { seq, index });
        }
        Ok(Batch { seq, rows })
    }

    pub fn id(&self) -> String {
        format!("batch-{}", self.seq)
    }

    pub fn columns(&self) -> Vec<String> {
        self.rows[0].columns().map(str::to_string).collect()
    }

    pub fn rows(&self) -> &[TargetRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::value::Value, records::row::FieldValue};

    fn record(cols: &[&str]) -> TargetRecord {
        TargetRecord::new(
            cols.iter()
                .map(|c| FieldValue {
                    name: c.to_string(),
                    value: Value::Null,
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert_eq!(Batch::new(1, vec![]).unwrap_err(), BatchError::Empty);
    }

    #[test]
    fn test_reordered_columns_are_a_shape_mismatch() {
        let err = Batch::new(
            4,
            vec![record(&["siren", "sigle"]), record(&["sigle", "siren"])],
        )
        .unwrap_err();
        assert_eq!(err, BatchError::ShapeMismatch { seq: 4, index: 1 });
    }

    #[test]
    fn test_columns_follow_first_record() {
        let batch = Batch::new(1, vec![record(&["siren", "sigle"]); 3]).unwrap();
        assert_eq!(batch.columns(), vec!["siren", "sigle"]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.id(), "batch-1");
    }
}
