use crate::core::value::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

/// A record shaped for the target table: one value per target column, in
/// the column order of the translation table that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub field_values: Vec<FieldValue>,
}

impl TargetRecord {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        TargetRecord { field_values }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.field_values.iter().find(|f| f.name == column)
    }

    pub fn get_value(&self, column: &str) -> Value {
        self.get(column)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.field_values.iter().map(|f| f.name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.field_values.iter().map(|f| &f.value)
    }

    /// True when both records carry the same columns in the same order.
    pub fn same_shape(&self, other: &TargetRecord) -> bool {
        self.field_values.len() == other.field_values.len() && self.columns().eq(other.columns())
    }
}
