use serde::{Deserialize, Serialize};

/// A single bindable value, either a cell of a mapped record or a
/// query parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
    Uint(u64),
    Null,
}

impl Value {
    /// Builds a cell value from raw source text. Missing and empty text
    /// both become `Null`; anything else is kept verbatim.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if !s.is_empty() => Value::String(s.to_string()),
            _ => Value::Null,
        }
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Value::String(s),
            None => Value::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}
