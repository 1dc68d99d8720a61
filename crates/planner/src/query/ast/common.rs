//! Defines common, reusable AST nodes for building SQL queries.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// An unqualified table, resolved against the connection's database.
    pub fn new(name: impl Into<String>) -> Self {
        TableRef {
            schema: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}
