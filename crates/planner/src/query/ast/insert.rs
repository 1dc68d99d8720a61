//! Defines the AST for an INSERT statement.

use crate::query::ast::{common::TableRef, expr::Expr};

/// Represents a complete INSERT statement.
///
/// Multi-row inserts are expressed through `values`, one inner vector per
/// row, each as long as `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    /// The rows of values to be inserted. Each inner vector represents a single row.
    pub values: Vec<Vec<Expr>>,
    /// What to do with rows that collide with an existing unique key.
    pub on_conflict: Option<ConflictAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// Drop the colliding row and keep going with the rest of the statement.
    Ignore,
}

impl Insert {
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    pub fn ignores_conflicts(&self) -> bool {
        self.on_conflict == Some(ConflictAction::Ignore)
    }
}
