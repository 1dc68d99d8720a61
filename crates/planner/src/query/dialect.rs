//! Defines the `Dialect` trait for database-specific SQL syntax.

use crate::query::ast::insert::ConflictAction;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - MySQL uses backticks: `` `my_column` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - MySQL uses `?`
    fn get_placeholder(&self, index: usize) -> String;

    /// Leading keywords of an INSERT statement for the given conflict policy,
    /// up to and including `INTO`.
    fn insert_prefix(&self, on_conflict: Option<ConflictAction>) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn get_placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn insert_prefix(&self, on_conflict: Option<ConflictAction>) -> &'static str {
        match on_conflict {
            Some(ConflictAction::Ignore) => "INSERT IGNORE INTO ",
            None => "INSERT INTO ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_quoting_escapes_backticks() {
        assert_eq!(MySql.quote_identifier("siren"), "`siren`");
        assert_eq!(MySql.quote_identifier("odd`name"), "`odd``name`");
    }
}
