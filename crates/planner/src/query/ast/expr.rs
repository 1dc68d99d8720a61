//! Defines the AST for SQL expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `unite_legale` or `u.siren`.
    Identifier(Ident),

    /// A bound value; always rendered as a placeholder.
    Value(Value),

    /// A binary operation, e.g., `column = ?` or `a OR b`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g., `COUNT(*)`.
    FunctionCall(FunctionCall),

    /// An aliased expression, e.g. `COUNT(*) AS siren_count`
    Alias { expr: Box<Expr>, alias: String },

    /// `expr IS NOT NULL`
    IsNotNull(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
    pub distinct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Like,
    And,
    Or,
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn count_star() -> Expr {
        Expr::FunctionCall(FunctionCall {
            name: "COUNT".to_string(),
            args: vec![],
            wildcard: true,
            distinct: false,
        })
    }

    pub fn count_distinct(expr: Expr) -> Expr {
        Expr::FunctionCall(FunctionCall {
            name: "COUNT".to_string(),
            args: vec![expr],
            wildcard: false,
            distinct: true,
        })
    }

    pub fn alias(self, alias: &str) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            alias: alias.to_string(),
        }
    }
}
