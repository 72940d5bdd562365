//! Defines the AST for SQL expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A bound value; rendered as a placeholder.
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'excluded' in 'excluded.name'
    pub name: String,
}
