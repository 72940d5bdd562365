use crate::query::ast::expr::{Expr, Ident};
use model::core::value::Value;

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod renderer;

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}

/// The proposed row's column inside `ON CONFLICT ... DO UPDATE`.
pub fn excluded(column: &str) -> Expr {
    // Quoted, so it must stay lowercase to match the pseudo-table name.
    Expr::Identifier(Ident {
        qualifier: Some("excluded".to_string()),
        name: column.to_string(),
    })
}
