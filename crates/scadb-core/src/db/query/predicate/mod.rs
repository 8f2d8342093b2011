//! Module: query::predicate
//! Responsibility: predicate AST, the `q` text language parser, and pure
//! row-level evaluation used by store adapters.

mod ast;
mod eval;
mod parse;

#[cfg(test)]
mod tests;

pub use ast::{CompareOp, ComparePredicate, Predicate};
pub use eval::{FieldPresence, RowView, eval, search_matches, sort_rows};
pub use parse::parse;
