//! AST module for query predicates.

mod expr;

pub use expr::{BinaryOp, Expr, SortOrder, UnaryOp, ValueThunk};
