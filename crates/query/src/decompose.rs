//! Predicate decomposition.
//!
//! Flattens a conjunction of single-field comparisons into triples of
//! `(field, kind, value)`, with the field always conceptually on the left.

use crate::ast::{BinaryOp, Expr, ValueThunk};
use crate::error::{CompileError, FilterError};
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use keyscan_core::Value;

/// Inclusive comparison kinds accepted in a triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Le,
    Eq,
    Ge,
}

/// What a triple asks of its field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TripleKind {
    Compare(Comparison),
    /// The field begins with (in a tuple index: contains) the value.
    Prefix,
}

/// Where a condition's value comes from.
#[derive(Clone, Debug)]
pub enum ValueSource {
    Literal(Value),
    Param(usize),
    Thunk(ValueThunk),
}

impl ValueSource {
    /// Produces the value for one bind.
    pub fn resolve(&self, args: &[Value]) -> Result<Value, FilterError> {
        match self {
            ValueSource::Literal(v) => Ok(v.clone()),
            ValueSource::Param(i) => args.get(*i).cloned().ok_or(FilterError::MissingArgument {
                index: *i,
                supplied: args.len(),
            }),
            ValueSource::Thunk(t) => Ok(t.eval(args)),
        }
    }

    pub(crate) fn from_expr(expr: &Expr) -> Result<Self, CompileError> {
        match expr {
            Expr::Literal(v) => Ok(ValueSource::Literal(v.clone())),
            Expr::Param(i) => Ok(ValueSource::Param(*i)),
            Expr::Thunk(t) => Ok(ValueSource::Thunk(t.clone())),
            other => Err(CompileError::unsupported(
                format!("{}", other),
                "values must be literals, arguments or thunks",
            )),
        }
    }
}

/// One decomposed condition.
#[derive(Clone, Debug)]
pub struct Triple {
    pub field: String,
    pub kind: TripleKind,
    pub value: ValueSource,
}

/// Decomposes a predicate into triples, left to right.
pub fn decompose(expr: &Expr) -> Result<Vec<Triple>, CompileError> {
    if let Expr::Contains { haystack, needle } = expr {
        return Ok(vec![contains_triple(expr, haystack, needle)?]);
    }
    let mut triples = Vec::new();
    collect(expr, &mut triples)?;
    Ok(triples)
}

fn collect(expr: &Expr, out: &mut Vec<Triple>) -> Result<(), CompileError> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOp::And,
            right,
        } => {
            collect(left, out)?;
            collect(right, out)
        }
        Expr::BinaryOp { left, op, right } if op.is_comparison() => {
            out.push(comparison_triple(expr, left, *op, right)?);
            Ok(())
        }
        Expr::Contains { .. } => Err(CompileError::unsupported(
            format!("{}", expr),
            "contains is only supported as the single top-level condition",
        )),
        Expr::BinaryOp { op: BinaryOp::Or, .. } => Err(CompileError::unsupported(
            format!("{}", expr),
            "disjunctions cannot be answered by a single index range",
        )),
        _ => Err(CompileError::unsupported(
            format!("{}", expr),
            "expected a conjunction of field comparisons",
        )),
    }
}

fn comparison_triple(
    expr: &Expr,
    left: &Expr,
    op: BinaryOp,
    right: &Expr,
) -> Result<Triple, CompileError> {
    let (field, op, value) = match (left.as_field(), right.as_field()) {
        (Some(_), Some(_)) => {
            return Err(CompileError::unsupported(
                format!("{}", expr),
                "both sides reference a field",
            ))
        }
        (None, None) => {
            return Err(CompileError::unsupported(
                format!("{}", expr),
                "neither side references a field",
            ))
        }
        (Some(field), None) => (field, op, right),
        (None, Some(field)) => (field, op.mirror(), left),
    };

    let kind = match op {
        BinaryOp::Eq => Comparison::Eq,
        BinaryOp::Le => Comparison::Le,
        BinaryOp::Ge => Comparison::Ge,
        BinaryOp::Lt | BinaryOp::Gt => {
            return Err(CompileError::unsupported(
                format!("{}", expr),
                "strict comparisons are not supported; use an inclusive bound and skip the boundary value",
            ))
        }
        _ => {
            return Err(CompileError::unsupported(
                format!("{}", expr),
                "only ==, <= and >= can be answered by an index range",
            ))
        }
    };

    Ok(Triple {
        field: field.into(),
        kind: TripleKind::Compare(kind),
        value: ValueSource::from_expr(value)?,
    })
}

fn contains_triple(expr: &Expr, haystack: &Expr, needle: &Expr) -> Result<Triple, CompileError> {
    let field = haystack.as_field().ok_or_else(|| {
        CompileError::unsupported(format!("{}", expr), "contains must be called on a field")
    })?;
    Ok(Triple {
        field: field.into(),
        kind: TripleKind::Prefix,
        value: ValueSource::from_expr(needle)?,
    })
}
