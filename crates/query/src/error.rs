//! Error types for query compilation and filter execution.

use alloc::string::String;
use alloc::vec::Vec;
use keyscan_core::DataType;
use keyscan_index::IndexError;

/// Errors detected while compiling a predicate, before any cursor is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// The predicate contains a node the compiler does not accept.
    #[error("Unsupported expression `{expr}`: {reason}")]
    UnsupportedExpression { expr: String, reason: String },
    /// A field that is not a column of the table.
    #[error("Unknown field: {field}")]
    UnknownField { field: String },
    /// No single index covers every referenced field.
    #[error("No single index covers all of: {}", .fields.join(", "))]
    NoCoveringIndex { fields: Vec<String> },
    /// Covering indices exist but none satisfies the prefix rules.
    #[error("No suitable index found for: {}", .fields.join(", "))]
    NoSuitableIndex { fields: Vec<String> },
    /// A named index does not exist.
    #[error("Unknown index: {index}")]
    UnknownIndex { index: String },
    /// More condition values than the chosen index has columns.
    #[error("Index {index} has {width} columns, got {count} values")]
    TooManyValues {
        index: String,
        width: usize,
        count: usize,
    },
    /// Prefix matching on a column that is neither textual nor binary.
    #[error("Column {column} of type {data_type:?} does not support prefix matching")]
    IncompatibleColumnType { column: String, data_type: DataType },
    /// Prefix matching on a field no tuple index starts with.
    #[error("No tuple index starts with field {field}")]
    NoTupleIndex { field: String },
}

impl CompileError {
    /// Creates an unsupported expression error.
    pub fn unsupported(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::UnsupportedExpression {
            expr: expr.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building or applying a filter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// More values than the index has columns, or none where one is needed.
    #[error("Index {index} has {width} columns, got {count} values")]
    ValueCountOutOfBounds {
        index: String,
        width: usize,
        count: usize,
    },
    /// The strategy does not support the operation.
    #[error("{operation} is not supported by the {strategy} strategy")]
    Unsupported {
        operation: &'static str,
        strategy: &'static str,
    },
    /// A positional argument was referenced but not supplied.
    #[error("Argument {index} was referenced but only {supplied} were supplied")]
    MissingArgument { index: usize, supplied: usize },
    /// The cursor reported an error.
    #[error(transparent)]
    Cursor(#[from] IndexError),
}

/// Result type alias for filter operations.
pub type Result<T> = core::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::NoCoveringIndex {
            fields: vec!["a".into(), "b".into()],
        };
        assert_eq!(format!("{}", err), "No single index covers all of: a, b");

        let err = CompileError::unsupported("x < 5", "strict comparison");
        assert_eq!(format!("{}", err), "Unsupported expression `x < 5`: strict comparison");
    }

    #[test]
    fn test_filter_error_from_cursor() {
        let err: FilterError = IndexError::NoCurrentEntry.into();
        assert_eq!(format!("{}", err), "Cursor has no current entry");
    }
}
