//! Error types for keyscan schema and record operations.

use crate::types::DataType;
use alloc::string::String;

/// Result type alias for keyscan core operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while declaring schemas or mapping records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Type mismatch error.
    #[error("Type mismatch on column {column}: expected {expected:?}, got {got}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        got: String,
    },
    /// Null value in a column that does not accept nulls.
    #[error("Null constraint violation on column: {column}")]
    NullConstraint { column: String },
    /// Invalid schema definition.
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },
    /// Column not found.
    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    /// Index not found.
    #[error("Index {index} not found in table {table}")]
    IndexNotFound { table: String, index: String },
    /// A row does not have the table's shape.
    #[error("Row for table {table} has {got} values, expected {expected}")]
    RowShape {
        table: String,
        expected: usize,
        got: usize,
    },
}

impl Error {
    /// Creates a type mismatch error.
    pub fn type_mismatch(column: impl Into<String>, expected: DataType, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            column: column.into(),
            expected,
            got: got.into(),
        }
    }

    /// Creates a null constraint error.
    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint {
            column: column.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates an index not found error.
    pub fn index_not_found(table: impl Into<String>, index: impl Into<String>) -> Self {
        Error::IndexNotFound {
            table: table.into(),
            index: index.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch("age", DataType::Int32, "String");
        assert!(err.to_string().contains("Type mismatch"));
        assert!(err.to_string().contains("age"));

        let err = Error::null_constraint("name");
        assert!(err.to_string().contains("name"));

        let err = Error::index_not_found("users", "ixName");
        assert!(err.to_string().contains("ixName"));
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::column_not_found("users", "email");
        match err {
            Error::ColumnNotFound { column, .. } => assert_eq!(column, "email"),
            _ => panic!("Wrong error type"),
        }
    }
}
