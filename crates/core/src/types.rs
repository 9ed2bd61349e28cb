//! Data type definitions for keyscan.
//!
//! This module defines the column types a table can declare.

/// Supported column types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
    /// Variable-length binary data
    Bytes,
}

impl DataType {
    /// Returns the default value for this data type as a string representation.
    pub fn default_value_repr(&self) -> &'static str {
        match self {
            DataType::Boolean => "false",
            DataType::Int32 => "0",
            DataType::Int64 => "0",
            DataType::Float64 => "0.0",
            DataType::String => "\"\"",
            DataType::DateTime => "0",
            DataType::Bytes => "[]",
        }
    }

    /// Returns whether this type is nullable by default.
    pub fn is_nullable_by_default(&self) -> bool {
        matches!(self, DataType::Bytes)
    }

    /// Returns whether this type is variable length.
    pub fn is_variable_length(&self) -> bool {
        matches!(self, DataType::String | DataType::Bytes)
    }

    /// Returns whether keys of this type can be matched on a leading portion
    /// of the column value (textual or variable-length binary).
    pub fn supports_prefix(&self) -> bool {
        self.is_variable_length()
    }

    /// Returns whether this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::DateTime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::Int32, DataType::Int32);
        assert_ne!(DataType::Int32, DataType::Int64);
    }

    #[test]
    fn test_nullable_by_default() {
        assert!(!DataType::Boolean.is_nullable_by_default());
        assert!(!DataType::Int32.is_nullable_by_default());
        assert!(!DataType::String.is_nullable_by_default());
        assert!(DataType::Bytes.is_nullable_by_default());
    }

    #[test]
    fn test_supports_prefix() {
        assert!(DataType::String.supports_prefix());
        assert!(DataType::Bytes.supports_prefix());
        assert!(!DataType::Int64.supports_prefix());
        assert!(!DataType::Float64.supports_prefix());
        assert!(!DataType::DateTime.supports_prefix());
    }
}
