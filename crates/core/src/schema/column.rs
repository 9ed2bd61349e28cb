//! Column definition for keyscan table schemas.

use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;

/// A column definition in a table schema.
#[derive(Clone, Debug)]
pub struct Column {
    /// Column name.
    name: String,
    /// Data type of the column (of each element for multi-valued columns).
    data_type: DataType,
    /// Whether this column allows null values.
    nullable: bool,
    /// Whether this column holds a list of values.
    multi_valued: bool,
    /// Column index in the table (0-based).
    index: usize,
}

impl Column {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        let nullable = data_type.is_nullable_by_default();
        Self {
            name,
            data_type,
            nullable,
            multi_valued: false,
            index: 0,
        }
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets whether this column is multi-valued.
    pub fn multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }

    /// Sets the column index.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns whether this column is nullable.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns whether this column is multi-valued.
    #[inline]
    pub fn is_multi_valued(&self) -> bool {
        self.multi_valued
    }

    /// Returns the column index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the value stored when a record omits this column.
    pub fn default_value(&self) -> Value {
        if self.multi_valued {
            Value::List(alloc::vec::Vec::new())
        } else if self.nullable {
            Value::Null
        } else {
            Value::default_for_type(self.data_type)
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.multi_valued == other.multi_valued
    }
}
