//! Table definition for keyscan schemas.

use super::column::Column;
use super::index::{IndexDef, IndexKind, IndexedColumn, Order, TupleLimits};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::DataType;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// A table definition: columns plus indices in declaration order.
#[derive(Clone, Debug)]
pub struct Table {
    /// Table name.
    name: String,
    /// Column definitions.
    columns: Vec<Column>,
    /// Index definitions, in declaration order.
    indices: Vec<IndexDef>,
}

impl Table {
    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the indices in declaration order.
    #[inline]
    pub fn indices(&self) -> &[IndexDef] {
        &self.indices
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a column index by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Gets an index by name.
    pub fn get_index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.name() == name)
    }

    /// Returns the clustering index if one was declared.
    pub fn primary_key(&self) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.is_primary())
    }

    /// Checks a row against the column declarations.
    ///
    /// Values are coerced to their column type; multi-valued columns must hold
    /// a list whose elements coerce to the element type.
    pub fn conform_row(&self, row: Row) -> Result<Row> {
        if row.len() != self.columns.len() {
            return Err(Error::RowShape {
                table: self.name.clone(),
                expected: self.columns.len(),
                got: row.len(),
            });
        }

        let values = row
            .into_values()
            .into_iter()
            .zip(self.columns.iter())
            .map(|(value, column)| conform_value(column, value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Row::new(values))
    }
}

fn conform_value(column: &Column, value: crate::Value) -> Result<crate::Value> {
    use crate::Value;

    if column.is_multi_valued() {
        return match value {
            Value::List(items) => items
                .iter()
                .map(|item| coerce_scalar(column, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Value::Null => Ok(Value::List(Vec::new())),
            other => Err(Error::type_mismatch(
                column.name(),
                column.data_type(),
                format!("{:?}", other.data_type()),
            )),
        };
    }
    coerce_scalar(column, &value)
}

fn coerce_scalar(column: &Column, value: &crate::Value) -> Result<crate::Value> {
    if value.is_null() && !column.is_nullable() && !column.is_multi_valued() {
        return Err(Error::null_constraint(column.name()));
    }
    value.coerce_to(column.data_type()).ok_or_else(|| {
        Error::type_mismatch(
            column.name(),
            column.data_type(),
            format!("{:?}", value.data_type()),
        )
    })
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    indices: Vec<IndexDef>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            indices: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let first = match name.chars().next() {
            Some(c) => c,
            None => return Err(Error::invalid_schema("Name cannot be empty")),
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    fn push_column(mut self, column: Column) -> Result<Self> {
        Self::check_naming_rules(column.name())?;
        if self.columns.iter().any(|c| c.name() == column.name()) {
            return Err(Error::invalid_schema(format!(
                "Column already exists: {}",
                column.name()
            )));
        }
        self.columns.push(column);
        Ok(self)
    }

    /// Adds a column to the table.
    pub fn add_column(self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        self.push_column(Column::new(name, data_type))
    }

    /// Adds a multi-valued column whose elements have the given type.
    pub fn add_multi_valued(self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        self.push_column(Column::new(name, data_type).multi_valued(true))
    }

    /// Marks columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Self {
        for name in columns {
            if let Some(col) = self.columns.iter_mut().find(|c| c.name() == *name) {
                *col = col.clone().nullable(true);
            }
        }
        self
    }

    /// Declares the clustering index over the given columns.
    pub fn add_primary_key(self, columns: &[&str]) -> Result<Self> {
        let pk_name = format!("pk{}", capitalize(&self.name));
        let cols = columns.iter().map(|n| IndexedColumn::new(*n)).collect();
        self.add_index_def(IndexDef::new(pk_name, "", cols).primary(true))
    }

    /// Adds an ascending secondary index.
    pub fn add_index(self, name: impl Into<String>, columns: &[&str]) -> Result<Self> {
        let cols = columns.iter().map(|n| IndexedColumn::new(*n)).collect();
        self.add_index_def(IndexDef::new(name, "", cols))
    }

    /// Adds a secondary index with an explicit order per column.
    pub fn add_ordered_index(
        self,
        name: impl Into<String>,
        columns: &[(&str, Order)],
    ) -> Result<Self> {
        let cols = columns
            .iter()
            .map(|(n, order)| IndexedColumn::new(*n).order(*order))
            .collect();
        self.add_index_def(IndexDef::new(name, "", cols))
    }

    /// Adds a tuple index over a single textual or binary column.
    pub fn add_tuple_index(
        self,
        name: impl Into<String>,
        column: &str,
        limits: TupleLimits,
    ) -> Result<Self> {
        let def = IndexDef::new(name, "", alloc::vec![IndexedColumn::new(column)])
            .kind(IndexKind::Tuple)
            .tuple_limits(limits);
        self.add_index_def(def)
    }

    /// Adds an index definition after validating it against the declared columns.
    pub fn add_index_def(mut self, def: IndexDef) -> Result<Self> {
        Self::check_naming_rules(def.name())?;
        if self.indices.iter().any(|i| i.name() == def.name()) {
            return Err(Error::invalid_schema(format!(
                "Index already exists: {}",
                def.name()
            )));
        }
        if def.columns().is_empty() {
            return Err(Error::invalid_schema(format!(
                "Index has no columns: {}",
                def.name()
            )));
        }
        if def.is_primary() && self.indices.iter().any(|i| i.is_primary()) {
            return Err(Error::invalid_schema("Table already has a primary key"));
        }

        let mut multi_valued = 0;
        for (i, col) in def.columns().iter().enumerate() {
            if def.columns()[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::invalid_schema(format!(
                    "Column {} appears twice in index {}",
                    col.name,
                    def.name()
                )));
            }
            let column = self
                .columns
                .iter()
                .find(|c| c.name() == col.name)
                .ok_or_else(|| Error::column_not_found(&self.name, &col.name))?;
            if column.is_multi_valued() {
                multi_valued += 1;
            }
        }

        if def.is_primary() && multi_valued > 0 {
            return Err(Error::invalid_schema(
                "Primary key cannot contain a multi-valued column",
            ));
        }
        if multi_valued > 1 {
            return Err(Error::invalid_schema(format!(
                "Index {} has more than one multi-valued column",
                def.name()
            )));
        }
        if def.is_tuple() {
            let supported = def.width() == 1
                && self
                    .columns
                    .iter()
                    .find(|c| c.name() == def.columns()[0].name)
                    .map(|c| c.data_type().supports_prefix())
                    .unwrap_or(false);
            if !supported {
                return Err(Error::invalid_schema(format!(
                    "Tuple index {} must cover a single String or Bytes column",
                    def.name()
                )));
            }
        }

        let def = IndexDef::new(def.name(), &self.name, def.columns().to_vec())
            .primary(def.is_primary())
            .kind(def.get_kind())
            .tuple_limits(def.get_tuple_limits());
        self.indices.push(def);
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Result<Table> {
        if self.columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table has no columns: {}",
                self.name
            )));
        }

        let columns: Vec<Column> = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();

        Ok(Table {
            name: self.name,
            columns,
            indices: self.indices,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}
