//! Typed record mapping.

use crate::error::Result;
use crate::row::Row;
use crate::schema::Table;

/// A typed record stored in a keyscan table.
///
/// Implementors declare their table layout once and convert to and from
/// rows whose values follow the table's column order.
///
/// ```rust
/// use keyscan_core::{DataType, Error, Record, Result, Row, Value};
/// use keyscan_core::schema::{Table, TableBuilder};
///
/// struct Person {
///     id: i64,
///     name: String,
/// }
///
/// impl Record for Person {
///     fn table() -> Result<Table> {
///         TableBuilder::new("people")?
///             .add_column("id", DataType::Int64)?
///             .add_column("name", DataType::String)?
///             .add_primary_key(&["id"])?
///             .build()
///     }
///
///     fn to_row(&self) -> Row {
///         Row::new(vec![Value::Int64(self.id), Value::String(self.name.clone())])
///     }
///
///     fn from_row(row: &Row) -> Result<Self> {
///         let id = row.get(0).and_then(Value::as_i64)
///             .ok_or_else(|| Error::type_mismatch("id", DataType::Int64, "missing"))?;
///         let name = row.get(1).and_then(Value::as_str)
///             .ok_or_else(|| Error::type_mismatch("name", DataType::String, "missing"))?;
///         Ok(Person { id, name: name.into() })
///     }
/// }
///
/// let p = Person { id: 7, name: "Ada".into() };
/// let back = Person::from_row(&p.to_row()).unwrap();
/// assert_eq!(back.id, 7);
/// ```
pub trait Record: Sized {
    /// Returns the table declaration for this record type.
    fn table() -> Result<Table>;

    /// Converts the record into a row in column order.
    fn to_row(&self) -> Row;

    /// Reconstructs a record from a stored row.
    fn from_row(row: &Row) -> Result<Self>;
}
