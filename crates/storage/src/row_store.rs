//! Record storage for keyscan.
//!
//! This module provides the `TableStore` struct which holds the records of a
//! single table together with one ordered index per declared index, plus the
//! clustering index that defines bookmarks.

use crate::cursor::TableCursor;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use keyscan_core::schema::{IndexDef, Order, Table};
use keyscan_core::{DataType, Record, Row, Value};
use keyscan_index::{
    Bookmark, IndexEntry, IndexError, Key, KeyColumn, KeyLimit, KeySchema, OrderedIndex, Result,
};

/// Record storage backend: HashMap (O(1) lookup) or BTreeMap (O(log n) lookup).
#[cfg(feature = "hash-store")]
type RecordMap = hashbrown::HashMap<Bookmark, Row>;
#[cfg(not(feature = "hash-store"))]
type RecordMap = BTreeMap<Bookmark, Row>;

/// Name of the clustering index of a table without a primary key.
pub const SEQUENCE_INDEX: &str = "$sequence";

/// A declared index and the entries it currently holds.
#[derive(Clone, Debug)]
pub(crate) struct IndexSlot {
    pub(crate) def: IndexDef,
    /// Row positions of the key columns.
    columns: Vec<usize>,
    /// Key position of the multi-valued column, if any.
    multi_valued: Option<usize>,
    pub(crate) index: OrderedIndex,
}

impl IndexSlot {
    fn new(table: &Table, def: &IndexDef) -> Result<Self> {
        let schema = KeySchema::for_index(table, def)?;
        let mut columns = Vec::with_capacity(def.width());
        let mut multi_valued = None;
        for (pos, ic) in def.columns().iter().enumerate() {
            let column = table.get_column(&ic.name).ok_or_else(|| {
                IndexError::Schema(keyscan_core::Error::column_not_found(
                    table.name(),
                    ic.name.as_str(),
                ))
            })?;
            if column.is_multi_valued() {
                multi_valued = Some(pos);
            }
            columns.push(column.index());
        }
        Ok(Self {
            def: def.clone(),
            columns,
            multi_valued,
            index: OrderedIndex::new(def.name(), schema, def.is_primary()),
        })
    }

    /// Computes the distinct keys a row contributes to this index, sorted.
    pub(crate) fn keys_for(&self, row: &Row) -> Result<Vec<Key>> {
        let schema = self.index.schema();
        let mut keys = BTreeSet::new();

        if self.def.is_tuple() {
            let min_length = self.def.get_tuple_limits().min_length.max(1);
            let value = row.get(self.columns[0]).unwrap_or(&Value::Null);
            for element in elements(value) {
                for suffix in suffixes(&element, min_length) {
                    keys.insert(schema.make_key(&[suffix], KeyLimit::Exact)?);
                }
            }
            return Ok(keys.into_iter().collect());
        }

        let values: Vec<Value> = self
            .columns
            .iter()
            .map(|&c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        match self.multi_valued {
            None => {
                keys.insert(schema.make_key(&values, KeyLimit::Exact)?);
            }
            Some(pos) => {
                let mut expanded = elements(&values[pos]);
                if expanded.is_empty() {
                    expanded.push(Value::Null);
                }
                for element in expanded {
                    let mut values = values.clone();
                    values[pos] = element;
                    keys.insert(schema.make_key(&values, KeyLimit::Exact)?);
                }
            }
        }
        Ok(keys.into_iter().collect())
    }
}

/// The values a column holds: list elements, or the value itself.
fn elements(value: &Value) -> Vec<Value> {
    match value {
        Value::List(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// The whole value plus every shorter suffix at least `min_length` long.
///
/// The whole value is always kept, so an empty or short value still has an
/// entry and the empty needle matches every non-null value.
fn suffixes(value: &Value, min_length: usize) -> Vec<Value> {
    match value {
        Value::String(s) => {
            let total = s.chars().count();
            let mut out = vec![value.clone()];
            out.extend(
                s.char_indices()
                    .enumerate()
                    .skip(1)
                    .take_while(|(n, _)| total - n >= min_length)
                    .map(|(_, (i, _))| Value::from(&s[i..])),
            );
            out
        }
        Value::Bytes(b) => {
            let mut out = vec![value.clone()];
            out.extend(
                (1..b.len())
                    .take_while(|i| b.len() - i >= min_length)
                    .map(|i| Value::Bytes(b[i..].to_vec())),
            );
            out
        }
        _ => Vec::new(),
    }
}

fn clustered_entry(bookmark: &Bookmark) -> IndexEntry {
    IndexEntry::new(Key::from_bytes(bookmark.as_bytes().to_vec()), bookmark.clone())
}

/// Record storage for a single table.
#[derive(Clone, Debug)]
pub struct TableStore {
    schema: Table,
    records: RecordMap,
    clustered: IndexSlot,
    secondary: Vec<IndexSlot>,
    /// Next insertion number, used when the table has no primary key.
    next_sequence: u64,
}

impl TableStore {
    /// Creates an empty store for the given table.
    pub fn new(schema: Table) -> Result<Self> {
        let clustered = match schema.primary_key() {
            Some(pk) => IndexSlot::new(&schema, pk)?,
            None => IndexSlot {
                def: IndexDef::new(SEQUENCE_INDEX, schema.name(), Vec::new()).primary(true),
                columns: Vec::new(),
                multi_valued: None,
                index: OrderedIndex::new(
                    SEQUENCE_INDEX,
                    KeySchema::new(vec![KeyColumn::new(DataType::Int64, Order::Asc)]),
                    true,
                ),
            },
        };
        let secondary = schema
            .indices()
            .iter()
            .filter(|def| !def.is_primary())
            .map(|def| IndexSlot::new(&schema, def))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            table = schema.name(),
            clustered = clustered.index.name(),
            secondary = secondary.len(),
            "created table store"
        );

        Ok(Self {
            schema,
            records: RecordMap::default(),
            clustered,
            secondary,
            next_sequence: 0,
        })
    }

    /// Creates an empty store for a record type's table.
    pub fn for_record<R: Record>() -> Result<Self> {
        Self::new(R::table()?)
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &Table {
        &self.schema
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts a record, returning its bookmark.
    pub fn insert(&mut self, row: Row) -> Result<Bookmark> {
        let row = self.schema.conform_row(row)?;
        let clustered_key = self.clustered_key(&row)?;
        let bookmark = Bookmark::from_bytes(clustered_key.as_bytes().to_vec());
        if self.records.contains_key(&bookmark) {
            return Err(IndexError::DuplicateKey {
                index: self.clustered.index.name().into(),
            });
        }

        let entries = self.secondary_keys(&row)?;
        self.clustered
            .index
            .insert(IndexEntry::new(clustered_key, bookmark.clone()))?;
        self.add_entries(&bookmark, entries)?;
        if self.schema.primary_key().is_none() {
            self.next_sequence += 1;
        }
        self.records.insert(bookmark.clone(), row);
        Ok(bookmark)
    }

    /// Inserts a typed record.
    pub fn insert_record<R: Record>(&mut self, record: &R) -> Result<Bookmark> {
        self.insert(record.to_row())
    }

    /// Replaces a record's values, returning its (possibly new) bookmark.
    pub fn replace(&mut self, bookmark: &Bookmark, row: Row) -> Result<Bookmark> {
        let old = self
            .records
            .get(bookmark)
            .cloned()
            .ok_or(IndexError::RecordNotFound)?;
        let row = self.schema.conform_row(row)?;

        let clustered_key = if self.schema.primary_key().is_some() {
            self.clustered_key(&row)?
        } else {
            Key::from_bytes(bookmark.as_bytes().to_vec())
        };
        let new_bookmark = Bookmark::from_bytes(clustered_key.as_bytes().to_vec());
        if &new_bookmark != bookmark && self.records.contains_key(&new_bookmark) {
            return Err(IndexError::DuplicateKey {
                index: self.clustered.index.name().into(),
            });
        }

        let old_entries = self.secondary_keys(&old)?;
        let new_entries = self.secondary_keys(&row)?;

        self.remove_entries(bookmark, old_entries);
        self.clustered.index.remove(&clustered_entry(bookmark));
        self.records.remove(bookmark);

        self.clustered
            .index
            .insert(IndexEntry::new(clustered_key, new_bookmark.clone()))?;
        self.add_entries(&new_bookmark, new_entries)?;
        self.records.insert(new_bookmark.clone(), row);
        Ok(new_bookmark)
    }

    /// Deletes a record, returning its values.
    pub fn delete(&mut self, bookmark: &Bookmark) -> Result<Row> {
        let row = self
            .records
            .get(bookmark)
            .cloned()
            .ok_or(IndexError::RecordNotFound)?;
        let entries = self.secondary_keys(&row)?;
        self.remove_entries(bookmark, entries);
        self.clustered.index.remove(&clustered_entry(bookmark));
        self.records.remove(bookmark);
        Ok(row)
    }

    /// Gets a record's values by bookmark.
    pub fn get(&self, bookmark: &Bookmark) -> Option<&Row> {
        self.records.get(bookmark)
    }

    /// Gets a typed record by bookmark.
    pub fn record<R: Record>(&self, bookmark: &Bookmark) -> Result<R> {
        let row = self.get(bookmark).ok_or(IndexError::RecordNotFound)?;
        Ok(R::from_row(row)?)
    }

    /// Opens a cursor positioned nowhere on the clustering index.
    pub fn cursor(&self) -> TableCursor<'_> {
        TableCursor::new(self)
    }

    /// Returns the ordered index with the given name. `None` names the
    /// clustering index.
    pub fn index(&self, name: Option<&str>) -> Result<&OrderedIndex> {
        self.slot(name).map(|slot| &slot.index)
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.clustered.index.clear();
        for slot in &mut self.secondary {
            slot.index.clear();
        }
        self.next_sequence = 0;
    }

    /// Returns the names of every index, clustering index first.
    pub fn index_names(&self) -> Vec<String> {
        core::iter::once(self.clustered_name().into())
            .chain(self.secondary.iter().map(|slot| slot.index.name().into()))
            .collect()
    }

    pub(crate) fn slot(&self, name: Option<&str>) -> Result<&IndexSlot> {
        match name {
            None => Ok(&self.clustered),
            Some(name) if name == self.clustered.index.name() => Ok(&self.clustered),
            Some(name) => self
                .secondary
                .iter()
                .find(|slot| slot.index.name() == name)
                .ok_or_else(|| IndexError::UnknownIndex { name: name.into() }),
        }
    }

    pub(crate) fn clustered_slot(&self) -> &IndexSlot {
        &self.clustered
    }

    pub(crate) fn clustered_name(&self) -> &str {
        self.clustered.index.name()
    }

    /// Every entry a record has in the given index, in key order.
    pub(crate) fn entries_for(&self, slot: &IndexSlot, bookmark: &Bookmark) -> Result<Vec<IndexEntry>> {
        let Some(row) = self.records.get(bookmark) else {
            return Ok(Vec::new());
        };
        if slot.index.name() == self.clustered_name() {
            return Ok(vec![clustered_entry(bookmark)]);
        }
        Ok(slot
            .keys_for(row)?
            .into_iter()
            .map(|key| IndexEntry::new(key, bookmark.clone()))
            .collect())
    }

    fn clustered_key(&self, row: &Row) -> Result<Key> {
        if self.schema.primary_key().is_some() {
            let keys = self.clustered.keys_for(row)?;
            keys.into_iter().next().ok_or(IndexError::RecordNotFound)
        } else {
            let seq = i64::try_from(self.next_sequence).map_err(|_| IndexError::KeyTypeMismatch {
                expected: DataType::Int64,
                value: alloc::format!("{}", self.next_sequence),
            })?;
            self.clustered
                .index
                .schema()
                .make_key(&[Value::Int64(seq)], KeyLimit::Exact)
        }
    }

    fn secondary_keys(&self, row: &Row) -> Result<Vec<Vec<Key>>> {
        self.secondary.iter().map(|slot| slot.keys_for(row)).collect()
    }

    fn add_entries(&mut self, bookmark: &Bookmark, entries: Vec<Vec<Key>>) -> Result<()> {
        for (slot, keys) in self.secondary.iter_mut().zip(entries) {
            for key in keys {
                slot.index.insert(IndexEntry::new(key, bookmark.clone()))?;
            }
        }
        Ok(())
    }

    fn remove_entries(&mut self, bookmark: &Bookmark, entries: Vec<Vec<Key>>) {
        for (slot, keys) in self.secondary.iter_mut().zip(entries) {
            for key in keys {
                slot.index.remove(&IndexEntry::new(key, bookmark.clone()));
            }
        }
    }
}
