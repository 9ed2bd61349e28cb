//! Index cursor over a `TableStore`.

use crate::row_store::{IndexSlot, TableStore};
use keyscan_core::{Record, Row, Value};
use keyscan_index::{
    Bookmark, BoundSide, Cursor, IndexEntry, IndexError, Key, KeyLimit, RecordPosition, Result,
    ScanBound, SeekMode,
};

/// A cursor over one index of a table store at a time.
///
/// The cursor borrows the store, so the store cannot change while a scan
/// is in progress.
#[derive(Clone, Debug)]
pub struct TableCursor<'s> {
    store: &'s TableStore,
    slot: &'s IndexSlot,
    current: Option<IndexEntry>,
    upper: Option<ScanBound>,
    lower: Option<ScanBound>,
}

impl<'s> TableCursor<'s> {
    pub(crate) fn new(store: &'s TableStore) -> Self {
        Self {
            store,
            slot: store.clustered_slot(),
            current: None,
            upper: None,
            lower: None,
        }
    }

    /// Returns the values of the record under the cursor.
    pub fn current_row(&self) -> Result<&'s Row> {
        let bookmark = &self.current_entry()?.bookmark;
        self.store.get(bookmark).ok_or(IndexError::RecordNotFound)
    }

    /// Returns the record under the cursor as a typed record.
    pub fn current_record<R: Record>(&self) -> Result<R> {
        Ok(R::from_row(self.current_row()?)?)
    }

    fn current_entry(&self) -> Result<&IndexEntry> {
        self.current.as_ref().ok_or(IndexError::NoCurrentEntry)
    }

    fn within_bounds(&self, entry: &IndexEntry) -> bool {
        self.upper.as_ref().map_or(true, |b| b.admits(&entry.key))
            && self.lower.as_ref().map_or(true, |b| b.admits(&entry.key))
    }

    /// Makes `entry` current, or drops the position if there is none.
    fn land(&mut self, entry: Option<IndexEntry>) -> bool {
        self.current = entry;
        self.current.is_some()
    }
}

impl<'s> Cursor for TableCursor<'s> {
    fn select_index(&mut self, name: Option<&str>) -> Result<()> {
        let slot = self.store.slot(name)?;
        if slot.index.name() != self.slot.index.name() {
            self.slot = slot;
            self.current = None;
            self.clear_scan_bound();
        }
        Ok(())
    }

    fn current_index(&self) -> &str {
        self.slot.index.name()
    }

    fn clear_scan_bound(&mut self) {
        self.upper = None;
        self.lower = None;
    }

    fn make_key(&self, values: &[Value], limit: KeyLimit) -> Result<Key> {
        self.slot.index.schema().make_key(values, limit)
    }

    fn seek(&mut self, key: &Key, mode: SeekMode) -> Result<bool> {
        self.clear_scan_bound();
        let entry = match mode {
            SeekMode::GreaterOrEqual => self.slot.index.seek_ge(key),
            SeekMode::LessOrEqual => self.slot.index.seek_le(key),
        };
        Ok(self.land(entry.cloned()))
    }

    fn set_scan_bound(&mut self, key: &Key, side: BoundSide, inclusive: bool) -> Result<bool> {
        let bound = ScanBound::new(key.clone(), side, inclusive);
        let admitted = self
            .current
            .as_ref()
            .map_or(false, |entry| bound.admits(&entry.key));
        match side {
            BoundSide::Upper => self.upper = Some(bound),
            BoundSide::Lower => self.lower = Some(bound),
        }
        if !admitted {
            self.current = None;
        }
        Ok(admitted)
    }

    fn move_first(&mut self) -> Result<bool> {
        self.clear_scan_bound();
        let entry = self.slot.index.first().cloned();
        Ok(self.land(entry))
    }

    fn move_last(&mut self) -> Result<bool> {
        self.clear_scan_bound();
        let entry = self.slot.index.last().cloned();
        Ok(self.land(entry))
    }

    fn move_next(&mut self) -> Result<bool> {
        let Some(current) = self.current.as_ref() else {
            return Ok(false);
        };
        let next = self
            .slot
            .index
            .next_after(current)
            .filter(|e| self.within_bounds(e))
            .cloned();
        Ok(self.land(next))
    }

    fn move_previous(&mut self) -> Result<bool> {
        let Some(current) = self.current.as_ref() else {
            return Ok(false);
        };
        let prev = self
            .slot
            .index
            .prev_before(current)
            .filter(|e| self.within_bounds(e))
            .cloned();
        Ok(self.land(prev))
    }

    fn current_bookmark(&self) -> Result<Bookmark> {
        Ok(self.current_entry()?.bookmark.clone())
    }

    fn goto_bookmark(&mut self, bookmark: &Bookmark) -> Result<bool> {
        self.clear_scan_bound();
        let entry = self.store.entries_for(self.slot, bookmark)?.into_iter().next();
        if entry.is_none() {
            tracing::trace!(index = self.current_index(), ?bookmark, "bookmark has no entry");
        }
        Ok(self.land(entry))
    }

    fn goto_bookmark_within(
        &mut self,
        bookmark: &Bookmark,
        start: Option<&Key>,
        end: Option<&Key>,
        mode: SeekMode,
    ) -> Result<bool> {
        self.clear_scan_bound();
        let mut in_range = self
            .store
            .entries_for(self.slot, bookmark)?
            .into_iter()
            .filter(|e| start.map_or(true, |s| &e.key >= s) && end.map_or(true, |k| &e.key <= k));
        let entry = match mode {
            SeekMode::GreaterOrEqual => in_range.next(),
            SeekMode::LessOrEqual => in_range.last(),
        };
        if entry.is_none() {
            tracing::trace!(index = self.current_index(), ?bookmark, "bookmark has no entry in range");
        }
        Ok(self.land(entry))
    }

    fn current_key(&self) -> Result<Key> {
        Ok(self.current_entry()?.key.clone())
    }

    fn goto_position(&mut self, numerator: u64, denominator: u64) -> Result<bool> {
        self.clear_scan_bound();
        let total = self.slot.index.len() as u64;
        if total == 0 || denominator == 0 {
            self.current = None;
            return Ok(false);
        }
        let n = ((total as u128 * numerator as u128) / denominator as u128) as u64;
        let entry = self.slot.index.nth(n.min(total - 1) as usize).cloned();
        Ok(self.land(entry))
    }

    fn record_position(&self) -> Result<RecordPosition> {
        let entry = self.current_entry()?;
        Ok(RecordPosition {
            entries_before: self.slot.index.rank(entry) as u64,
            entries_total: self.slot.index.len() as u64,
        })
    }
}
