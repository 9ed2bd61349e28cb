//! Bookmark iteration over a filter.

use crate::error::{FilterError, Result};
use crate::filter::Filter;
use crate::unique::UniqueBookmarks;
use keyscan_index::{Bookmark, Cursor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Pending,
    Positioned,
    Done,
}

/// Iterates the bookmarks of the records a filter selects, in scan order.
///
/// The scan owns the cursor borrow for its lifetime. When the filter is
/// marked distinct, records with several matching entries are returned once.
/// A cursor error ends the scan after it is yielded.
pub struct Scan<'f, 'c, C: Cursor> {
    filter: &'f Filter,
    cursor: &'c mut C,
    state: ScanState,
    resume: Option<Bookmark>,
    unique: Option<UniqueBookmarks>,
}

impl<'f, 'c, C: Cursor> Scan<'f, 'c, C> {
    pub(crate) fn new(filter: &'f Filter, cursor: &'c mut C) -> Self {
        Self {
            filter,
            cursor,
            state: ScanState::Pending,
            resume: None,
            unique: filter.is_distinct().then(UniqueBookmarks::new),
        }
    }

    /// Starts at `bookmark` instead of the first matching entry. The
    /// bookmarked record is returned first if it still matches.
    pub fn resume_from(mut self, bookmark: Bookmark) -> Self {
        self.resume = Some(bookmark);
        self
    }

    /// Returns the underlying cursor, positioned on the last returned entry.
    pub fn cursor(&mut self) -> &mut C {
        self.cursor
    }

    fn step(&mut self) -> Result<bool> {
        match self.state {
            ScanState::Pending => {
                self.state = ScanState::Positioned;
                match self.resume.take() {
                    Some(bookmark) => self.filter.apply_from_bookmark(self.cursor, &bookmark),
                    None => self.filter.apply_from_start(self.cursor),
                }
            }
            ScanState::Positioned if self.filter.is_reversed() => {
                Ok(self.cursor.move_previous()?)
            }
            ScanState::Positioned => Ok(self.cursor.move_next()?),
            ScanState::Done => Ok(false),
        }
    }
}

impl<'f, 'c, C: Cursor> Iterator for Scan<'f, 'c, C> {
    type Item = core::result::Result<Bookmark, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => {
                    self.state = ScanState::Done;
                    return None;
                }
                Err(e) => {
                    self.state = ScanState::Done;
                    return Some(Err(e));
                }
            }

            let bookmark = match self.cursor.current_bookmark() {
                Ok(b) => b,
                Err(e) => {
                    self.state = ScanState::Done;
                    return Some(Err(e.into()));
                }
            };
            if let Some(seen) = self.unique.as_mut() {
                if !seen.insert(&bookmark) {
                    tracing::trace!(?bookmark, "skipping repeated record");
                    continue;
                }
            }
            return Some(Ok(bookmark));
        }
    }
}
