//! Duplicate suppression for multi-entry indices.

use hashbrown::HashSet;
use keyscan_index::Bookmark;

/// The bookmarks a scan has already returned.
///
/// Tuple indices and indices over multi-valued columns hold several entries
/// per record; a scan over them consults this set to return each record
/// once. Bookmarks compare and hash by their bytes.
#[derive(Clone, Debug, Default)]
pub struct UniqueBookmarks {
    seen: HashSet<Bookmark>,
}

impl UniqueBookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `bookmark`, returning true the first time it is seen.
    pub fn insert(&mut self, bookmark: &Bookmark) -> bool {
        if self.seen.contains(bookmark) {
            false
        } else {
            self.seen.insert(bookmark.clone())
        }
    }

    pub fn contains(&self, bookmark: &Bookmark) -> bool {
        self.seen.contains(bookmark)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forgets every bookmark.
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
