//! Record bookmarks.

use alloc::vec::Vec;
use core::fmt;

/// An opaque identifier for a stored record.
///
/// Two bookmarks are equal exactly when they name the same record.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bookmark(Vec<u8>);

impl Bookmark {
    /// Wraps raw bookmark bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Builds a bookmark from an insertion sequence number.
    pub fn from_sequence(seq: u64) -> Self {
        Self(seq.to_be_bytes().to_vec())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bookmark(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}
