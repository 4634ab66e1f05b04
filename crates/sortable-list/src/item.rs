#![forbid(unsafe_code)]

//! Stable item identifiers.

use std::fmt;

/// Opaque, stable identifier of a list item.
///
/// Assigned once when the item is created and never reassigned by
/// reordering. It keys the order model, the selection, and the per-item
/// gesture classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Index into per-item arenas.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ItemId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Convert raw integers to ids, for tests and fixtures.
#[must_use]
pub fn ids(raw: &[u32]) -> Vec<ItemId> {
    raw.iter().copied().map(ItemId).collect()
}
