#![forbid(unsafe_code)]

//! The set of items selected for a group drag.

use crate::item::ItemId;
use crate::order::{OrderError, OrderModel};

/// Items currently selected, in the order they were selected.
///
/// Insertion order carries no meaning for a drag; read the set through
/// [`Selection::sorted`] to get it in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ItemId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id`. Returns `false` if it was already selected.
    pub fn insert(&mut self, id: ItemId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`. Returns `false` if it was not selected.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| *selected != id);
        self.ids.len() != before
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in selection order.
    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    /// Selected ids sorted by their current position in `order`.
    pub fn sorted(&self, order: &OrderModel) -> Result<Vec<ItemId>, OrderError> {
        let mut ids = self.ids.clone();
        order.sort_by_position(&mut ids)?;
        Ok(ids)
    }

    /// Empty the selection, returning what was selected.
    pub fn drain(&mut self) -> Vec<ItemId> {
        std::mem::take(&mut self.ids)
    }
}
