#![forbid(unsafe_code)]

//! Canonical ordering of item identifiers with pivot-relative bulk moves.
//!
//! [`OrderModel`] owns the logical sequence of a list. Positions are served
//! from a lazily rebuilt index: every mutation of the sequence invalidates it
//! and the next read rebuilds it, so a position read always agrees with the
//! sequence at that moment.
//!
//! # Invariants
//!
//! 1. Every identifier appears exactly once in the sequence.
//! 2. [`OrderModel::relocate`] produces a permutation of the previous
//!    sequence: ids outside the moved set keep their relative order, and the
//!    moved set lands contiguously next to the target, in the order given.
//! 3. `position(id)` equals the zero-based offset of `id` in the current
//!    sequence.
//!
//! # Example
//!
//! ```
//! use sortable_list::item::{ItemId, ids};
//! use sortable_list::order::OrderModel;
//!
//! let mut order = OrderModel::sequential(5);
//! // Drag [1, 2] down onto 3, starting from 1.
//! order
//!     .relocate_relative_to_pivot(&ids(&[1, 2]), ItemId(3), ItemId(1))
//!     .unwrap();
//! assert_eq!(order.ids(), ids(&[0, 3, 1, 2, 4]).as_slice());
//! ```

use std::cell::OnceCell;
use std::fmt;

use ahash::{AHashMap, AHashSet};

use crate::item::ItemId;

/// Which side of the target the moved ids are placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertMode {
    Before,
    After,
}

/// Errors from order model lookups and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The identifier is not part of the sequence.
    NotFound(ItemId),
    /// The identifier appears twice in a sequence or a moved set.
    Duplicate(ItemId),
    /// The relocation target is itself one of the moved ids.
    TargetInSource(ItemId),
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "item {id} not found"),
            Self::Duplicate(id) => write!(f, "item {id} appears more than once"),
            Self::TargetInSource(id) => {
                write!(f, "relocation target {id} is one of the moved items")
            }
        }
    }
}

impl std::error::Error for OrderError {}

/// Ordered sequence of item identifiers with a cached position index.
#[derive(Debug, Clone, Default)]
pub struct OrderModel {
    ids: Vec<ItemId>,
    /// Empty while dirty; filled on the first read after a mutation.
    positions: OnceCell<AHashMap<ItemId, usize>>,
}

impl OrderModel {
    /// Build from an explicit sequence. Fails on a repeated id.
    pub fn new(ids: Vec<ItemId>) -> Result<Self, OrderError> {
        let mut seen = AHashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(*id) {
                return Err(OrderError::Duplicate(*id));
            }
        }
        Ok(Self {
            ids,
            positions: OnceCell::new(),
        })
    }

    /// Sequence `0..len`, the ids a list assigns to its initial items.
    #[must_use]
    pub fn sequential(len: usize) -> Self {
        Self {
            ids: (0..len as u32).map(ItemId).collect(),
            positions: OnceCell::new(),
        }
    }

    /// The current sequence.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
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

    /// Whether `id` is part of the sequence.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index().contains_key(&id)
    }

    /// Whether the position index is current (no mutation since last read).
    #[inline]
    #[must_use]
    pub fn is_index_fresh(&self) -> bool {
        self.positions.get().is_some()
    }

    /// Zero-based offset of `id`.
    pub fn position(&self, id: ItemId) -> Result<usize, OrderError> {
        self.index()
            .get(&id)
            .copied()
            .ok_or(OrderError::NotFound(id))
    }

    /// The run of ids from the first `start` through the first `end` after
    /// it, inclusive, in sequence order.
    ///
    /// Returns an empty run if `start` is absent. If `end` does not occur at
    /// or after `start`, the run extends to the end of the sequence; callers
    /// that need a bounded run order the pair by position first.
    #[must_use]
    pub fn range(&self, start: ItemId, end: ItemId) -> Vec<ItemId> {
        let Some(from) = self.ids.iter().position(|id| *id == start) else {
            return Vec::new();
        };
        let tail = &self.ids[from..];
        match tail.iter().position(|id| *id == end) {
            Some(len) => tail[..=len].to_vec(),
            None => tail.to_vec(),
        }
    }

    /// Move `source` as one block next to `target`.
    ///
    /// Scans the sequence once, skipping every id in `source`; where `target`
    /// is met, emits `[source.., target]` for [`InsertMode::Before`] or
    /// `[target, source..]` for [`InsertMode::After`]. The block keeps the
    /// order of `source` as given, not the sequence's prior order.
    ///
    /// Every id must be present, `source` must not repeat an id, and `target`
    /// must not be in `source`; otherwise the sequence is left untouched.
    pub fn relocate(
        &mut self,
        source: &[ItemId],
        target: ItemId,
        mode: InsertMode,
    ) -> Result<(), OrderError> {
        self.position(target)?;
        let mut moving = AHashSet::with_capacity(source.len());
        for id in source {
            self.position(*id)?;
            if *id == target {
                return Err(OrderError::TargetInSource(target));
            }
            if !moving.insert(*id) {
                return Err(OrderError::Duplicate(*id));
            }
        }

        let mut result = Vec::with_capacity(self.ids.len());
        for id in &self.ids {
            if moving.contains(id) {
                continue;
            }
            if *id == target {
                match mode {
                    InsertMode::Before => {
                        result.extend_from_slice(source);
                        result.push(target);
                    }
                    InsertMode::After => {
                        result.push(target);
                        result.extend_from_slice(source);
                    }
                }
                continue;
            }
            result.push(*id);
        }

        self.replace(result);
        Ok(())
    }

    /// Move `source` next to `target`, on the side facing away from `pivot`.
    ///
    /// Places the block after `target` when `target` sits after `pivot`,
    /// before it otherwise. Returns the mode used.
    pub fn relocate_relative_to_pivot(
        &mut self,
        source: &[ItemId],
        target: ItemId,
        pivot: ItemId,
    ) -> Result<InsertMode, OrderError> {
        let target_pos = self.position(target)?;
        let pivot_pos = self.position(pivot)?;
        let mode = if target_pos > pivot_pos {
            InsertMode::After
        } else {
            InsertMode::Before
        };
        self.relocate(source, target, mode)?;
        Ok(mode)
    }

    /// Sort `ids` by their current position.
    pub fn sort_by_position(&self, ids: &mut [ItemId]) -> Result<(), OrderError> {
        let index = self.index();
        for id in ids.iter() {
            if !index.contains_key(id) {
                return Err(OrderError::NotFound(*id));
            }
        }
        ids.sort_by_key(|id| index[id]);
        Ok(())
    }

    fn replace(&mut self, ids: Vec<ItemId>) {
        self.ids = ids;
        self.positions = OnceCell::new();
    }

    fn index(&self) -> &AHashMap<ItemId, usize> {
        self.positions.get_or_init(|| {
            self.ids
                .iter()
                .enumerate()
                .map(|(pos, id)| (*id, pos))
                .collect()
        })
    }
}
