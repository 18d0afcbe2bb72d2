// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

/// A single move, from an index in the old list to an index in the new list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveIndex {
    /// Index in the old list.
    pub from: usize,
    /// Index in the new list.
    pub to: usize,
}

impl MoveIndex {
    /// Create a new move.
    #[must_use]
    pub const fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// The edit between an old and a new list, as computed by [`diff`](crate::diff).
///
/// Insertions and deletions live in different coordinate spaces: insertions are
/// indices into the new list, deletions (and updates) are indices into the old list.
///
/// An item can be both updated *and* moved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Indices in the new list of items with no counterpart in the old list.
    pub inserts: BTreeSet<usize>,
    /// Indices in the old list of items with no counterpart in the new list.
    pub deletes: BTreeSet<usize>,
    /// Indices in the old list of matched items whose content changed.
    pub updates: BTreeSet<usize>,
    /// Matched items whose position isn't explained by the insertions and deletions.
    pub moves: Vec<MoveIndex>,
    pub(crate) old_to_new: Vec<Option<usize>>,
    pub(crate) new_to_old: Vec<Option<usize>>,
}

impl DiffResult {
    /// Whether applying this result would change anything at all.
    pub fn has_changes(&self) -> bool {
        !(self.inserts.is_empty()
            && self.deletes.is_empty()
            && self.updates.is_empty()
            && self.moves.is_empty())
    }

    /// Total number of changes of all kinds.
    pub fn change_count(&self) -> usize {
        self.inserts.len() + self.deletes.len() + self.updates.len() + self.moves.len()
    }

    /// Checks `old_len + inserts - deletes == new_len`.
    ///
    /// This always holds for results produced by this crate.
    pub fn validate(&self, old_len: usize, new_len: usize) -> bool {
        old_len + self.inserts.len() == new_len + self.deletes.len()
    }

    /// The index in the old list matched with the item at `new_index`.
    ///
    /// Returns `None` if that item was inserted, or if `new_index` is out of bounds.
    pub fn old_index_for(&self, new_index: usize) -> Option<usize> {
        self.new_to_old.get(new_index).copied().flatten()
    }

    /// The index in the new list matched with the item at `old_index`.
    ///
    /// Returns `None` if that item was deleted, or if `old_index` is out of bounds.
    pub fn new_index_for(&self, old_index: usize) -> Option<usize> {
        self.old_to_new.get(old_index).copied().flatten()
    }

    /// The length of the old list this result was computed from.
    pub fn old_len(&self) -> usize {
        self.old_to_new.len()
    }

    /// The length of the new list this result was computed from.
    pub fn new_len(&self) -> usize {
        self.new_to_old.len()
    }
}
