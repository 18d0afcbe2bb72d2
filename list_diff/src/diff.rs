// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use alloc::borrow::Cow;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::{DiffResult, Diffable, MoveIndex};

/// Per-identifier bookkeeping in the symbol table.
#[derive(Default)]
struct Entry {
    /// Occurrences of the identifier in the old list.
    old_count: usize,
    /// Occurrences of the identifier in the new list.
    new_count: usize,
    /// Pending old indices. `None` is the placeholder pushed for each new occurrence.
    old_indices: SmallVec<[Option<usize>; 4]>,
    /// Set if any matched pair with this identifier compared unequal.
    updated: bool,
}

impl Entry {
    fn occurs_on_both_sides(&self) -> bool {
        self.old_count > 0 && self.new_count > 0
    }
}

#[derive(Copy, Clone)]
struct Record {
    entry: usize,
    /// The matched index in the opposite list.
    index: Option<usize>,
}

/// Diff two lists of [`Diffable`] items.
///
/// `is_equal` is called with `(old, new)` for every matched pair, and decides
/// whether that pair is reported as an update.
///
/// See the [crate level docs](crate) for the shape of the result.
pub fn diff<T: Diffable>(
    old: &[T],
    new: &[T],
    is_equal: impl FnMut(&T, &T) -> bool,
) -> DiffResult {
    diff_by(old, new, T::diff_identifier, T::diff_identifier, is_equal)
}

/// Diff two lists using [`PartialEq`] as the content equality.
pub fn diff_eq<T: Diffable + PartialEq>(old: &[T], new: &[T]) -> DiffResult {
    diff(old, new, |old, new| old == new)
}

/// Diff two lists of possibly different item types, with explicit identifier functions.
///
/// This is the most general form of [`diff`], used when the old list is a retained
/// representation of the new one rather than a value of the same type.
pub fn diff_by<'a, O, N>(
    old: &'a [O],
    new: &'a [N],
    mut old_identifier: impl FnMut(&'a O) -> Cow<'a, str>,
    mut new_identifier: impl FnMut(&'a N) -> Cow<'a, str>,
    mut is_equal: impl FnMut(&O, &N) -> bool,
) -> DiffResult {
    let mut table: HashMap<Cow<'a, str>, usize> = HashMap::with_capacity(old.len());
    let mut entries: Vec<Entry> = Vec::with_capacity(old.len().max(new.len()));

    let mut lookup = |identifier: Cow<'a, str>, entries: &mut Vec<Entry>| -> usize {
        *table.entry(identifier).or_insert_with(|| {
            entries.push(Entry::default());
            entries.len() - 1
        })
    };

    // Pass 1: an entry for every item in the new list, with a placeholder for each occurrence.
    let mut new_records: Vec<Record> = new
        .iter()
        .map(|item| {
            let entry = lookup(new_identifier(item), &mut entries);
            let slot = &mut entries[entry];
            slot.new_count += 1;
            slot.old_indices.push(None);
            Record { entry, index: None }
        })
        .collect();

    // Pass 2: the old list, back to front, so that popping the stacks yields ascending indices.
    let mut old_records = vec![
        Record {
            entry: 0,
            index: None
        };
        old.len()
    ];
    for (i, item) in old.iter().enumerate().rev() {
        let entry = lookup(old_identifier(item), &mut entries);
        let slot = &mut entries[entry];
        slot.old_count += 1;
        slot.old_indices.push(Some(i));
        old_records[i].entry = entry;
    }

    // Pass 3: pair up items which occur on both sides.
    for (i, record) in new_records.iter_mut().enumerate() {
        let entry = &mut entries[record.entry];
        if !entry.occurs_on_both_sides() {
            continue;
        }
        let popped = entry.old_indices.pop();
        debug_assert!(
            popped.is_some(),
            "Old index stack exhausted while matching new item {i}"
        );
        // A placeholder means every old occurrence has already been claimed.
        let Some(Some(old_index)) = popped else {
            continue;
        };
        if !is_equal(&old[old_index], &new[i]) {
            entry.updated = true;
        }
        record.index = Some(old_index);
        old_records[old_index].index = Some(i);
    }

    let mut result = DiffResult {
        old_to_new: old_records.iter().map(|record| record.index).collect(),
        new_to_old: new_records.iter().map(|record| record.index).collect(),
        ..DiffResult::default()
    };

    // Deletions, tracking how many deletions precede each old index.
    let mut running_offset = 0;
    let delete_offsets: Vec<usize> = old_records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let offset = running_offset;
            if record.index.is_none() {
                result.deletes.insert(i);
                running_offset += 1;
            }
            offset
        })
        .collect();

    // Insertions, updates and moves.
    let mut insert_offset = 0;
    for (i, record) in new_records.iter().enumerate() {
        let Some(old_index) = record.index else {
            result.inserts.insert(i);
            insert_offset += 1;
            continue;
        };
        if entries[record.entry].updated {
            result.updates.insert(old_index);
        }
        let expected = old_index - delete_offsets[old_index] + insert_offset;
        if expected != i {
            result.moves.push(MoveIndex::new(old_index, i));
        }
    }

    debug_assert!(
        result.validate(old.len(), new.len()),
        "Diff post-condition violated: {} old + {} inserts - {} deletes != {} new",
        old.len(),
        result.inserts.len(),
        result.deletes.len(),
        new.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(set: &alloc::collections::BTreeSet<usize>) -> Vec<usize> {
        set.iter().copied().collect()
    }

    #[test]
    fn identical_lists_have_no_changes() {
        let list = ["a", "b", "c"];
        let result = diff_eq(&list, &list);
        assert!(!result.has_changes());
        assert_eq!(result.old_index_for(2), Some(2));
        assert_eq!(result.new_index_for(0), Some(0));
    }

    #[test]
    fn empty_to_full_inserts_everything() {
        let result = diff_eq(&[] as &[&str], &["a", "b"]);
        assert_eq!(indices(&result.inserts), [0, 1]);
        assert!(result.deletes.is_empty());
        assert!(result.moves.is_empty());
    }

    #[test]
    fn full_to_empty_deletes_everything() {
        let result = diff_eq(&["a", "b"], &[] as &[&str]);
        assert_eq!(indices(&result.deletes), [0, 1]);
        assert!(result.inserts.is_empty());
        assert_eq!(result.new_index_for(1), None);
    }

    #[test]
    fn insertion_and_deletion_do_not_produce_moves() {
        let result = diff_eq(&["a", "b", "c"], &["x", "a", "c"]);
        assert_eq!(indices(&result.inserts), [0]);
        assert_eq!(indices(&result.deletes), [1]);
        assert!(result.moves.is_empty());
        assert_eq!(result.old_index_for(2), Some(2));
    }

    #[test]
    fn update_is_keyed_by_old_index() {
        #[derive(Debug)]
        struct Item(&'static str, u32);
        impl Diffable for Item {
            fn diff_identifier(&self) -> Cow<'_, str> {
                Cow::Borrowed(self.0)
            }
        }

        let old = [Item("a", 0), Item("b", 0)];
        let new = [Item("b", 1), Item("a", 0)];
        let result = diff(&old, &new, |old, new| old.1 == new.1);
        assert_eq!(indices(&result.updates), [1]);
        assert!(result.inserts.is_empty());
        assert!(result.deletes.is_empty());
        assert!(result.moves.contains(&MoveIndex::new(1, 0)));
    }

    #[test]
    fn different_item_types() {
        let old = [1_u32, 2, 3];
        let new = ["3", "1"];
        let result = diff_by(
            &old,
            &new,
            |item| Cow::Owned(alloc::format!("{item}")),
            |item| Cow::Borrowed(*item),
            |_, _| true,
        );
        assert_eq!(indices(&result.deletes), [1]);
        assert_eq!(result.old_index_for(0), Some(2));
        assert_eq!(result.old_index_for(1), Some(0));
    }
}
