// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Keyed list diffing.
//!
//! This crate computes the edit which turns one ordered list into another, where
//! every item exposes a stable string identity (its [diff identifier](Diffable)).
//! Items with equal identifiers in the two lists are considered "the same logical item";
//! a caller supplied equality predicate decides whether such a pair has changed content.
//!
//! The result of [`diff`] is a [`DiffResult`], containing:
//!
//! - the insertions, as indices into the new list,
//! - the deletions, as indices into the old list,
//! - the updates (same identity, unequal content), as indices into the old list,
//! - the moves, as `(old index, new index)` pairs.
//!
//! The algorithm is the three-pass symbol table diff popularised by `IGListKit`.
//! It runs in `O(n + m)` expected time: every identifier is hashed exactly once per
//! occurrence, and there is never any pairwise comparison between the lists.
//!
//! Duplicate identifiers are permitted. They are paired strictly first-in first-out:
//! the k-th occurrence of an identifier in the old list is matched with the k-th
//! occurrence of that identifier in the new list.
//!
//! ```
//! use list_diff::{MoveIndex, diff_eq};
//!
//! let result = diff_eq(&["a", "b", "c"], &["b", "a", "c", "d"]);
//! assert_eq!(result.inserts.iter().copied().collect::<Vec<_>>(), [3]);
//! assert!(result.deletes.is_empty());
//! assert!(result.moves.contains(&MoveIndex { from: 0, to: 1 }));
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]
// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
extern crate alloc;

// Used by integration tests only.
#[cfg(test)]
use proptest as _;

mod diff;
mod diffable;
mod result;

pub use diff::{diff, diff_by, diff_eq};
pub use diffable::Diffable;
pub use result::{DiffResult, MoveIndex};
