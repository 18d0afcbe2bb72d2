// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Headless tooling for testing [`render_core`] hierarchies.
//!
//! The primary type from this crate is [`TestHarness`], which mounts a tree into a
//! [`RecordingBackend`] and runs passes on demand.
//!
//! The recording backend keeps its elements in memory, and records every call the
//! reconciler makes as a [`Record`], so tests can assert exactly which mutations a pass
//! performed. It also checks the invariants the reconciler promises, and panics if one
//! is broken.
//!
//! ```
//! use render_testing::{Record, TestHarness, label, stack};
//!
//! let harness = TestHarness::create(|_| stack().with_child(label("Hello")));
//! let creates = harness
//!     .recording()
//!     .count(|record| matches!(record, Record::Create { .. }));
//! assert_eq!(creates, 2);
//! ```

#![expect(missing_debug_implementations, reason = "Deferred: Noisy")]

mod assert_debug_panics;
mod backend;
mod harness;
mod layout;
mod nodes;

pub use assert_debug_panics::assert_debug_panics_inner;
pub use backend::{ElementId, Record, Recording, RecordingBackend, TestBackendError, TestElement};
pub use harness::{DEFAULT_SIZE, TestHarness};
pub use layout::{FixedLayout, TestLayout};
pub use nodes::{TestNode, button, label, scroll, stack, table};
