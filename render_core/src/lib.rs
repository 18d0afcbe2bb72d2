// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Declarative node trees, reconciled against a retained hierarchy of backing elements.
//!
//! An app describes the element tree it wants as a tree of [`Node`]s, built fresh on every
//! render pass with a small builder DSL.
//! The [`Reconciler`] compares that tree against the [`RetainedNode`] tree from the previous
//! pass, and applies the minimal set of mutations to the live hierarchy through a [`Backend`]:
//!
//! - Sibling groups are diffed with [`list_diff`], using each node's key (folded together with
//!   its reuse identifier) as its identity.
//! - Matched nodes keep their backing element, and are only reconfigured if their props changed.
//! - Nodes whose reuse identifier changed are always torn down and recreated.
//! - Reordered nodes are moved, never rebuilt.
//!
//! Geometry is delegated to an external [`LayoutEngine`], and scrolling containers are given
//! a content size once per pass through [`Backend::adjust_content_size`].
//!
//! Most apps won't drive the reconciler directly, but will use a [`Hierarchy`], which owns the
//! retained tree between passes, coalesces invalidation requests and keeps the per-key
//! [state registry](StateRegistry) used by [`Component`]s.
//!
//! ```
//! # use render_core::{Backend, Node};
//! fn list<B: Backend>(items: &[&str]) -> Node<B> {
//!     Node::new("List").with_unique_keys().with_children(
//!         items
//!             .iter()
//!             .map(|item| Node::new("Label").with_key(*item).with_props(item.to_string())),
//!     )
//! }
//! ```
//!
//! All of this is single threaded: nodes, retained trees and hierarchies are neither `Send`
//! nor `Sync`, and live on the thread which owns the backing hierarchy.

#![forbid(unsafe_code)]
// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![expect(clippy::missing_errors_doc, reason = "Can be quite noisy?")]

// Used by integration tests and examples only.
#[cfg(test)]
use assert_matches as _;
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use render_testing as _;

pub use hashbrown;
pub use kurbo;
pub use list_diff;

mod util;

mod backend;
pub use backend::{Backend, LayoutEngine, content_size_from_frames};

mod error;
pub use error::ReconcileError;

mod props;
pub use props::{Describe, Props};

mod slot;
pub use slot::OutputSlot;

mod node;
pub use node::Node;

mod retained;
pub use retained::RetainedNode;

mod inspector;
pub use inspector::{FrameDescription, NodeDescription};

mod reconciler;
pub use reconciler::{ReconcileReport, Reconciler, ReconcilerOptions};

mod registry;
pub use registry::StateRegistry;

mod component;
pub use component::{Capabilities, Component, RenderCtx, StateHandle};

mod hierarchy;
pub use hierarchy::{Hierarchy, InvalidationHandle, Pending};

pub mod tracing_backend;
