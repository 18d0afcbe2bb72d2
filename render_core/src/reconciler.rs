// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fmt;

use hashbrown::HashSet;
use kurbo::{Rect, Size};
use list_diff::{MoveIndex, diff_by};
use smallvec::SmallVec;
use tracing::{debug, info_span, trace, warn};
use web_time::{Duration, Instant};

use crate::node::NodeSpec;
use crate::props::props_equal;
use crate::{Backend, LayoutEngine, Node, ReconcileError, RetainedNode};

/// Tuning for a [`Reconciler`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerOptions {
    /// Passes slower than this are logged as warnings.
    ///
    /// Defaults to 16ms, one frame at 60fps.
    pub slow_pass_threshold: Duration,
    /// The default [reload threshold](Node::with_max_diff_updates) for every container.
    ///
    /// Defaults to `None`, meaning children are always patched.
    pub max_diff_updates: Option<usize>,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            slow_pass_threshold: Duration::from_millis(16),
            max_diff_updates: None,
        }
    }
}

impl ReconcilerOptions {
    /// Builder-style method to set the [`slow_pass_threshold`](Self::slow_pass_threshold).
    pub fn with_slow_pass_threshold(mut self, threshold: Duration) -> Self {
        self.slow_pass_threshold = threshold;
        self
    }

    /// Builder-style method to set the [`max_diff_updates`](Self::max_diff_updates).
    pub fn with_max_diff_updates(mut self, threshold: usize) -> Self {
        self.max_diff_updates = Some(threshold);
        self
    }
}

/// What a single pass did to the backing hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Elements created.
    pub created: usize,
    /// Elements destroyed.
    pub destroyed: usize,
    /// Configuration closures run.
    pub configured: usize,
    /// Subtrees mounted into an existing container.
    pub inserted: usize,
    /// Subtrees removed from an existing container.
    pub deleted: usize,
    /// Children moved by [`Backend::reorder`].
    pub moved: usize,
    /// Containers whose children were remounted because a diff exceeded the reload threshold.
    pub reloaded_containers: usize,
    /// The effective keys of nodes whose frame changed size.
    pub keys_with_mutated_size: Vec<String>,
    /// Wall time spent in the pass.
    pub elapsed: Duration,
}

impl ReconcileReport {
    /// Whether any element was reordered.
    pub fn reordered(&self) -> bool {
        self.moved > 0
    }

    /// Whether a node's size changed, so that anything measured from this tree is stale.
    pub fn must_invalidate_layout(&self) -> bool {
        !self.keys_with_mutated_size.is_empty()
    }
}

/// Applies node trees to a [`Backend`].
///
/// See the [crate level docs](crate) for an overview.
pub struct Reconciler<B: Backend, L> {
    backend: B,
    layout: L,
    options: ReconcilerOptions,
    last_report: ReconcileReport,
}

/// A non-nil node about to be reconciled, with its identity among its siblings.
struct NewChild<B: Backend> {
    identity: String,
    effective_key: String,
    spec: NodeSpec<B>,
    children: Vec<Node<B>>,
}

impl<B: Backend> NewChild<B> {
    fn from_node(node: Node<B>, slot: usize) -> Option<Self> {
        let Node { spec, children } = node;
        let spec = spec?;
        Some(Self {
            identity: spec.diff_identifier(slot),
            effective_key: spec.effective_key(slot),
            spec,
            children,
        })
    }
}

/// State accumulated over one pass.
struct Pass<B: Backend> {
    report: ReconcileReport,
    /// Scrolling containers and their children's frames, for the content size hooks.
    scrolling: Vec<(B::Element, SmallVec<[Rect; 8]>)>,
}

impl<B: Backend> Pass<B> {
    fn new() -> Self {
        Self {
            report: ReconcileReport::default(),
            scrolling: Vec::new(),
        }
    }
}

/// Drop nil markers, and check the key requirements of `parent`.
///
/// Slots count nil markers, so that the synthetic keys of later siblings don't depend
/// on whether a conditional child is present.
fn prepare_children<B: Backend>(parent: &NodeSpec<B>, children: Vec<Node<B>>) -> Vec<NewChild<B>> {
    let children: Vec<_> = children
        .into_iter()
        .enumerate()
        .filter_map(|(slot, child)| NewChild::from_node(child, slot))
        .collect();
    if parent.unique_keys {
        let mut seen = HashSet::with_capacity(children.len());
        for child in &children {
            let Some(key) = child.spec.key.as_deref() else {
                panic!(
                    "Child `{}` of `{}` has no key, but `{}` requires unique keys",
                    child.effective_key, parent.reuse_identifier, parent.reuse_identifier,
                );
            };
            if !seen.insert(key) {
                panic!(
                    "Duplicate key `{key}` (reuse identifier `{}`) among the children of `{}`, which requires unique keys",
                    child.spec.reuse_identifier, parent.reuse_identifier,
                );
            }
        }
    }
    children
}

impl<B: Backend, L: LayoutEngine<B::LayoutSpec>> Reconciler<B, L> {
    /// Create a reconciler driving `backend`, with geometry from `layout`.
    pub fn new(backend: B, layout: L) -> Self {
        Self {
            backend,
            layout,
            options: ReconcilerOptions::default(),
            last_report: ReconcileReport::default(),
        }
    }

    /// Builder-style method to set the options.
    pub fn with_options(mut self, options: ReconcilerOptions) -> Self {
        self.options = options;
        self
    }

    /// The options.
    pub fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: ReconcilerOptions) {
        self.options = options;
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Mutable access to the layout engine, e.g. to clear its caches.
    pub fn layout_engine_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    /// The report of the most recent pass (including layout-only passes).
    pub fn last_report(&self) -> &ReconcileReport {
        &self.last_report
    }

    /// Make the hierarchy under `container` match `new`.
    ///
    /// `old` is the retained tree returned by the previous pass over `container`, or `None`
    /// for the first pass. The root element is the child at index 0 of `container`.
    ///
    /// # Panics
    ///
    /// If `new` is a nil marker, or a container which [requires unique
    /// keys](Node::with_unique_keys) has a child without a key or two children with the
    /// same key.
    ///
    /// # Errors
    ///
    /// If the backend fails to create an element. The pass isn't rolled back: `old` is
    /// consumed, and the elements under `container` are left in an unspecified state.
    pub fn reconcile(
        &mut self,
        old: Option<RetainedNode<B>>,
        new: Node<B>,
        container: &B::Element,
        constraint: Size,
    ) -> Result<RetainedNode<B>, ReconcileError<B::Error>> {
        let _span = info_span!("reconcile").entered();
        let start = Instant::now();
        let mut pass = Pass::new();

        let Some(new) = NewChild::from_node(new, 0) else {
            panic!("The root of a node tree can't be a nil node");
        };
        let mut root = match old {
            Some(old) => self.reconcile_node(&mut pass, old, new, container, 0)?,
            None => self.mount(&mut pass, new, container, 0)?,
        };
        self.layout_node(&mut pass, &mut root, constraint);

        self.finish(pass, start, "reconciliation");
        Ok(root)
    }

    /// Re-run layout over `root` without rebuilding anything.
    ///
    /// Frames are only applied where they changed, and the content size hooks run as in
    /// a full pass.
    pub fn relayout(&mut self, root: &mut RetainedNode<B>, constraint: Size) -> &ReconcileReport {
        let _span = info_span!("relayout").entered();
        let start = Instant::now();
        let mut pass = Pass::new();
        self.layout_node(&mut pass, root, constraint);
        self.finish(pass, start, "relayout");
        &self.last_report
    }

    /// Detach `root` from `container`, and destroy every element of the tree.
    pub fn unmount(&mut self, root: RetainedNode<B>, container: &B::Element) -> &ReconcileReport {
        let _span = info_span!("unmount").entered();
        let start = Instant::now();
        let mut pass = Pass::new();
        self.unmount_child(&mut pass, root, container);
        self.finish(pass, start, "unmount");
        &self.last_report
    }

    fn finish(&mut self, mut pass: Pass<B>, start: Instant, kind: &str) {
        // Content sizes are always adjusted last.
        for (container, frames) in &pass.scrolling {
            trace!(?container, children = frames.len(), "adjust content size");
            self.backend.adjust_content_size(container, frames);
        }

        pass.report.elapsed = start.elapsed();
        let report = pass.report;
        debug!(
            created = report.created,
            destroyed = report.destroyed,
            configured = report.configured,
            inserted = report.inserted,
            deleted = report.deleted,
            moved = report.moved,
            elapsed = ?report.elapsed,
            "{kind} pass finished"
        );
        if report.elapsed > self.options.slow_pass_threshold {
            warn!(
                elapsed = ?report.elapsed,
                threshold = ?self.options.slow_pass_threshold,
                "Slow {kind} pass"
            );
        }
        self.last_report = report;
    }

    /// Create the element for `new` and its whole subtree, and attach it at `index` in `container`.
    fn mount(
        &mut self,
        pass: &mut Pass<B>,
        new: NewChild<B>,
        container: &B::Element,
        index: usize,
    ) -> Result<RetainedNode<B>, ReconcileError<B::Error>> {
        let NewChild {
            identity,
            effective_key,
            spec,
            children,
        } = new;

        let element = self.backend.create(&spec.reuse_identifier).map_err(|source| {
            ReconcileError::Create {
                reuse_identifier: spec.reuse_identifier.to_string(),
                source,
            }
        })?;
        trace!(
            ?element,
            key = %effective_key,
            reuse_identifier = &*spec.reuse_identifier,
            "create"
        );
        pass.report.created += 1;

        if let Some(configure) = &spec.configure {
            self.backend.apply_configuration(&element, &**configure);
            pass.report.configured += 1;
        }
        self.backend.attach(&element, container, index);
        trace!(?element, ?container, index, "attach");
        if let Some(binding) = &spec.binding {
            binding.bind(element.clone());
        }

        let new_children = prepare_children(&spec, children);
        let mut retained_children = Vec::with_capacity(new_children.len());
        for (index, child) in new_children.into_iter().enumerate() {
            retained_children.push(self.mount(pass, child, &element, index)?);
        }

        Ok(RetainedNode {
            element,
            key: spec.key,
            effective_key,
            reuse_identifier: spec.reuse_identifier,
            identity,
            props: spec.props,
            layout: spec.layout,
            frame: None,
            scrolling: spec.scrolling,
            binding: spec.binding,
            children: retained_children,
        })
    }

    /// Bring the element of `old`, at `index` in `container`, up to date with `new`.
    fn reconcile_node(
        &mut self,
        pass: &mut Pass<B>,
        old: RetainedNode<B>,
        new: NewChild<B>,
        container: &B::Element,
        index: usize,
    ) -> Result<RetainedNode<B>, ReconcileError<B::Error>> {
        if old.reuse_identifier != new.spec.reuse_identifier {
            // The element can't be reused for a different kind of node.
            trace!(
                key = %new.effective_key,
                old = &*old.reuse_identifier,
                new = &*new.spec.reuse_identifier,
                "reuse identifier changed"
            );
            self.unmount_child(pass, old, container);
            return self.mount(pass, new, container, index);
        }

        let NewChild {
            identity,
            effective_key,
            spec,
            children,
        } = new;
        let RetainedNode {
            element,
            props: old_props,
            frame,
            binding: old_binding,
            children: old_children,
            ..
        } = old;

        if !props_equal(old_props.as_ref(), spec.props.as_ref())
            && let Some(configure) = &spec.configure
        {
            trace!(?element, key = %effective_key, "configure");
            self.backend.apply_configuration(&element, &**configure);
            pass.report.configured += 1;
        }
        if let Some(old_binding) = &old_binding {
            old_binding.release(&element);
        }
        if let Some(binding) = &spec.binding {
            binding.bind(element.clone());
        }

        let new_children = prepare_children(&spec, children);
        let threshold = spec.max_diff_updates.or(self.options.max_diff_updates);
        let children =
            self.reconcile_children(pass, &element, old_children, new_children, threshold)?;

        Ok(RetainedNode {
            element,
            key: spec.key,
            effective_key,
            reuse_identifier: spec.reuse_identifier,
            identity,
            props: spec.props,
            layout: spec.layout,
            frame,
            scrolling: spec.scrolling,
            binding: spec.binding,
            children,
        })
    }

    fn reconcile_children(
        &mut self,
        pass: &mut Pass<B>,
        container: &B::Element,
        old: Vec<RetainedNode<B>>,
        new: Vec<NewChild<B>>,
        reload_threshold: Option<usize>,
    ) -> Result<Vec<RetainedNode<B>>, ReconcileError<B::Error>> {
        let result = diff_by(
            &old,
            &new,
            |old| Cow::Borrowed(old.identity.as_str()),
            |new| Cow::Borrowed(new.identity.as_str()),
            |old, new| props_equal(old.props.as_ref(), new.spec.props.as_ref()),
        );
        let reload = reload_threshold.is_some_and(|threshold| {
            !old.is_empty()
                && (result.inserts.len() >= threshold || result.deletes.len() >= threshold)
        });
        if reload {
            debug!(
                ?container,
                inserts = result.inserts.len(),
                deletes = result.deletes.len(),
                "Diff exceeds the reload threshold, remounting children"
            );
            pass.report.reloaded_containers += 1;
            for child in old {
                self.unmount_child(pass, child, container);
                pass.report.deleted += 1;
            }
            let mut children = Vec::with_capacity(new.len());
            for (index, child) in new.into_iter().enumerate() {
                children.push(self.mount(pass, child, container, index)?);
                pass.report.inserted += 1;
            }
            return Ok(children);
        }

        // Deletions, in old order.
        let mut old: Vec<Option<RetainedNode<B>>> = old.into_iter().map(Some).collect();
        for &index in &result.deletes {
            if let Some(child) = old[index].take() {
                self.unmount_child(pass, child, container);
                pass.report.deleted += 1;
            }
        }

        // The survivors are now in old order. Permute them into new order in one batch.
        let mut positions = vec![0; old.len()];
        let mut position = 0;
        for (index, child) in old.iter().enumerate() {
            if child.is_some() {
                positions[index] = position;
                position += 1;
            }
        }
        let mut moves: SmallVec<[MoveIndex; 8]> = SmallVec::new();
        let survivors = (0..new.len()).filter_map(|index| result.old_index_for(index));
        for (to, old_index) in survivors.enumerate() {
            let from = positions[old_index];
            if from != to {
                moves.push(MoveIndex::new(from, to));
            }
        }
        if !moves.is_empty() {
            trace!(?container, ?moves, "reorder");
            self.backend.reorder(container, &moves);
            pass.report.moved += moves.len();
        }

        // Insertions and matches, in new order.
        let mut children = Vec::with_capacity(new.len());
        for (index, child) in new.into_iter().enumerate() {
            let matched = result
                .old_index_for(index)
                .and_then(|old_index| old[old_index].take());
            let retained = match matched {
                Some(matched) => self.reconcile_node(pass, matched, child, container, index)?,
                None => {
                    pass.report.inserted += 1;
                    self.mount(pass, child, container, index)?
                }
            };
            children.push(retained);
        }
        debug_assert!(
            old.iter().all(Option::is_none),
            "Every old child is either deleted or matched"
        );
        Ok(children)
    }

    /// Detach `node` from `container`, then destroy its subtree deepest-first.
    fn unmount_child(&mut self, pass: &mut Pass<B>, node: RetainedNode<B>, container: &B::Element) {
        trace!(element = ?node.element, ?container, key = %node.effective_key, "detach");
        self.backend.detach(&node.element, container);
        let backend = &mut self.backend;
        let report = &mut pass.report;
        node.for_each_post_order(&mut |node| {
            if let Some(binding) = &node.binding {
                binding.release(&node.element);
            }
            trace!(element = ?node.element, key = %node.effective_key, "destroy");
            backend.destroy(node.element);
            report.destroyed += 1;
        });
    }

    /// Lay out `node` within `constraint`, then its children within its own size.
    fn layout_node(&mut self, pass: &mut Pass<B>, node: &mut RetainedNode<B>, constraint: Size) {
        let frame = self.layout.measure_and_place(&node.layout, constraint);
        if node.frame != Some(frame) {
            if let Some(old) = node.frame
                && old.size() != frame.size()
            {
                pass.report
                    .keys_with_mutated_size
                    .push(node.effective_key.clone());
            }
            self.backend.apply_frame(&node.element, frame);
            node.frame = Some(frame);
        }
        for child in &mut node.children {
            self.layout_node(pass, child, frame.size());
        }
        if node.scrolling {
            let frames = node.children.iter().map(RetainedNode::frame).collect();
            pass.scrolling.push((node.element.clone(), frames));
        }
    }
}

impl<B: Backend + fmt::Debug, L> fmt::Debug for Reconciler<B, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("backend", &self.backend)
            .field("layout", &"LayoutEngine")
            .field("options", &self.options)
            .field("last_report", &self.last_report)
            .finish()
    }
}
