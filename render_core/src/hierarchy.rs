// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::cell::Cell;
use std::fmt;
use std::rc::Rc;

use kurbo::Size;

use crate::{
    Backend, LayoutEngine, Node, ReconcileError, ReconcileReport, Reconciler, ReconcilerOptions,
    RenderCtx, RetainedNode, StateRegistry,
};

/// The passes requested on an [`InvalidationHandle`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Pending {
    /// The tree must be rebuilt and reconciled.
    pub reconcile: bool,
    /// Only layout must be recomputed.
    pub layout: bool,
}

/// A cloneable handle for requesting passes of a [`Hierarchy`].
///
/// Requesting a pass only sets a flag: any number of requests before the next
/// [`Hierarchy::run_pending`] are coalesced into a single pass.
#[derive(Clone, Debug, Default)]
pub struct InvalidationHandle(Rc<Cell<Pending>>);

impl InvalidationHandle {
    /// Create a handle with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a reconciliation pass.
    pub fn set_needs_reconcile(&self) {
        let mut pending = self.0.get();
        pending.reconcile = true;
        self.0.set(pending);
    }

    /// Request a layout-only pass.
    pub fn set_needs_layout(&self) {
        let mut pending = self.0.get();
        pending.layout = true;
        self.0.set(pending);
    }

    /// The passes currently requested.
    pub fn pending(&self) -> Pending {
        self.0.get()
    }

    pub(crate) fn take(&self) -> Pending {
        self.0.take()
    }
}

/// A node tree mounted into a container, and kept up to date.
///
/// The hierarchy owns everything needed between passes: the function which builds the
/// tree, the [`Reconciler`], the retained tree from the previous pass and the
/// [`StateRegistry`] of its components.
///
/// Nothing here runs on its own. Event handlers request passes through an
/// [`InvalidationHandle`], and the owner of the hierarchy calls
/// [`run_pending`](Self::run_pending) once per scheduling tick (e.g. before drawing a frame).
pub struct Hierarchy<B: Backend, L, F> {
    reconciler: Reconciler<B, L>,
    build: F,
    container: B::Element,
    constraint: Size,
    retained: Option<RetainedNode<B>>,
    registry: StateRegistry,
    invalidation: InvalidationHandle,
}

impl<B, L, F> Hierarchy<B, L, F>
where
    B: Backend,
    L: LayoutEngine<B::LayoutSpec>,
    F: FnMut(&mut RenderCtx<'_>) -> Node<B>,
{
    /// Create a hierarchy rendering the trees returned by `build` into `container`.
    ///
    /// Nothing is mounted until the first pass, which is requested immediately.
    pub fn new(backend: B, layout: L, container: B::Element, constraint: Size, build: F) -> Self {
        let invalidation = InvalidationHandle::new();
        invalidation.set_needs_reconcile();
        Self {
            reconciler: Reconciler::new(backend, layout),
            build,
            container,
            constraint,
            retained: None,
            registry: StateRegistry::new(),
            invalidation,
        }
    }

    /// Builder-style method to set the reconciler options.
    pub fn with_options(mut self, options: ReconcilerOptions) -> Self {
        self.reconciler.set_options(options);
        self
    }

    /// A handle for requesting passes.
    pub fn invalidation_handle(&self) -> InvalidationHandle {
        self.invalidation.clone()
    }

    /// The passes currently requested.
    pub fn pending(&self) -> Pending {
        self.invalidation.pending()
    }

    /// Run the pass requested since the last one, if any.
    ///
    /// A requested reconciliation subsumes a requested relayout. Passes requested while this
    /// pass runs stay pending for the next call.
    ///
    /// Returns the report of the pass, or `None` if nothing was requested.
    pub fn run_pending(&mut self) -> Result<Option<&ReconcileReport>, ReconcileError<B::Error>> {
        let pending = self.invalidation.pending();
        if pending.reconcile {
            self.reconcile().map(Some)
        } else if pending.layout {
            Ok(self.relayout())
        } else {
            Ok(None)
        }
    }

    /// Build a new tree and reconcile it immediately.
    ///
    /// The state of components which weren't rendered is flushed from the registry.
    ///
    /// # Errors
    ///
    /// If the backend fails to create an element. The retained tree is then dropped, so the
    /// next pass mounts from scratch. Removing the stale elements from the container is up
    /// to the caller.
    pub fn reconcile(&mut self) -> Result<&ReconcileReport, ReconcileError<B::Error>> {
        self.invalidation.take();

        let mut ctx = RenderCtx::new(&mut self.registry, self.invalidation.clone());
        let node = (self.build)(&mut ctx);
        let used_keys = ctx.into_used_keys();
        self.registry.flush_obsolete_state(&used_keys);

        let old = self.retained.take();
        let retained = self
            .reconciler
            .reconcile(old, node, &self.container, self.constraint)?;
        self.retained = Some(retained);
        Ok(self.reconciler.last_report())
    }

    /// Re-run layout over the retained tree immediately.
    ///
    /// Returns `None` if nothing is mounted.
    pub fn relayout(&mut self) -> Option<&ReconcileReport> {
        let mut pending = self.invalidation.take();
        // A reconcile requested meanwhile must still run.
        pending.layout = false;
        if pending.reconcile {
            self.invalidation.set_needs_reconcile();
        }
        let retained = self.retained.as_mut()?;
        Some(self.reconciler.relayout(retained, self.constraint))
    }

    /// Change the size constraint of the root, and request a relayout.
    pub fn set_constraint(&mut self, constraint: Size) {
        if self.constraint != constraint {
            self.constraint = constraint;
            self.invalidation.set_needs_layout();
        }
    }

    /// Tear down the mounted tree, and forget all component state.
    pub fn unmount(&mut self) {
        if let Some(retained) = self.retained.take() {
            self.reconciler.unmount(retained, &self.container);
        }
        self.registry.flush_obsolete_state(&Default::default());
    }
}

impl<B: Backend, L, F> Hierarchy<B, L, F> {
    /// The size constraint of the root.
    pub fn constraint(&self) -> Size {
        self.constraint
    }

    /// The container the tree is mounted into.
    pub fn container(&self) -> &B::Element {
        &self.container
    }

    /// The tree mounted by the last successful pass.
    pub fn retained(&self) -> Option<&RetainedNode<B>> {
        self.retained.as_ref()
    }

    /// The state of the components in this hierarchy.
    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// The reconciler.
    pub fn reconciler(&self) -> &Reconciler<B, L> {
        &self.reconciler
    }

    /// Mutable access to the reconciler, e.g. to reach the backend.
    pub fn reconciler_mut(&mut self) -> &mut Reconciler<B, L> {
        &mut self.reconciler
    }
}

impl<B: Backend + fmt::Debug + 'static, L, F> fmt::Debug for Hierarchy<B, L, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hierarchy")
            .field("reconciler", &self.reconciler)
            .field("build", &"Fn")
            .field("container", &self.container)
            .field("constraint", &self.constraint)
            .field("retained", &self.retained)
            .field("registry", &self.registry)
            .field("invalidation", &self.invalidation)
            .finish()
    }
}
