// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use kurbo::Size;
use render_core::tracing_backend::try_init_test_tracing;
use render_core::{
    Hierarchy, InvalidationHandle, Node, ReconcileReport, ReconcilerOptions, RenderCtx,
    RetainedNode,
};

use crate::{ElementId, FixedLayout, Recording, RecordingBackend, TestElement};

/// The constraint used by [`TestHarness::create`].
pub const DEFAULT_SIZE: Size = Size::new(400., 800.);

/// A [`Hierarchy`] over a [`RecordingBackend`], for tests.
///
/// Creating a harness runs the first pass, so the tree is mounted straight away.
/// Errors from the backend are turned into panics.
pub struct TestHarness<F> {
    hierarchy: Hierarchy<RecordingBackend, FixedLayout, F>,
    recording: Recording,
}

impl<F> TestHarness<F>
where
    F: FnMut(&mut RenderCtx<'_>) -> Node<RecordingBackend>,
{
    /// Mount the trees built by `build` in a container of [`DEFAULT_SIZE`].
    pub fn create(build: F) -> Self {
        Self::create_with_options(DEFAULT_SIZE, ReconcilerOptions::default(), build)
    }

    /// Mount the trees built by `build` in a container of the given size.
    pub fn create_with_options(size: Size, options: ReconcilerOptions, build: F) -> Self {
        let _ = try_init_test_tracing();
        let backend = RecordingBackend::new();
        let recording = backend.recording();
        let root = backend.root();
        let hierarchy =
            Hierarchy::new(backend, FixedLayout::new(), root, size, build).with_options(options);
        let mut harness = Self {
            hierarchy,
            recording,
        };
        harness.run_pending();
        harness
    }

    /// Run the pending pass, if any.
    ///
    /// # Panics
    ///
    /// If the pass fails.
    #[track_caller]
    pub fn run_pending(&mut self) -> Option<ReconcileReport> {
        match self.hierarchy.run_pending() {
            Ok(report) => report.cloned(),
            Err(err) => panic!("reconciliation failed: {err}"),
        }
    }

    /// Rebuild and reconcile, whether or not a pass was requested.
    #[track_caller]
    pub fn reconcile(&mut self) -> ReconcileReport {
        match self.hierarchy.reconcile() {
            Ok(report) => report.clone(),
            Err(err) => panic!("reconciliation failed: {err}"),
        }
    }

    /// The hierarchy under test.
    pub fn hierarchy(&self) -> &Hierarchy<RecordingBackend, FixedLayout, F> {
        &self.hierarchy
    }

    /// Mutable access to the hierarchy under test.
    pub fn hierarchy_mut(&mut self) -> &mut Hierarchy<RecordingBackend, FixedLayout, F> {
        &mut self.hierarchy
    }

    /// A handle for requesting passes.
    pub fn invalidation_handle(&self) -> InvalidationHandle {
        self.hierarchy.invalidation_handle()
    }

    /// Every backend call made so far (and not yet consumed).
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// The backend.
    pub fn backend(&self) -> &RecordingBackend {
        self.hierarchy.reconciler().backend()
    }

    /// The retained tree.
    ///
    /// # Panics
    ///
    /// If nothing is mounted.
    #[track_caller]
    pub fn retained(&self) -> &RetainedNode<RecordingBackend> {
        self.hierarchy
            .retained()
            .expect("the harness should have a mounted tree")
    }

    /// The element `id`.
    #[track_caller]
    pub fn element(&self, id: ElementId) -> &TestElement {
        self.backend().element(id)
    }

    /// The element mounted for the root node.
    #[track_caller]
    pub fn root_element(&self) -> &TestElement {
        self.element(*self.retained().element())
    }
}
