// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, reason = "Each test file uses a different subset of these helpers")]

use render_core::kurbo::Size;
use render_core::{ReconcileReport, Reconciler, RetainedNode};
use render_testing::{ElementId, FixedLayout, Record, Recording, RecordingBackend, TestNode};

pub const SIZE: Size = Size::new(400., 800.);

/// A reconciler over a recording backend, keeping the retained tree between passes.
pub struct Fixture {
    pub reconciler: Reconciler<RecordingBackend, FixedLayout>,
    pub recording: Recording,
    pub container: ElementId,
    pub retained: Option<RetainedNode<RecordingBackend>>,
}

impl Fixture {
    pub fn new() -> Self {
        let _ = render_core::tracing_backend::try_init_test_tracing();
        let backend = RecordingBackend::new();
        let recording = backend.recording();
        let container = backend.root();
        Self {
            reconciler: Reconciler::new(backend, FixedLayout::new()),
            recording,
            container,
            retained: None,
        }
    }

    /// Mount `node` and forget the records of that first pass.
    pub fn mounted(node: TestNode) -> Self {
        let mut fixture = Self::new();
        fixture.render(node);
        fixture.recording.clear();
        fixture
    }

    #[track_caller]
    pub fn render(&mut self, node: TestNode) -> ReconcileReport {
        let old = self.retained.take();
        let retained = self
            .reconciler
            .reconcile(old, node, &self.container, SIZE)
            .unwrap();
        self.retained = Some(retained);
        self.reconciler.last_report().clone()
    }

    pub fn backend(&self) -> &RecordingBackend {
        self.reconciler.backend()
    }

    pub fn retained(&self) -> &RetainedNode<RecordingBackend> {
        self.retained.as_ref().unwrap()
    }

    /// The element mounted for the root node.
    pub fn root(&self) -> ElementId {
        *self.retained().element()
    }

    /// The texts of the root element's children.
    pub fn texts(&self) -> Vec<String> {
        self.backend().child_texts(self.root())
    }

    /// The elements of the root node's children.
    pub fn child_elements(&self) -> Vec<ElementId> {
        self.retained()
            .children()
            .iter()
            .map(|child| *child.element())
            .collect()
    }
}

pub fn creates(recording: &Recording) -> usize {
    recording.count(|record| matches!(record, Record::Create { .. }))
}

pub fn destroys(recording: &Recording) -> usize {
    recording.count(|record| matches!(record, Record::Destroy(_)))
}

pub fn reorders(recording: &Recording) -> usize {
    recording.count(|record| matches!(record, Record::Reorder { .. }))
}

pub fn configures(recording: &Recording) -> usize {
    recording.count(|record| matches!(record, Record::Configure(_)))
}
