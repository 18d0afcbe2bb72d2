// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Sequences of arbitrary trees, checking the backing hierarchy after every pass.

mod common;

use common::*;
use proptest::prelude::*;
use render_core::RetainedNode;
use render_testing::{RecordingBackend, TestNode, button, label, scroll, stack};

/// The shape of a tree, small enough to shrink well.
///
/// Keys are drawn from a tiny set, so siblings often share them, and a key often moves
/// between kinds of nodes.
#[derive(Clone, Debug)]
enum Shape {
    Nil,
    Leaf {
        button: bool,
        key: Option<u8>,
        text: u8,
    },
    Container {
        scrolling: bool,
        key: Option<u8>,
        children: Vec<Self>,
    },
}

fn key() -> impl Strategy<Value = Option<u8>> {
    prop::option::of(0_u8..3)
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        1 => Just(Shape::Nil),
        4 => (any::<bool>(), key(), 0_u8..3)
            .prop_map(|(button, key, text)| Shape::Leaf { button, key, text }),
    ];
    leaf.prop_recursive(3, 32, 5, |inner| {
        (any::<bool>(), key(), prop::collection::vec(inner, 0..5)).prop_map(
            |(scrolling, key, children)| Shape::Container {
                scrolling,
                key,
                children,
            },
        )
    })
}

fn root() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(shape(), 0..6)
}

fn with_key(node: TestNode, key: Option<u8>) -> TestNode {
    match key {
        Some(key) => node.with_key(format!("k{key}")),
        None => node,
    }
}

fn build(shape: &Shape) -> TestNode {
    match shape {
        Shape::Nil => TestNode::nil(),
        Shape::Leaf { button: true, key, text } => with_key(button(format!("{text}")), *key),
        Shape::Leaf { button: false, key, text } => with_key(label(format!("{text}")), *key),
        Shape::Container {
            scrolling,
            key,
            children,
        } => {
            let container = if *scrolling { scroll() } else { stack() };
            with_key(container.with_children(children.iter().map(build)), *key)
        }
    }
}

/// Check that every element's children are exactly the retained children, in order.
fn assert_matches_backend(
    backend: &RecordingBackend,
    node: &RetainedNode<RecordingBackend>,
) -> Result<(), TestCaseError> {
    let element = backend.element(*node.element());
    prop_assert_eq!(element.reuse_identifier(), node.reuse_identifier());
    let retained: Vec<_> = node.children().iter().map(|child| *child.element()).collect();
    prop_assert_eq!(element.children(), retained.as_slice());
    for child in node.children() {
        assert_matches_backend(backend, child)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn hierarchy_follows_every_pass(passes in prop::collection::vec(root(), 1..5)) {
        let mut fixture = Fixture::new();
        for children in &passes {
            fixture.render(stack().with_children(children.iter().map(build)));
            fixture.recording.clear();

            let backend = fixture.backend();
            let retained = fixture.retained();
            assert_matches_backend(backend, retained)?;
            prop_assert_eq!(backend.element(fixture.container).children(), &[fixture.root()][..]);
            // Every retained node has an element, plus the container.
            prop_assert_eq!(backend.live_count(), retained.node_count() + 1);
        }
    }
}
