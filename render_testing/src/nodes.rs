// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Throwaway nodes for writing tests.

use render_core::Node;

use crate::{RecordingBackend, TestElement};

/// A node of a [`RecordingBackend`] tree.
pub type TestNode = Node<RecordingBackend>;

fn text_node(reuse_identifier: &'static str, text: String) -> TestNode {
    Node::new(reuse_identifier)
        .with_props(text.clone())
        .with_configure(move |element: &mut TestElement| element.text.clone_from(&text))
}

/// A `Label` showing `text`. The text is also its props.
pub fn label(text: impl Into<String>) -> TestNode {
    text_node("Label", text.into())
}

/// A `Button` titled `title`. The title is also its props.
pub fn button(title: impl Into<String>) -> TestNode {
    text_node("Button", title.into())
}

/// A `Stack` container, with no props.
pub fn stack() -> TestNode {
    Node::new("Stack")
}

/// A `Scroll` container, which gets a content size at the end of every pass.
pub fn scroll() -> TestNode {
    Node::new("Scroll").with_scrolling()
}

/// A `Table` container, whose children must have unique keys.
pub fn table() -> TestNode {
    Node::new("Table").with_unique_keys()
}
