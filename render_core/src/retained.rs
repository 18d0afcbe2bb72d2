// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use kurbo::Rect;

use crate::props::AnyProps;
use crate::{Backend, FrameDescription, NodeDescription, OutputSlot};

/// The record of a reconciled [`Node`](crate::Node) and its live backing element.
///
/// A retained tree is produced by [`Reconciler::reconcile`](crate::Reconciler::reconcile),
/// and is the "old" side of the next pass. Its shape always matches the backing hierarchy:
/// the children of a retained node are exactly the children of its element, in order.
pub struct RetainedNode<B: Backend> {
    pub(crate) element: B::Element,
    pub(crate) key: Option<String>,
    pub(crate) effective_key: String,
    pub(crate) reuse_identifier: Cow<'static, str>,
    pub(crate) identity: String,
    pub(crate) props: Option<Rc<dyn AnyProps>>,
    pub(crate) layout: B::LayoutSpec,
    /// `None` until the first layout pass.
    pub(crate) frame: Option<Rect>,
    pub(crate) scrolling: bool,
    pub(crate) binding: Option<OutputSlot<B::Element>>,
    pub(crate) children: Vec<Self>,
}

impl<B: Backend> RetainedNode<B> {
    /// The backing element.
    pub fn element(&self) -> &B::Element {
        &self.element
    }

    /// The explicit key of the node.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The explicit key of the node, or the key synthesized from its reuse identifier and slot.
    pub fn effective_key(&self) -> &str {
        &self.effective_key
    }

    /// The reuse identifier of the node.
    pub fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }

    /// The layout configuration of the node.
    pub fn layout(&self) -> &B::LayoutSpec {
        &self.layout
    }

    /// The frame last applied to the backing element.
    pub fn frame(&self) -> Rect {
        self.frame.unwrap_or(Rect::ZERO)
    }

    /// Whether the node is a scrolling container.
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// The retained children, in the order of the backing element's children.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The element of the first node with the explicit key `key`, searching depth-first.
    pub fn element_with_key(&self, key: &str) -> Option<&B::Element> {
        if self.key() == Some(key) {
            return Some(&self.element);
        }
        self.children
            .iter()
            .find_map(|child| child.element_with_key(key))
    }

    /// The elements of every node with the given reuse identifier, in depth-first order.
    pub fn elements_with_reuse_identifier(&self, reuse_identifier: &str) -> Vec<&B::Element> {
        let mut elements = Vec::new();
        self.collect_with_reuse_identifier(reuse_identifier, &mut elements);
        elements
    }

    fn collect_with_reuse_identifier<'a>(
        &'a self,
        reuse_identifier: &str,
        elements: &mut Vec<&'a B::Element>,
    ) {
        if self.reuse_identifier == reuse_identifier {
            elements.push(&self.element);
        }
        for child in &self.children {
            child.collect_with_reuse_identifier(reuse_identifier, elements);
        }
    }

    /// Total number of nodes in this tree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// A description of this tree for diagnostic display.
    pub fn describe(&self) -> NodeDescription {
        NodeDescription {
            key: self.key.clone(),
            reuse_identifier: self.reuse_identifier.to_string(),
            frame: FrameDescription::from(self.frame()),
            properties: self
                .props
                .as_ref()
                .map(|props| props.describe_props())
                .unwrap_or_default(),
            children: self.children.iter().map(Self::describe).collect(),
        }
    }

    /// Consume this tree, visiting children before their parents.
    pub(crate) fn for_each_post_order(mut self, f: &mut impl FnMut(Self)) {
        for child in std::mem::take(&mut self.children) {
            child.for_each_post_order(f);
        }
        f(self);
    }
}

impl<B: Backend> fmt::Debug for RetainedNode<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetainedNode")
            .field("element", &self.element)
            .field("key", &self.key)
            .field("effective_key", &self.effective_key)
            .field("reuse_identifier", &self.reuse_identifier)
            .field("identity", &self.identity)
            .field("props", &self.props)
            .field("layout", &self.layout)
            .field("frame", &self.frame)
            .field("scrolling", &self.scrolling)
            .field("binding", &self.binding)
            .field("children", &self.children)
            .finish()
    }
}
