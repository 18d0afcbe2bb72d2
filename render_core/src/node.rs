// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::props::AnyProps;
use crate::util::debug_panic;
use crate::{Backend, OutputSlot, Props};

/// A description of one element in the tree an app wants to show.
///
/// Nodes are cheap values built fresh on every render pass, using the `with_*` builder
/// methods. Once built, a node isn't mutated again: the [`Reconciler`](crate::Reconciler)
/// consumes it, and records what it needs in a [`RetainedNode`](crate::RetainedNode).
///
/// A node is either a real node, which has a *reuse identifier* naming the kind of
/// backing element it needs, or a [nil marker](Self::nil) standing for "nothing here".
/// Nil markers make conditional children easy to express, and never produce an element.
///
/// # Identity
///
/// Siblings are matched across passes by identity.
/// A node with an explicit [key](Self::with_key) is identified by that key together with
/// its reuse identifier, so a key which moves to a node of a different kind is always
/// torn down and recreated.
/// A node without a key is identified by its reuse identifier and its *slot*: its index
/// among its siblings, counting nil markers. Because nil markers keep their slot, toggling
/// a conditional child doesn't change the identity of the nodes around it.
pub struct Node<B: Backend> {
    pub(crate) spec: Option<NodeSpec<B>>,
    pub(crate) children: Vec<Self>,
}

pub(crate) struct NodeSpec<B: Backend> {
    pub(crate) key: Option<String>,
    pub(crate) reuse_identifier: Cow<'static, str>,
    pub(crate) props: Option<Rc<dyn AnyProps>>,
    pub(crate) configure: Option<Rc<dyn Fn(B::Mut<'_>)>>,
    pub(crate) layout: B::LayoutSpec,
    pub(crate) unique_keys: bool,
    pub(crate) scrolling: bool,
    pub(crate) max_diff_updates: Option<usize>,
    pub(crate) binding: Option<OutputSlot<B::Element>>,
}

impl<B: Backend> Node<B> {
    /// Create a node whose backing element is of the kind named by `reuse_identifier`.
    pub fn new(reuse_identifier: impl Into<Cow<'static, str>>) -> Self {
        Self {
            spec: Some(NodeSpec {
                key: None,
                reuse_identifier: reuse_identifier.into(),
                props: None,
                configure: None,
                layout: B::LayoutSpec::default(),
                unique_keys: false,
                scrolling: false,
                max_diff_updates: None,
                binding: None,
            }),
            children: Vec::new(),
        }
    }

    /// A marker for "no node here".
    ///
    /// Nil markers have no children, and every builder method is a no-op on them.
    pub fn nil() -> Self {
        Self {
            spec: None,
            children: Vec::new(),
        }
    }

    fn spec_mut(&mut self, method: &str) -> Option<&mut NodeSpec<B>> {
        if self.spec.is_none() {
            debug_panic!("Called `Node::{method}` on a nil node");
        }
        self.spec.as_mut()
    }

    /// Set the explicit key of this node.
    ///
    /// Keys only need to be unique among siblings, and only for containers which
    /// [require it](Self::with_unique_keys).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if let Some(spec) = self.spec_mut("with_key") {
            spec.key = Some(key.into());
        }
        self
    }

    /// Set the content of this node.
    ///
    /// When this node is matched with its previous version and the props are equal, the
    /// backing element isn't reconfigured.
    pub fn with_props(mut self, props: impl Props) -> Self {
        if let Some(spec) = self.spec_mut("with_props") {
            spec.props = Some(Rc::new(props));
        }
        self
    }

    /// Set the closure which configures the backing element.
    ///
    /// This runs once when the element is created, and again whenever the props changed
    /// (or on every pass, for nodes without props).
    pub fn with_configure(mut self, configure: impl Fn(B::Mut<'_>) + 'static) -> Self {
        if let Some(spec) = self.spec_mut("with_configure") {
            spec.configure = Some(Rc::new(configure));
        }
        self
    }

    /// Set the layout configuration handed to the [`LayoutEngine`](crate::LayoutEngine).
    pub fn with_layout(mut self, layout: B::LayoutSpec) -> Self {
        if let Some(spec) = self.spec_mut("with_layout") {
            spec.layout = layout;
        }
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: impl Into<Self>) -> Self {
        if self.spec_mut("with_child").is_some() {
            self.children.push(child.into());
        }
        self
    }

    /// Append several children.
    pub fn with_children<C: Into<Self>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        if self.spec_mut("with_children").is_some() {
            self.children.extend(children.into_iter().map(Into::into));
        }
        self
    }

    /// Require every child of this node to have an explicit key, unique among its siblings.
    ///
    /// This is what table-like containers need. A violation panics during reconciliation.
    pub fn with_unique_keys(mut self) -> Self {
        if let Some(spec) = self.spec_mut("with_unique_keys") {
            spec.unique_keys = true;
        }
        self
    }

    /// Mark this node as a scrolling container.
    ///
    /// Its content size is recomputed from its children's frames, through
    /// [`Backend::adjust_content_size`], once at the end of every pass.
    pub fn with_scrolling(mut self) -> Self {
        if let Some(spec) = self.spec_mut("with_scrolling") {
            spec.scrolling = true;
        }
        self
    }

    /// Remount every child instead of patching them when a diff of this node's children
    /// has at least `threshold` insertions or at least `threshold` deletions.
    ///
    /// This overrides [`ReconcilerOptions::max_diff_updates`](crate::ReconcilerOptions::max_diff_updates).
    pub fn with_max_diff_updates(mut self, threshold: usize) -> Self {
        if let Some(spec) = self.spec_mut("with_max_diff_updates") {
            spec.max_diff_updates = Some(threshold);
        }
        self
    }

    /// Bind the backing element of this node to `slot`.
    pub fn bind(mut self, slot: &OutputSlot<B::Element>) -> Self {
        if let Some(spec) = self.spec_mut("bind") {
            spec.binding = Some(slot.clone());
        }
        self
    }

    /// Whether this is a nil marker.
    pub fn is_nil(&self) -> bool {
        self.spec.is_none()
    }

    /// The explicit key of this node.
    pub fn key(&self) -> Option<&str> {
        self.spec.as_ref()?.key.as_deref()
    }

    /// The reuse identifier of this node, or `None` for nil markers.
    pub fn reuse_identifier(&self) -> Option<&str> {
        self.spec.as_ref().map(|spec| &*spec.reuse_identifier)
    }

    /// The children of this node, including nil markers.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The key of this node if it has one, else a key synthesized from its reuse identifier
    /// and `slot`.
    ///
    /// Returns `None` for nil markers.
    pub fn effective_key(&self, slot: usize) -> Option<Cow<'_, str>> {
        let spec = self.spec.as_ref()?;
        Some(match &spec.key {
            Some(key) => Cow::Borrowed(key.as_str()),
            None => Cow::Owned(spec.effective_key(slot)),
        })
    }
}

impl<B: Backend> NodeSpec<B> {
    /// The string used to match this node with its previous version.
    ///
    /// The reuse identifier is length-prefixed, and explicit and synthetic keys use
    /// different separators, so distinct nodes never share an identity.
    pub(crate) fn diff_identifier(&self, slot: usize) -> String {
        let reuse = &self.reuse_identifier;
        match &self.key {
            Some(key) => format!("{}:{reuse}k{key}", reuse.len()),
            None => format!("{}:{reuse}#{slot}", reuse.len()),
        }
    }

    pub(crate) fn effective_key(&self, slot: usize) -> String {
        match &self.key {
            Some(key) => key.clone(),
            None => format!("{}#{slot}", self.reuse_identifier),
        }
    }
}

impl<B: Backend> Default for Node<B> {
    fn default() -> Self {
        Self::nil()
    }
}

impl<B: Backend> From<Option<Self>> for Node<B> {
    fn from(node: Option<Self>) -> Self {
        node.unwrap_or_else(Self::nil)
    }
}

impl<B: Backend> Clone for NodeSpec<B> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            reuse_identifier: self.reuse_identifier.clone(),
            props: self.props.clone(),
            configure: self.configure.clone(),
            layout: self.layout.clone(),
            unique_keys: self.unique_keys,
            scrolling: self.scrolling,
            max_diff_updates: self.max_diff_updates,
            binding: self.binding.clone(),
        }
    }
}

impl<B: Backend> Clone for Node<B> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            children: self.children.clone(),
        }
    }
}

impl<B: Backend> fmt::Debug for Node<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(spec) = &self.spec else {
            return f.write_str("Nil");
        };
        f.debug_struct("Node")
            .field("reuse_identifier", &spec.reuse_identifier)
            .field("key", &spec.key)
            .field("props", &spec.props)
            .field("configure", &spec.configure.as_ref().map(|_| "Fn"))
            .field("layout", &spec.layout)
            .field("unique_keys", &spec.unique_keys)
            .field("scrolling", &spec.scrolling)
            .field("max_diff_updates", &spec.max_diff_updates)
            .field("binding", &spec.binding)
            .field("children", &self.children)
            .finish()
    }
}
