// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashSet;

use crate::util::debug_panic;
use crate::{Backend, Describe, InvalidationHandle, Node, StateRegistry};

/// What a [`Component`] needs from the render context.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// The component keeps state between passes, in the [`StateRegistry`] under its key.
    pub has_state: bool,
    /// The component renders the same tree every time, so it is only rendered once per key
    /// and the resulting node is reused on later passes.
    pub has_static_children: bool,
}

impl Capabilities {
    /// A pure function of its inputs.
    pub const STATELESS: Self = Self {
        has_state: false,
        has_static_children: false,
    };
    /// A component with state.
    pub const STATEFUL: Self = Self {
        has_state: true,
        has_static_children: false,
    };
    /// A component whose tree never changes.
    pub const STATIC: Self = Self {
        has_state: false,
        has_static_children: true,
    };

    /// Whether components with these capabilities must be rendered with a key.
    pub const fn requires_key(self) -> bool {
        self.has_state || self.has_static_children
    }
}

/// A reusable piece of UI, rendered into a [`Node`].
///
/// Components are rendered through [`RenderCtx::component`], which looks up their state
/// and caches static trees as described by [`CAPABILITIES`](Self::CAPABILITIES).
pub trait Component<B: Backend> {
    /// The state kept between passes. Use `()` for stateless components.
    type State: Default + Describe + 'static;

    /// What this component needs.
    const CAPABILITIES: Capabilities = Capabilities::STATELESS;

    /// Build the tree for this component.
    ///
    /// Stateless components receive a fresh `State::default()` on every pass.
    fn render(&self, state: &StateHandle<Self::State>, ctx: &mut RenderCtx<'_>) -> Node<B>;
}

/// A shared handle to the state of a [`Component`].
///
/// Handles can be captured by event handlers. Changing the state through
/// [`update`](Self::update) requests a new reconciliation pass.
pub struct StateHandle<S> {
    state: Rc<RefCell<S>>,
    invalidation: InvalidationHandle,
}

impl<S> StateHandle<S> {
    pub(crate) fn new(state: Rc<RefCell<S>>, invalidation: InvalidationHandle) -> Self {
        Self {
            state,
            invalidation,
        }
    }

    /// A copy of the current state.
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        self.state.borrow().clone()
    }

    /// Read the state.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Change the state, and request a reconciliation pass.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.state.borrow_mut());
        self.invalidation.set_needs_reconcile();
        result
    }
}

impl<S> Clone for StateHandle<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            invalidation: self.invalidation.clone(),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for StateHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("state", &self.state)
            .field("invalidation", &self.invalidation)
            .finish()
    }
}

/// The context in which a tree is built.
///
/// A fresh context is created for every pass by [`Hierarchy`](crate::Hierarchy).
/// It records which component keys were rendered, so that the state of components which
/// disappeared can be flushed at the end of the build.
pub struct RenderCtx<'a> {
    registry: &'a mut StateRegistry,
    invalidation: InvalidationHandle,
    used_keys: HashSet<String>,
}

impl<'a> RenderCtx<'a> {
    /// Create a context building against `registry`.
    pub fn new(registry: &'a mut StateRegistry, invalidation: InvalidationHandle) -> Self {
        Self {
            registry,
            invalidation,
            used_keys: HashSet::new(),
        }
    }

    /// A handle for requesting new passes, e.g. from event handlers.
    pub fn invalidation_handle(&self) -> &InvalidationHandle {
        &self.invalidation
    }

    /// The keys rendered so far in this pass.
    pub fn used_keys(&self) -> &HashSet<String> {
        &self.used_keys
    }

    /// Finish building, returning the keys which were rendered.
    pub fn into_used_keys(self) -> HashSet<String> {
        self.used_keys
    }

    /// Render `component`.
    ///
    /// If `key` is given, the resulting node adopts it as its explicit key (unless the
    /// component rendered a nil marker).
    ///
    /// # Panics
    ///
    /// If a component which [requires a key](Capabilities::requires_key) is rendered twice
    /// with the same key in one pass.
    /// Rendering such a component without a key is a bug as well; in release builds, it is
    /// rendered as if it were stateless.
    pub fn component<B, C>(&mut self, key: Option<&str>, component: &C) -> Node<B>
    where
        B: Backend,
        C: Component<B>,
    {
        let capabilities = C::CAPABILITIES;
        let Some(key) = key else {
            if capabilities.requires_key() {
                debug_panic!(
                    "Component `{}` keeps state between passes, so must be rendered with a key",
                    core::any::type_name::<C>()
                );
            }
            let state = StateHandle::new(Rc::default(), self.invalidation.clone());
            return component.render(&state, self);
        };

        let first_use = self.used_keys.insert(key.to_owned());
        if !first_use && capabilities.requires_key() {
            panic!(
                "Component key `{key}` was rendered more than once in the same pass (component `{}`)",
                core::any::type_name::<C>()
            );
        }

        if capabilities.has_static_children
            && let Some(node) = self.registry.static_node::<B>(key)
        {
            return node;
        }

        let state = if capabilities.has_state {
            self.registry.state::<C::State>(key)
        } else {
            Rc::default()
        };
        let state = StateHandle::new(state, self.invalidation.clone());
        let mut node = component.render(&state, self);
        if !node.is_nil() {
            node = node.with_key(key);
        }
        if capabilities.has_static_children {
            self.registry.insert_static_node(key, node.clone());
        }
        node
    }
}

impl fmt::Debug for RenderCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCtx")
            .field("registry", &self.registry)
            .field("invalidation", &self.invalidation)
            .field("used_keys", &self.used_keys)
            .finish()
    }
}
