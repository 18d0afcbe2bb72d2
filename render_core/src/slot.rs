// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

/// A typed handle to the backing element of a node, filled in by the reconciler.
///
/// Pass a clone of the slot to [`Node::bind`](crate::Node::bind).
/// The slot is bound synchronously when that node is mounted or matched, and cleared when
/// the node is torn down, so it always refers to the live element (if any).
///
/// This is the supported way to reach a backing element directly, for example to hand
/// it to toolkit APIs which aren't expressed as configuration.
pub struct OutputSlot<E>(Rc<RefCell<Option<E>>>);

impl<E: Clone> OutputSlot<E> {
    /// Create an unbound slot.
    pub fn new() -> Self {
        Self(Rc::default())
    }

    /// The currently bound element.
    pub fn get(&self) -> Option<E> {
        self.0.borrow().clone()
    }

    /// Whether an element is currently bound.
    pub fn is_bound(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub(crate) fn bind(&self, element: E) {
        *self.0.borrow_mut() = Some(element);
    }

    /// Unbind the slot, unless it has since been bound to a different element.
    pub(crate) fn release(&self, element: &E)
    where
        E: PartialEq,
    {
        let mut slot = self.0.borrow_mut();
        if slot.as_ref() == Some(element) {
            *slot = None;
        }
    }
}

impl<E> Clone for OutputSlot<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E: Clone> Default for OutputSlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for OutputSlot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OutputSlot").field(&*self.0.borrow()).finish()
    }
}
