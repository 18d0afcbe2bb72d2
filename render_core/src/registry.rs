// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use core::any::{Any, type_name};
use core::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::{Backend, Describe, Node};

struct StateEntry {
    state: Rc<dyn Any>,
    type_name: &'static str,
    describe: fn(&dyn Any) -> Vec<(String, String)>,
}

fn describe_state<S: Describe + 'static>(state: &dyn Any) -> Vec<(String, String)> {
    state
        .downcast_ref::<RefCell<S>>()
        .map(|state| state.borrow().describe())
        .unwrap_or_default()
}

/// The state of every keyed [`Component`](crate::Component), owned by one [`Hierarchy`](crate::Hierarchy).
///
/// Entries live for as long as their key keeps being rendered:
/// [`flush_obsolete_state`](Self::flush_obsolete_state) runs once per pass, and drops
/// the entries of keys which weren't used.
#[derive(Default)]
pub struct StateRegistry {
    states: HashMap<String, StateEntry>,
    static_nodes: HashMap<String, Box<dyn Any>>,
}

impl StateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The state stored under `key`, inserting `S::default()` if there is none.
    ///
    /// # Panics
    ///
    /// If `key` already holds state of a different type. Two components are then sharing a
    /// key, which would corrupt the state of both.
    pub fn state<S: Default + Describe + 'static>(&mut self, key: &str) -> Rc<RefCell<S>> {
        let entry = self
            .states
            .entry(key.to_owned())
            .or_insert_with(|| StateEntry {
                state: Rc::new(RefCell::new(S::default())),
                type_name: type_name::<S>(),
                describe: describe_state::<S>,
            });
        let stored = entry.type_name;
        match entry.state.clone().downcast::<RefCell<S>>() {
            Ok(state) => state,
            Err(_) => panic!(
                "State for key `{key}` has type `{stored}`, but was requested as `{}`",
                type_name::<S>()
            ),
        }
    }

    /// Whether there is state stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.states.contains_key(key) || self.static_nodes.contains_key(key)
    }

    /// The number of keys with state or a cached static node.
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.static_nodes.is_empty()
    }

    /// Every key with state or a cached static node.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str).chain(
            self.static_nodes
                .keys()
                .filter(|key| !self.states.contains_key(*key))
                .map(String::as_str),
        )
    }

    /// The description of the state stored under `key`, if any.
    pub fn describe(&self, key: &str) -> Option<Vec<(String, String)>> {
        let entry = self.states.get(key)?;
        Some((entry.describe)(&*entry.state))
    }

    /// Drop the state and cached nodes of every key not in `valid_keys`.
    pub fn flush_obsolete_state(&mut self, valid_keys: &HashSet<String>) {
        let before = self.states.len() + self.static_nodes.len();
        self.states.retain(|key, _| valid_keys.contains(key));
        self.static_nodes.retain(|key, _| valid_keys.contains(key));
        let flushed = before - self.states.len() - self.static_nodes.len();
        if flushed > 0 {
            debug!(flushed, "Flushed obsolete component state");
        }
    }

    pub(crate) fn static_node<B: Backend>(&self, key: &str) -> Option<Node<B>> {
        self.static_nodes
            .get(key)?
            .downcast_ref::<Node<B>>()
            .cloned()
    }

    pub(crate) fn insert_static_node<B: Backend>(&mut self, key: &str, node: Node<B>) {
        self.static_nodes.insert(key.to_owned(), Box::new(node));
    }
}

impl fmt::Debug for StateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states: Vec<_> = self
            .states
            .iter()
            .map(|(key, entry)| (key, entry.type_name))
            .collect();
        let static_nodes: Vec<_> = self.static_nodes.keys().collect();
        f.debug_struct("StateRegistry")
            .field("states", &states)
            .field("static_nodes", &static_nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Counter {
        count: u32,
    }

    impl Describe for Counter {
        fn describe(&self) -> Vec<(String, String)> {
            vec![("count".to_owned(), self.count.to_string())]
        }
    }

    fn keys(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|key| (*key).to_owned()).collect()
    }

    #[test]
    fn state_persists_per_key() {
        let mut registry = StateRegistry::new();
        registry.state::<Counter>("a").borrow_mut().count = 3;
        assert_eq!(registry.state::<Counter>("a").borrow().count, 3);
        assert_eq!(registry.state::<Counter>("b").borrow().count, 0);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
    }

    #[test]
    fn flush_drops_unused_keys() {
        let mut registry = StateRegistry::new();
        registry.state::<Counter>("a").borrow_mut().count = 1;
        registry.state::<Counter>("b").borrow_mut().count = 2;

        registry.flush_obsolete_state(&keys(&["b"]));
        assert!(!registry.contains("a"));
        assert!(registry.contains("b"));
        assert_eq!(registry.state::<Counter>("b").borrow().count, 2);

        registry.flush_obsolete_state(&keys(&[]));
        assert!(registry.is_empty());
    }

    #[test]
    fn describes_stored_state() {
        let mut registry = StateRegistry::new();
        registry.state::<Counter>("a").borrow_mut().count = 7;
        assert_eq!(
            registry.describe("a"),
            Some(vec![("count".to_owned(), "7".to_owned())])
        );
        assert_eq!(registry.describe("missing"), None);
    }

    #[test]
    #[should_panic(expected = "State for key `a` has type")]
    fn reusing_a_key_for_another_type_panics() {
        let mut registry = StateRegistry::new();
        let _ = registry.state::<Counter>("a");
        let _ = registry.state::<String>("a");
    }
}
