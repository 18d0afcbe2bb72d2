// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`Backend`] which records every call made to it.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use kurbo::{Rect, Size};
use render_core::list_diff::MoveIndex;
use render_core::{Backend, content_size_from_frames};
use smallvec::SmallVec;
use tracing::trace;

use crate::TestLayout;

/// The handle of a [`TestElement`] in a [`RecordingBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32);

impl ElementId {
    /// The raw index of this element in its backend's arena.
    pub fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element of a [`RecordingBackend`].
///
/// Configuration closures receive `&mut TestElement`, and can set its public fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestElement {
    /// The text shown by the element.
    pub text: String,
    /// Any other configured state.
    pub properties: BTreeMap<String, String>,
    reuse_identifier: String,
    frame: Rect,
    content_size: Option<Size>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl TestElement {
    /// The reuse identifier this element was created for.
    pub fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }

    /// The last frame applied to this element.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// The last content size set on this element, if any.
    pub fn content_size(&self) -> Option<Size> {
        self.content_size
    }

    /// The container this element is attached to.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// The attached children, in order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Set a property.
    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        self.properties.insert(name.to_owned(), value.into());
    }
}

/// One call to the [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// [`Backend::create`].
    Create {
        /// The new element.
        element: ElementId,
        /// Its reuse identifier.
        reuse_identifier: String,
    },
    /// [`Backend::destroy`].
    Destroy(ElementId),
    /// [`Backend::attach`].
    Attach {
        /// The attached element.
        element: ElementId,
        /// The container.
        container: ElementId,
        /// The index in the container.
        index: usize,
    },
    /// [`Backend::detach`].
    Detach {
        /// The detached element.
        element: ElementId,
        /// The container.
        container: ElementId,
    },
    /// [`Backend::reorder`].
    Reorder {
        /// The container.
        container: ElementId,
        /// The moves, as passed to the backend.
        moves: SmallVec<[MoveIndex; 4]>,
    },
    /// [`Backend::apply_frame`].
    ApplyFrame {
        /// The element.
        element: ElementId,
        /// The new frame.
        frame: Rect,
    },
    /// [`Backend::apply_configuration`].
    Configure(ElementId),
    /// [`Backend::adjust_content_size`].
    AdjustContentSize {
        /// The scrolling container.
        container: ElementId,
        /// The computed content size.
        content_size: Size,
    },
}

impl Record {
    /// Whether this record mutated the structure of the hierarchy.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Create { .. }
                | Self::Destroy(_)
                | Self::Attach { .. }
                | Self::Detach { .. }
                | Self::Reorder { .. }
        )
    }
}

/// A shared queue of [`Record`]s.
#[derive(Debug, Clone, Default)]
pub struct Recording(Rc<RefCell<VecDeque<Record>>>);

impl Recording {
    /// True if no calls have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// The number of calls in the recording.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Clear recorded calls.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Returns the next call in the recording, if one exists.
    ///
    /// This consumes the call.
    pub fn next(&self) -> Option<Record> {
        self.0.borrow_mut().pop_front()
    }

    /// Returns a vec of calls drained from the recording.
    pub fn drain(&self) -> Vec<Record> {
        self.0.borrow_mut().drain(..).collect::<Vec<_>>()
    }

    /// The number of recorded calls matching `predicate`, without consuming them.
    pub fn count(&self, predicate: impl Fn(&Record) -> bool) -> usize {
        self.0.borrow().iter().filter(|record| predicate(record)).count()
    }

    fn push(&self, record: Record) {
        self.0.borrow_mut().push_back(record);
    }
}

/// The error returned by a [`RecordingBackend`] told to fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestBackendError {
    /// The reuse identifier which couldn't be created.
    pub reuse_identifier: String,
}

impl fmt::Display for TestBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refused to create `{}`", self.reuse_identifier)
    }
}

impl Error for TestBackendError {}

/// A [`Backend`] whose elements are plain structs in an arena.
///
/// Every call is appended to a [`Recording`].
/// The backend also checks the invariants the reconciler promises, and panics if one is
/// broken: elements are only attached once, detached from the container they are in,
/// reordered with a valid permutation, and destroyed after all of their children.
///
/// A root container (not recorded as created) is available through [`root`](Self::root).
pub struct RecordingBackend {
    elements: Vec<Option<TestElement>>,
    recording: Recording,
    fail_create_for: Vec<String>,
}

impl RecordingBackend {
    /// Create a backend containing only the root container.
    pub fn new() -> Self {
        let root = TestElement {
            reuse_identifier: "Root".to_owned(),
            ..Default::default()
        };
        Self {
            elements: vec![Some(root)],
            recording: Recording::default(),
            fail_create_for: Vec::new(),
        }
    }

    /// The root container.
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// A handle to the recording of this backend.
    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }

    /// Make [`Backend::create`] fail for `reuse_identifier`.
    pub fn fail_create_for(&mut self, reuse_identifier: impl Into<String>) {
        self.fail_create_for.push(reuse_identifier.into());
    }

    /// Let [`Backend::create`] succeed for every reuse identifier again.
    pub fn clear_failures(&mut self) {
        self.fail_create_for.clear();
    }

    /// The live element `id`.
    ///
    /// # Panics
    ///
    /// If `id` has been destroyed.
    #[track_caller]
    pub fn element(&self, id: ElementId) -> &TestElement {
        self.get(id)
            .unwrap_or_else(|| panic!("element {id} has been destroyed"))
    }

    /// The element `id`, unless it has been destroyed.
    pub fn get(&self, id: ElementId) -> Option<&TestElement> {
        self.elements.get(id.0 as usize)?.as_ref()
    }

    /// Whether `id` is still alive.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// The number of live elements, including the root.
    pub fn live_count(&self) -> usize {
        self.elements.iter().flatten().count()
    }

    /// The texts of the children of `container`, in order.
    pub fn child_texts(&self, container: ElementId) -> Vec<String> {
        self.element(container)
            .children
            .iter()
            .map(|child| self.element(*child).text.clone())
            .collect()
    }

    /// The reuse identifiers of the children of `container`, in order.
    pub fn child_kinds(&self, container: ElementId) -> Vec<String> {
        self.element(container)
            .children
            .iter()
            .map(|child| self.element(*child).reuse_identifier.clone())
            .collect()
    }

    #[track_caller]
    fn element_mut(&mut self, id: ElementId) -> &mut TestElement {
        self.elements
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("element {id} has been destroyed"))
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingBackend")
            .field("live_elements", &self.live_count())
            .field("recorded_calls", &self.recording.len())
            .field("fail_create_for", &self.fail_create_for)
            .finish_non_exhaustive()
    }
}

impl Backend for RecordingBackend {
    type Element = ElementId;
    type Mut<'a> = &'a mut TestElement;
    type LayoutSpec = TestLayout;
    type Error = TestBackendError;

    fn create(&mut self, reuse_identifier: &str) -> Result<ElementId, TestBackendError> {
        if self.fail_create_for.iter().any(|id| id == reuse_identifier) {
            return Err(TestBackendError {
                reuse_identifier: reuse_identifier.to_owned(),
            });
        }
        let id = ElementId(
            u32::try_from(self.elements.len()).expect("fewer than 2^32 test elements"),
        );
        self.elements.push(Some(TestElement {
            reuse_identifier: reuse_identifier.to_owned(),
            ..Default::default()
        }));
        self.recording.push(Record::Create {
            element: id,
            reuse_identifier: reuse_identifier.to_owned(),
        });
        Ok(id)
    }

    fn destroy(&mut self, element: ElementId) {
        let destroyed = self.element(element);
        for child in &destroyed.children {
            assert!(
                !self.is_alive(*child),
                "element {element} was destroyed before its child {child}"
            );
        }
        self.elements[element.0 as usize] = None;
        self.recording.push(Record::Destroy(element));
    }

    fn attach(&mut self, element: &ElementId, container: &ElementId, index: usize) {
        let (element, container) = (*element, *container);
        let attached = self.element_mut(element);
        assert_eq!(
            attached.parent, None,
            "element {element} attached to {container} while still attached"
        );
        attached.parent = Some(container);
        let children = &mut self.element_mut(container).children;
        assert!(
            index <= children.len(),
            "element {element} attached at {index}, but {container} has {} children",
            children.len()
        );
        children.insert(index, element);
        self.recording.push(Record::Attach {
            element,
            container,
            index,
        });
    }

    fn detach(&mut self, element: &ElementId, container: &ElementId) {
        let (element, container) = (*element, *container);
        let children = &mut self.element_mut(container).children;
        let Some(index) = children.iter().position(|child| *child == element) else {
            panic!("element {element} detached from {container}, which doesn't contain it");
        };
        children.remove(index);
        self.element_mut(element).parent = None;
        self.recording.push(Record::Detach { element, container });
    }

    fn reorder(&mut self, container: &ElementId, moves: &[MoveIndex]) {
        let container = *container;
        let children = &mut self.element_mut(container).children;
        let current = children.clone();
        let mut sources = vec![false; current.len()];
        let mut targets = vec![false; current.len()];
        for MoveIndex { from, to } in moves {
            assert!(
                *from < current.len() && *to < current.len(),
                "move {from} -> {to} out of bounds for {} children",
                current.len()
            );
            assert!(
                !sources[*from] && !targets[*to],
                "moves of {container} aren't a permutation: {moves:?}"
            );
            sources[*from] = true;
            targets[*to] = true;
            children[*to] = current[*from];
        }
        assert_eq!(
            sources, targets,
            "moves of {container} aren't a permutation: {moves:?}"
        );
        trace!(%container, ?moves, "test backend reorder");
        self.recording.push(Record::Reorder {
            container,
            moves: moves.iter().copied().collect(),
        });
    }

    fn apply_frame(&mut self, element: &ElementId, frame: Rect) {
        self.element_mut(*element).frame = frame;
        self.recording.push(Record::ApplyFrame {
            element: *element,
            frame,
        });
    }

    fn apply_configuration(
        &mut self,
        element: &ElementId,
        configure: &dyn Fn(&mut TestElement),
    ) {
        configure(self.element_mut(*element));
        self.recording.push(Record::Configure(*element));
    }

    fn adjust_content_size(&mut self, container: &ElementId, child_frames: &[Rect]) {
        let content_size = content_size_from_frames(child_frames);
        self.element_mut(*container).content_size = Some(content_size);
        self.recording.push(Record::AdjustContentSize {
            container: *container,
            content_size,
        });
    }
}
