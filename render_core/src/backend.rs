// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! The collaborators the reconciler drives: the element backend and the layout engine.

use core::error::Error;
use core::fmt::Debug;

use kurbo::{Rect, Size};
use list_diff::MoveIndex;

/// A retained hierarchy of concrete, visible elements.
///
/// This is the only way the [`Reconciler`](crate::Reconciler) touches the platform.
/// Implementations are expected to be thin call-throughs to a toolkit's view hierarchy.
///
/// The reconciler maintains this invariant: before and after every call it makes, the children
/// of each container it manages are exactly the elements of the corresponding
/// [`RetainedNode`](crate::RetainedNode)'s children, in order.
///
/// Configuration closures are stored in nodes and called with [`Mut`](Self::Mut) borrows
/// of any lifetime, so backends must be `'static`.
pub trait Backend: 'static {
    /// A handle to a backing element.
    ///
    /// Handles are cloned freely, so should be cheap (e.g. an id or a reference counted pointer).
    type Element: Clone + PartialEq + Debug;
    /// Mutable access to an element, handed to configuration closures.
    type Mut<'a>;
    /// Layout configuration for an element. This is opaque to the reconciler.
    type LayoutSpec: Clone + Default + Debug + 'static;
    /// The error returned when an element can't be created.
    type Error: Error + 'static;

    /// Create a new, detached element appropriate for `reuse_identifier`.
    fn create(&mut self, reuse_identifier: &str) -> Result<Self::Element, Self::Error>;

    /// Release an element.
    ///
    /// The element's children are always destroyed before the element itself.
    fn destroy(&mut self, element: Self::Element);

    /// Insert `element` into `container`'s children at `index`.
    fn attach(&mut self, element: &Self::Element, container: &Self::Element, index: usize);

    /// Remove `element` from `container`'s children.
    fn detach(&mut self, element: &Self::Element, container: &Self::Element);

    /// Permute `container`'s children.
    ///
    /// All moves are applied at once: the child at index `from` ends up at index `to`.
    /// Children not mentioned in `moves` keep their index.
    /// Every move is within the container's current children.
    fn reorder(&mut self, container: &Self::Element, moves: &[MoveIndex]);

    /// Set the frame of `element`, in its container's coordinate space.
    fn apply_frame(&mut self, element: &Self::Element, frame: Rect);

    /// Run `configure` with mutable access to `element`.
    fn apply_configuration(&mut self, element: &Self::Element, configure: &dyn Fn(Self::Mut<'_>));

    /// Update the content size of a scrolling container from its children's frames.
    ///
    /// Called at most once per container per pass, after every other mutation of the pass.
    /// See [`content_size_from_frames`] for the usual computation.
    fn adjust_content_size(&mut self, container: &Self::Element, child_frames: &[Rect]) {
        let _ = (container, child_frames);
    }
}

/// Computes the geometry of individual elements.
///
/// From the reconciler's point of view this is a pure function, although implementations
/// may cache internally.
pub trait LayoutEngine<Spec> {
    /// Compute the frame of an element with the given `spec`, within `constraint`.
    fn measure_and_place(&mut self, spec: &Spec, constraint: Size) -> Rect;
}

impl<Spec, F> LayoutEngine<Spec> for F
where
    F: FnMut(&Spec, Size) -> Rect,
{
    fn measure_and_place(&mut self, spec: &Spec, constraint: Size) -> Rect {
        self(spec, constraint)
    }
}

/// The size needed to show every frame in `frames`, measured from the container's origin.
pub fn content_size_from_frames(frames: &[Rect]) -> Size {
    frames.iter().fold(Size::ZERO, |size, frame| {
        Size::new(size.width.max(frame.x1), size.height.max(frame.y1))
    })
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use super::*;

    /// Elements are slots of a vector, borrowed mutably for configuration.
    #[derive(Default)]
    struct TextBackend {
        texts: Vec<String>,
    }

    impl Backend for TextBackend {
        type Element = usize;
        type Mut<'a> = &'a mut String;
        type LayoutSpec = ();
        type Error = Infallible;

        fn create(&mut self, _: &str) -> Result<usize, Infallible> {
            self.texts.push(String::new());
            Ok(self.texts.len() - 1)
        }
        fn destroy(&mut self, _: usize) {}
        fn attach(&mut self, _: &usize, _: &usize, _: usize) {}
        fn detach(&mut self, _: &usize, _: &usize) {}
        fn reorder(&mut self, _: &usize, _: &[MoveIndex]) {}
        fn apply_frame(&mut self, _: &usize, _: Rect) {}
        fn apply_configuration(&mut self, element: &usize, configure: &dyn Fn(&mut String)) {
            configure(&mut self.texts[*element]);
        }
    }

    /// Configure through the trait only, the way the reconciler does.
    fn create_configured<B: Backend>(
        backend: &mut B,
        configure: &dyn Fn(B::Mut<'_>),
    ) -> Result<B::Element, B::Error> {
        let element = backend.create("Label")?;
        backend.apply_configuration(&element, configure);
        Ok(element)
    }

    #[test]
    fn configuration_borrows_the_element() {
        let mut backend = TextBackend::default();
        let configure = |text: &mut String| text.push_str("hello");
        let element = create_configured(&mut backend, &configure).unwrap();
        assert_eq!(backend.texts[element], "hello");
    }

    #[test]
    fn content_size_covers_every_frame() {
        assert_eq!(content_size_from_frames(&[]), Size::ZERO);
        let frames = [
            Rect::new(0., 0., 100., 20.),
            Rect::new(0., 20., 80., 60.),
            Rect::new(10., 60., 40., 50.),
        ];
        assert_eq!(content_size_from_frames(&frames), Size::new(100., 60.));
    }

    #[test]
    fn closures_are_layout_engines() {
        let mut engine = |spec: &f64, constraint: Size| Rect::new(0., 0., *spec, constraint.height);
        let frame = engine.measure_and_place(&12., Size::new(50., 30.));
        assert_eq!(frame, Rect::new(0., 0., 12., 30.));
    }
}
