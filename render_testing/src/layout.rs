// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

use kurbo::{Rect, Size};
use render_core::LayoutEngine;

/// The layout spec of nodes in a [`RecordingBackend`](crate::RecordingBackend) tree.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum TestLayout {
    /// Fill the constraint, from the origin.
    #[default]
    Fill,
    /// A fixed size, at the origin.
    Sized(Size),
    /// A fixed frame.
    Fixed(Rect),
}

/// A deterministic [`LayoutEngine`] for [`TestLayout`] specs.
///
/// Counts how often it was asked for a frame.
#[derive(Clone, Debug, Default)]
pub struct FixedLayout {
    measured: usize,
}

impl FixedLayout {
    /// Create a layout engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many frames have been computed.
    pub fn measured(&self) -> usize {
        self.measured
    }
}

impl LayoutEngine<TestLayout> for FixedLayout {
    fn measure_and_place(&mut self, spec: &TestLayout, constraint: Size) -> Rect {
        self.measured += 1;
        match spec {
            TestLayout::Fill => constraint.to_rect(),
            TestLayout::Sized(size) => size.to_rect(),
            TestLayout::Fixed(frame) => *frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_follow_the_layout() {
        let mut layout = FixedLayout::new();
        let constraint = Size::new(100., 50.);
        assert_eq!(
            layout.measure_and_place(&TestLayout::Fill, constraint),
            Rect::new(0., 0., 100., 50.)
        );
        assert_eq!(
            layout.measure_and_place(&TestLayout::Sized(Size::new(10., 20.)), constraint),
            Rect::new(0., 0., 10., 20.)
        );
        let frame = Rect::new(5., 5., 15., 15.);
        assert_eq!(
            layout.measure_and_place(&TestLayout::Fixed(frame), constraint),
            frame
        );
        assert_eq!(layout.measured(), 3);
    }
}
