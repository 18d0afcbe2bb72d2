// Copyright 2025 the Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Serializable descriptions of a retained tree, for debugging tools.

use kurbo::Rect;
use serde::Serialize;

/// A snapshot of a [`RetainedNode`](crate::RetainedNode) and its subtree.
///
/// Produced by [`RetainedNode::describe`](crate::RetainedNode::describe).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeDescription {
    /// The explicit key, if any.
    pub key: Option<String>,
    /// The reuse identifier.
    pub reuse_identifier: String,
    /// The frame of the backing element.
    pub frame: FrameDescription,
    /// The props, as described by [`Describe`](crate::Describe).
    pub properties: Vec<(String, String)>,
    /// Descriptions of the children.
    pub children: Vec<Self>,
}

/// A frame, in its parent's coordinate space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FrameDescription {
    /// The x coordinate of the origin.
    pub x: f64,
    /// The y coordinate of the origin.
    pub y: f64,
    /// The width.
    pub width: f64,
    /// The height.
    pub height: f64,
}

impl From<Rect> for FrameDescription {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

impl NodeDescription {
    /// Pretty printed JSON for this description.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The description of the first node with the explicit key `key`, searching depth-first.
    pub fn find(&self, key: &str) -> Option<&Self> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(key))
    }
}
