// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter that lets a [`Stage`] act as the router's pick source.
//!
//! With this in scope, an [`crate::router::EventRouter`] keyed by
//! [`NodeId`] can route host input straight into a stage: picks run the
//! stage's z-order aware hit walk, ancestry follows the scene tree, and
//! localization applies each node's origin and transform.

use kurbo::Point;
use overstory_stage::{EventMask, NodeId, Stage};

use crate::types::{InputClass, NodeStack, PickSource};

/// The stage interest bit an input class routes under.
pub fn class_mask(class: InputClass) -> EventMask {
    match class {
        InputClass::Pointer => EventMask::POINTER,
        InputClass::Keyboard => EventMask::KEYBOARD,
        InputClass::Touch => EventMask::TOUCH,
        InputClass::Scroll => EventMask::SCROLL,
    }
}

impl PickSource<NodeId> for Stage {
    fn pick(&self, class: InputClass, point: Point) -> Option<(NodeStack<NodeId>, Point)> {
        let pick = Stage::pick(self, class_mask(class), point)?;
        if pick.stack.is_empty() {
            return None;
        }
        Some((pick.stack, pick.leaf_local))
    }

    /// Ancestors filter to nodes interested in keyboard input, since the
    /// router only asks for ancestry when building a focus stack. The node
    /// itself always routes, interested or not: focus was granted to it
    /// explicitly.
    fn ancestors(&self, node: &NodeId) -> NodeStack<NodeId> {
        Stage::ancestors_of(self, *node)
            .into_iter()
            .filter(|id| {
                *id == *node
                    || self
                        .visual_of(*id)
                        .map(|v| v.interest.intersects(EventMask::KEYBOARD))
                        .unwrap_or(false)
            })
            .collect()
    }

    fn localize(&self, node: &NodeId, point: Point) -> Option<Point> {
        Stage::localize(self, *node, point)
    }
}
