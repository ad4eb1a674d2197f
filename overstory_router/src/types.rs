// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core router vocabulary: input events, dispatch phases, and the two seams
//! (picking and delivery) that tie the router to a host scene.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// A root→leaf chain of node keys, outermost first.
///
/// Stacks are small in practice (a handful of nested containers), so they are
/// kept inline up to eight entries.
pub type NodeStack<K> = SmallVec<[K; 8]>;

/// Classes of input a node can declare interest in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputClass {
    /// Pointer motion, buttons, and crossing.
    Pointer,
    /// Key presses and releases.
    Keyboard,
    /// Touch sequences.
    Touch,
    /// Wheel and kinetic scrolling.
    Scroll,
}

/// Propagation leg of a routed event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Root→leaf leg. The first node to claim the event ends this leg.
    Capture,
    /// Leaf→root leg. Every node on it sees the event; claims are ORed.
    Bubble,
}

/// Whether a node claimed a routed event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Handled {
    /// The event was claimed.
    Yes,
    /// The event was not claimed.
    No,
}

impl Handled {
    /// Whether this is [`Handled::Yes`].
    pub fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Combine two replies: claimed if either side claimed.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        if self.is_yes() || other.is_yes() {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl From<bool> for Handled {
    fn from(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }
}

/// A pointer button.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// The primary button, usually left.
    Primary,
    /// The secondary button, usually right.
    Secondary,
    /// The middle button.
    Middle,
    /// Any other button, by hardware index.
    Other(u16),
}

/// A host keyboard code, passed through untranslated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

/// Identity of one touch sequence, stable from down to up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TouchId(pub u64);

/// An input event from the host windowing layer.
///
/// Positions are in root coordinates; the router localizes them per node at
/// delivery time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// The pointer entered the routed surface.
    PointerEnter {
        /// Pointer position.
        position: Point,
    },
    /// The pointer moved.
    PointerMove {
        /// Pointer position.
        position: Point,
    },
    /// A pointer button went down.
    PointerDown {
        /// Pointer position.
        position: Point,
        /// The button that went down.
        button: PointerButton,
    },
    /// A pointer button went up.
    PointerUp {
        /// Pointer position.
        position: Point,
        /// The button that went up.
        button: PointerButton,
    },
    /// The pointer left the routed surface.
    PointerLeave,
    /// Wheel or kinetic scrolling.
    Scroll {
        /// Pointer position.
        position: Point,
        /// Scroll delta, in the host's units.
        delta: Vec2,
    },
    /// A key went down.
    KeyDown {
        /// The key.
        key: KeyCode,
    },
    /// A key went up.
    KeyUp {
        /// The key.
        key: KeyCode,
    },
    /// A touch sequence began.
    TouchDown {
        /// The sequence.
        touch: TouchId,
        /// Touch position.
        position: Point,
    },
    /// A touch sequence moved.
    TouchMove {
        /// The sequence.
        touch: TouchId,
        /// Touch position.
        position: Point,
    },
    /// A touch sequence ended.
    TouchUp {
        /// The sequence.
        touch: TouchId,
        /// Touch position.
        position: Point,
    },
}

impl InputEvent {
    /// The event's root-space position, when it has one.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerEnter { position }
            | Self::PointerMove { position }
            | Self::PointerDown { position, .. }
            | Self::PointerUp { position, .. }
            | Self::Scroll { position, .. }
            | Self::TouchDown { position, .. }
            | Self::TouchMove { position, .. }
            | Self::TouchUp { position, .. } => Some(*position),
            Self::PointerLeave | Self::KeyDown { .. } | Self::KeyUp { .. } => None,
        }
    }

    /// The interest class this event routes under.
    pub fn class(&self) -> InputClass {
        match self {
            Self::PointerEnter { .. }
            | Self::PointerMove { .. }
            | Self::PointerDown { .. }
            | Self::PointerUp { .. }
            | Self::PointerLeave => InputClass::Pointer,
            Self::Scroll { .. } => InputClass::Scroll,
            Self::KeyDown { .. } | Self::KeyUp { .. } => InputClass::Keyboard,
            Self::TouchDown { .. } | Self::TouchMove { .. } | Self::TouchUp { .. } => {
                InputClass::Touch
            }
        }
    }
}

/// A routed event as seen by one node on the capture or bubble leg.
#[derive(Copy, Clone, Debug)]
pub struct NodeEvent<'a> {
    /// Which leg delivered the event.
    pub phase: Phase,
    /// The original input, positions still in root coordinates.
    pub input: &'a InputEvent,
    /// The event position in the receiving node's coordinates, when the event
    /// carries one and the node could be localized.
    pub local: Option<Point>,
}

/// Direction of a pointer crossing notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CrossingKind {
    /// The pointer now lies within the node.
    Enter,
    /// The pointer no longer lies within the node.
    Leave,
}

/// A pointer crossing notification.
///
/// Crossings are delivered to each affected node directly, outside the
/// capture/bubble walk, and cannot be claimed.
#[derive(Copy, Clone, Debug)]
pub struct CrossingEvent<K> {
    /// Enter or leave.
    pub kind: CrossingKind,
    /// True when the node is an ancestor in its stack rather than the leaf
    /// the pointer rests on.
    pub obscured: bool,
    /// The leaf at the other end of the transition: the leaf being left on
    /// enter, the leaf being entered on leave.
    pub related: Option<K>,
    /// Pointer position in the node's own coordinates, absent when the
    /// pointer left the surface entirely or the node could not be localized.
    pub position: Option<Point>,
}

/// Direction of a focus notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusKind {
    /// The node gained focus or contains the new focus.
    In,
    /// The node lost focus or contained the old focus.
    Out,
}

/// A focus notification.
///
/// Like crossings, focus changes are delivered directly and cannot be
/// claimed.
#[derive(Copy, Clone, Debug)]
pub struct FocusEvent<K> {
    /// Focus in or focus out.
    pub kind: FocusKind,
    /// True when the node is an ancestor of the focus rather than the focus
    /// itself.
    pub obscured: bool,
    /// The leaf at the other end of the transition: the old focus on
    /// focus-in, the new focus on focus-out.
    pub related: Option<K>,
}

/// What the router needs from the host scene: picking, ancestry, and
/// coordinate localization.
///
/// ## Usage
///
/// - With the `stage_adapter` feature, `overstory_stage::Stage` implements
///   this directly.
/// - Hosts with their own scene representation implement it over whatever
///   spatial structure they keep.
///
/// All three methods are queries; the router never asks the source to
/// mutate anything.
pub trait PickSource<K> {
    /// The interest-filtered stack of nodes under `point` (root coordinates),
    /// outermost first, with the pick point mapped into the hit leaf's
    /// coordinates.
    ///
    /// `None`, or an empty stack, means nothing interested was hit.
    fn pick(&self, class: InputClass, point: Point) -> Option<(NodeStack<K>, Point)>;

    /// The chain from the outermost ancestor down to `node`, inclusive.
    ///
    /// Returns an empty stack when the node is no longer part of the scene.
    fn ancestors(&self, node: &K) -> NodeStack<K>;

    /// Map a root-space point into `node`'s coordinates.
    ///
    /// Returns `None` when the node cannot be localized, for example because
    /// it was removed from the scene after entering a grab stack. The router
    /// still delivers the event in that case, with no local position.
    fn localize(&self, node: &K, point: Point) -> Option<Point>;
}

/// Receives everything the router delivers.
pub trait EventSink<K> {
    /// A routed event on its capture or bubble leg.
    ///
    /// Return [`Handled::Yes`] to claim it: on capture this stops the
    /// descent, on bubble it only marks the event handled.
    fn event(&mut self, node: &K, event: &NodeEvent<'_>) -> Handled;

    /// A pointer crossing notification for `node`.
    fn crossing(&mut self, node: &K, event: &CrossingEvent<K>);

    /// A focus notification for `node`.
    fn focus(&mut self, node: &K, event: &FocusEvent<K>);
}
