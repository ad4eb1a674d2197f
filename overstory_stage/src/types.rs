// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the stage: node identifiers, flags, interest masks, and
//! per-node visual state.

use kurbo::{Affine, Point, Rect, RoundedRect};

/// Identifier for a node in the stage (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for an offscreen compositing surface.
///
/// Surface ids are minted by the [`Stage`](crate::Stage); the
/// [`Compositor`](crate::Compositor) owns the actual resources and maps ids to
/// them. An id is never reused within the lifetime of one stage.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SurfaceId(pub(crate) u32);

impl SurfaceId {
    /// The raw id value, for backends that key resources by integer.
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

bitflags::bitflags! {
    /// Node flags controlling participation in painting and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible (painted, and reachable by picking).
        const VISIBLE = 0b0000_0001;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// Event classes a node declares interest in.
    ///
    /// Picking appends a node to the result stack only when the node's
    /// interest mask contains the class being picked for; traversal still
    /// descends into its children either way.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventMask: u8 {
        /// Pointer motion, buttons, and crossing.
        const POINTER  = 0b0000_0001;
        /// Keyboard input routed through the focus stack.
        const KEYBOARD = 0b0000_0010;
        /// Touch sequences.
        const TOUCH    = 0b0000_0100;
        /// Scroll/wheel input.
        const SCROLL   = 0b0000_1000;
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::all()
    }
}

/// Per-node visual state pushed into the stage by the node's owner.
///
/// The allocated rectangle is expressed in the parent's coordinate space. The
/// node's own coordinate space has its origin at the allocation origin, so
/// local content spans `(0, 0)` to `(width, height)`; [`Visual::content_rect`]
/// returns that span. The optional transform applies in local space, before
/// the allocation translation.
#[derive(Clone, Debug, PartialEq)]
pub struct Visual {
    /// Allocated rectangle in parent coordinates.
    pub rect: Rect,
    /// Optional local transform. Setting one makes the node an offscreen
    /// boundary.
    pub transform: Option<Affine>,
    /// Clip content and children to the allocation. Also an offscreen
    /// boundary.
    pub clipped: bool,
    /// Stacking depth among siblings. Higher is drawn on top; ties keep
    /// insertion order.
    pub depth: i32,
    /// Visibility flags.
    pub flags: NodeFlags,
    /// Event classes this node wants routed to it.
    pub interest: EventMask,
    /// Optional hit-region override (local coordinates). `None` means the
    /// content rectangle.
    pub hit_shape: Option<RoundedRect>,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            rect: Rect::ZERO,
            transform: None,
            clipped: false,
            depth: 0,
            flags: NodeFlags::default(),
            interest: EventMask::default(),
            hit_shape: None,
        }
    }
}

impl Visual {
    /// Local content span: `(0, 0)` to the allocation's size.
    pub fn content_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.rect.size())
    }

    /// Affine mapping local coordinates into the parent's space.
    pub fn to_parent(&self) -> Affine {
        let translate = Affine::translate(self.rect.origin().to_vec2());
        match self.transform {
            Some(tf) => translate * tf,
            None => translate,
        }
    }

    /// Whether this node forces an intermediate compositing surface.
    pub fn is_boundary(&self) -> bool {
        self.transform.is_some() || self.clipped
    }
}
