// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=overstory_router --heading-base-level=0

//! Deterministic input routing for retained scenes.
//!
//! This crate turns a raw host input stream (pointer, keyboard, touch,
//! scroll) into ordered per-node deliveries, without owning a scene of its
//! own. Nodes are an opaque `Copy + Eq` key; the host supplies picking and
//! receives deliveries through two small traits:
//!
//! - [`types::PickSource`]: what lies under a point, a node's ancestry, and
//!   root→local coordinate mapping.
//! - [`types::EventSink`]: routed events plus crossing and focus
//!   notifications.
//!
//! On top of those, [`router::EventRouter`] maintains the stateful parts of
//! input handling that hosts otherwise get subtly wrong:
//!
//! - Pointer crossing: a root→leaf stack kept current across motion, with
//!   minimal-diff enter/leave notifications and obscured flags.
//! - Keyboard focus: an explicit grant via
//!   [`router::EventRouter::grab_focus`], diffed the same way.
//! - Button grabs: a handled press pins its stack until the matching
//!   release, so drags keep delivering off-node.
//! - Touch sequences: a handled touch-down pins the stack it landed on
//!   until the touch lifts.
//!
//! Routed events run capture (root→leaf, first claim stops the descent)
//! then bubble (leaf→root, claims ORed), mirroring the W3C event flow.
//!
//! ## Example
//!
//! ```
//! use kurbo::Point;
//! use overstory_router::router::EventRouter;
//! use overstory_router::types::{
//!     CrossingEvent, EventSink, FocusEvent, Handled, InputClass, InputEvent, NodeEvent,
//!     NodeStack, PickSource, Phase, PointerButton,
//! };
//!
//! /// A scene with one node covering everything.
//! struct Everything;
//!
//! impl PickSource<u32> for Everything {
//!     fn pick(&self, _class: InputClass, point: Point) -> Option<(NodeStack<u32>, Point)> {
//!         Some((NodeStack::from_slice(&[1]), point))
//!     }
//!     fn ancestors(&self, node: &u32) -> NodeStack<u32> {
//!         NodeStack::from_slice(&[*node])
//!     }
//!     fn localize(&self, _node: &u32, point: Point) -> Option<Point> {
//!         Some(point)
//!     }
//! }
//!
//! struct Clicks(u32);
//!
//! impl EventSink<u32> for Clicks {
//!     fn event(&mut self, _node: &u32, event: &NodeEvent<'_>) -> Handled {
//!         if event.phase == Phase::Bubble && matches!(event.input, InputEvent::PointerDown { .. }) {
//!             self.0 += 1;
//!             return Handled::Yes;
//!         }
//!         Handled::No
//!     }
//!     fn crossing(&mut self, _node: &u32, _event: &CrossingEvent<u32>) {}
//!     fn focus(&mut self, _node: &u32, _event: &FocusEvent<u32>) {}
//! }
//!
//! let mut router = EventRouter::new();
//! let mut sink = Clicks(0);
//! router.route(
//!     &InputEvent::PointerDown {
//!         position: Point::new(4.0, 2.0),
//!         button: PointerButton::Primary,
//!     },
//!     &Everything,
//!     &mut sink,
//! );
//! assert_eq!(sink.0, 1);
//! assert!(router.grab_stack().is_some());
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): enable `std` support in dependencies.
//! - `libm` (disabled by default): use `libm` for floating point where
//!   dependencies need it without `std`.
//! - `stage_adapter`: implement [`types::PickSource`] for
//!   `overstory_stage::Stage`, so a stage plugs in directly.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod router;
pub mod stack;
pub mod types;
