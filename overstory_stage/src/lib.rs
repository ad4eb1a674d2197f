// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=overstory_stage --heading-base-level=0

//! Overstory Stage: a retained-mode scene stage with damage-driven painting.
//!
//! Overstory Stage is the scene-graph core for windowing stacks, compositors, and embedded UI toolkits.
//!
//! - Maintains a tree of visual nodes with per-parent stacking depths, local transforms, clips, and visibility.
//! - Mirrors transformed and clipped subtrees into a sparser offscreen tree whose entries own compositing surfaces and pending damage.
//! - Propagates damage rectangles upward across transform and clip boundaries, so a paint pass redraws only what changed.
//! - Walks the scene for a backend [`Compositor`], pushing and popping offscreen targets and skipping clean subtrees.
//! - Picks the interest-filtered stack of nodes under a point, ready for an event router to dispatch along.
//!
//! ## Where this fits
//!
//! The stage sits between a widget layer that owns state and layout, and a backend that owns real surfaces.
//! - Widget layer: computes sizes and positions, pushes them here, draws on demand.
//! - Stage (this crate): geometry, stacking, damage, surface lifecycle, picking.
//! - Backend: allocates surfaces and composites them (the [`Compositor`] impl).
//!
//! Nodes are [`NodeId`] handles into an arena. The host owns its widgets and pushes their
//! [`Visual`] state through setters; every mutation queues the damage needed so the next
//! [`Stage::paint`] touches only stale pixels.
//!
//! ## Not a layout engine
//!
//! This crate does not measure or arrange anything. Upstream code computes rectangles with
//! whatever layout system it likes and pushes the results here. It also does not rasterize:
//! drawing happens in the host's paint callback and compositing in the host's [`Compositor`].
//!
//! ## API overview
//!
//! - [`Stage`]: the scene tree plus offscreen tree, damage, painting, and picking.
//! - [`Visual`]: per-node pushed state (rect, transform, clip, depth, flags, interest, hit shape).
//! - [`NodeId`]: generational handle of a node. [`SurfaceId`]: handle of an offscreen surface.
//! - [`NodeFlags`] and [`EventMask`]: visibility flag and event-class interest mask.
//! - [`DamageRegion`]: a small set of dirty rectangles that absorbs overlaps and collapses when crowded.
//! - [`Compositor`], [`PaintTarget`], [`PaintInfo`], [`PaintError`]: the backend-facing paint seam.
//! - [`Pick`]: the interest-filtered root→leaf stack and leaf-local point returned by [`Stage::pick`].
//!
//! Key operations:
//! - [`Stage::create`] → [`NodeId`], then [`Stage::attach`] / [`Stage::detach`] / [`Stage::release`].
//! - [`Stage::set_rect`] / [`Stage::set_transform`] / [`Stage::set_clipped`] / [`Stage::set_depth`] /
//!   [`Stage::set_visible`] / [`Stage::set_interest`] / [`Stage::set_hit_shape`] push state and queue damage.
//! - [`Stage::damage`] marks host-drawn content dirty; [`Stage::paint`] repaints it through a [`Compositor`].
//! - [`Stage::pick`] / [`Stage::pick_from`] / [`Stage::localize`] / [`Stage::ancestors_of`] serve the input side.
//!
//! ## Stacking and coordinates
//!
//! Children paint back to front in depth order: ascending [`Visual::depth`], ties resolved by
//! insertion order. A node's local origin is its allocation origin, so content covers `(0, 0)`
//! to `(width, height)` and a child's position composes the parent chain's origins and
//! transforms. [`Stage::localize`] maps a root-space point into any attached node's space.
//!
//! ## Offscreen surfaces and damage
//!
//! A node carrying a transform or clip paints through an intermediate surface sized to its
//! content. [`Stage::damage`] clamps rectangles at clips and accumulates them in every surface
//! entry it crosses on the way to the root, then [`Stage::paint`] repaints each dirty surface
//! once and re-composites it only where its parent target is dirty. Hosts driving their own
//! renderer can inspect [`Stage::root_damage`] / [`Stage::offscreen_damage`] and drain with
//! [`Stage::take_root_damage`] instead.
//!
//! ## Examples
//!
//! - `demos/examples/stage_input.rs`: a stage wired to an overstory event router, with picking,
//!   grabs, crossing events, and damage-driven repaint over a mock compositor.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod damage;
mod offscreen;
mod paint;
mod pick;
mod tree;
mod types;
mod util;

pub use damage::DamageRegion;
pub use paint::{Compositor, PaintError, PaintInfo, PaintTarget};
pub use pick::Pick;
pub use tree::{Stage, StageError};
pub use types::{EventMask, NodeFlags, NodeId, SurfaceId, Visual};
