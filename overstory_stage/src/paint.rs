// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The renderer walk: damage-driven traversal over surfaces a backend owns.
//!
//! [`Stage::paint`] walks the scene depth-first, skipping subtrees that miss
//! the current target's damage. Crossing an offscreen boundary pushes that
//! node's surface as the target (after sizing it), repaints the surface's own
//! dirty region, and composites the result back where the enclosing target is
//! dirty. A node's own content is painted as the walk leaves it, after its
//! children. Every node touched by damage paints exactly once per pass, and a
//! repainted surface's pending damage is cleared.

use kurbo::{Affine, Rect, Size};

use crate::damage::DamageRegion;
use crate::tree::Stage;
use crate::types::{NodeFlags, NodeId, SurfaceId, Visual};
use crate::util::{is_positive_area, transform_rect_bbox};

/// Where a paint pass is currently drawing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaintTarget {
    /// The host-owned surface behind the stage root.
    Root,
    /// An offscreen surface owned by a boundary node.
    Surface(SurfaceId),
}

/// Surface lifecycle and compositing hooks a backend provides to
/// [`Stage::paint`].
///
/// Surfaces are identified by the stage's [`SurfaceId`]s; the backend maps
/// them to textures, layers, or whatever it composites with. All methods may
/// fail with the backend's own error type, which aborts the pass and leaves
/// pending damage intact for a retry.
pub trait Compositor {
    /// Drawing context for one target, handed to the draw callback.
    type Canvas;
    type Error: core::fmt::Debug;

    /// Allocate backing for a new offscreen surface.
    fn create_surface(&mut self, surface: SurfaceId, size: Size) -> Result<(), Self::Error>;
    /// Resize an existing surface; its content will be fully repainted.
    fn resize_surface(&mut self, surface: SurfaceId, size: Size) -> Result<(), Self::Error>;
    /// Drop backing for a surface that no longer exists.
    fn release_surface(&mut self, surface: SurfaceId);
    /// Start drawing on a target, constrained to `damage`.
    fn begin(
        &mut self,
        target: PaintTarget,
        damage: &DamageRegion,
    ) -> Result<Self::Canvas, Self::Error>;
    /// Finish drawing on a target.
    fn end(&mut self, target: PaintTarget, canvas: Self::Canvas);
    /// Blend `surface` onto `onto`, mapping the surface's local coordinates
    /// through `transform`.
    fn composite(
        &mut self,
        surface: SurfaceId,
        onto: &mut Self::Canvas,
        transform: Affine,
    ) -> Result<(), Self::Error>;
}

/// Per-node context handed to the draw callback.
#[derive(Copy, Clone, Debug)]
pub struct PaintInfo {
    /// Maps the node's local coordinates to the current canvas.
    pub transform: Affine,
    /// The node's content rect, in local coordinates.
    pub content: Rect,
    /// Bounding box of the damage overlapping the content, in canvas
    /// coordinates. Drawing outside it is wasted.
    pub dirty: Rect,
}

/// A failed paint pass.
///
/// Pending damage survives the failure, so the next pass retries the same
/// work.
#[derive(Debug)]
pub struct PaintError<E> {
    /// The boundary node whose surface work failed, if attributable.
    pub node: Option<NodeId>,
    /// The backend's error.
    pub source: E,
}

impl<E: core::fmt::Debug> core::fmt::Display for PaintError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.node {
            Some(n) => write!(f, "paint pass failed at {n:?}: {:?}", self.source),
            None => write!(f, "paint pass failed: {:?}", self.source),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for PaintError<E> {}

impl Stage {
    /// Repaint everything covered by pending damage.
    ///
    /// `draw` is invoked for each node whose content overlaps the damage of
    /// the target it paints on, children first (a node's own content goes on
    /// top of its children). The root is included; with no pending damage the
    /// pass is a no-op apart from releasing retired surfaces.
    pub fn paint<C, F>(
        &mut self,
        compositor: &mut C,
        mut draw: F,
    ) -> Result<(), PaintError<C::Error>>
    where
        C: Compositor,
        F: FnMut(NodeId, &mut C::Canvas, &PaintInfo),
    {
        for surface in core::mem::take(&mut self.retired_surfaces) {
            compositor.release_surface(surface);
        }
        if self.root_damage.is_empty() {
            return Ok(());
        }
        let damage = self.root_damage.take();
        let root = self.root();
        let mut canvas = match compositor.begin(PaintTarget::Root, &damage) {
            Ok(canvas) => canvas,
            Err(source) => {
                self.root_damage.merge(&damage);
                return Err(PaintError { node: None, source });
            }
        };
        let result =
            self.paint_walk(root, Affine::IDENTITY, &damage, compositor, &mut canvas, &mut draw);
        compositor.end(PaintTarget::Root, canvas);
        if let Err(err) = result {
            self.root_damage.merge(&damage);
            return Err(err);
        }
        Ok(())
    }

    fn paint_walk<C, F>(
        &mut self,
        id: NodeId,
        to_target: Affine,
        target_damage: &DamageRegion,
        compositor: &mut C,
        canvas: &mut C::Canvas,
        draw: &mut F,
    ) -> Result<(), PaintError<C::Error>>
    where
        C: Compositor,
        F: FnMut(NodeId, &mut C::Canvas, &PaintInfo),
    {
        let v = self.node(id).visual.clone();
        if !v.flags.contains(NodeFlags::VISIBLE) || !is_positive_area(v.content_rect()) {
            return Ok(());
        }
        if self.offscreens.contains_key(&id) {
            // Never cull a boundary against the parent's damage before its
            // own target is pushed: the surface can be clean there yet dirty
            // inside.
            return self.paint_offscreen(id, &v, to_target, target_damage, compositor, canvas, draw);
        }
        let extent = transform_rect_bbox(to_target, self.subtree_extent_local(id));
        if !target_damage.intersects(extent) {
            return Ok(());
        }
        let children = self.node(id).children.clone();
        for child in children {
            let child_to_target = to_target * self.node(child).visual.to_parent();
            self.paint_walk(child, child_to_target, target_damage, compositor, canvas, draw)?;
        }
        let content_in_target = transform_rect_bbox(to_target, v.content_rect());
        if let Some(dirty) = target_damage.dirty_within(content_in_target) {
            let info = PaintInfo {
                transform: to_target,
                content: v.content_rect(),
                dirty,
            };
            draw(id, canvas, &info);
        }
        Ok(())
    }

    fn paint_offscreen<C, F>(
        &mut self,
        id: NodeId,
        v: &Visual,
        to_target: Affine,
        target_damage: &DamageRegion,
        compositor: &mut C,
        canvas: &mut C::Canvas,
        draw: &mut F,
    ) -> Result<(), PaintError<C::Error>>
    where
        C: Compositor,
        F: FnMut(NodeId, &mut C::Canvas, &PaintInfo),
    {
        let content = v.content_rect();
        let Some(entry) = self.offscreens.get(&id) else {
            return Ok(());
        };
        let surface = entry.surface;
        let needs_create = !entry.realized;
        let needs_resize = entry.realized && entry.size != content.size();
        if needs_create {
            compositor
                .create_surface(surface, content.size())
                .map_err(|source| PaintError { node: Some(id), source })?;
        } else if needs_resize {
            compositor
                .resize_surface(surface, content.size())
                .map_err(|source| PaintError { node: Some(id), source })?;
        }
        if let Some(entry) = self.offscreens.get_mut(&id) {
            if needs_create || needs_resize {
                entry.realized = true;
                entry.size = content.size();
            }
            if needs_resize {
                entry.damage.add(content);
            }
        }

        let own = match self.offscreens.get_mut(&id) {
            Some(entry) => entry.damage.take(),
            None => DamageRegion::new(),
        };
        if !own.is_empty() {
            let mut sub = match compositor.begin(PaintTarget::Surface(surface), &own) {
                Ok(canvas) => canvas,
                Err(source) => {
                    if let Some(entry) = self.offscreens.get_mut(&id) {
                        entry.damage.merge(&own);
                    }
                    return Err(PaintError { node: Some(id), source });
                }
            };
            let mut walked = Ok(());
            let children = self.node(id).children.clone();
            for child in children {
                let child_to_surface = self.node(child).visual.to_parent();
                walked = self.paint_walk(child, child_to_surface, &own, compositor, &mut sub, draw);
                if walked.is_err() {
                    break;
                }
            }
            if walked.is_ok()
                && let Some(dirty) = own.dirty_within(content)
            {
                let info = PaintInfo {
                    transform: Affine::IDENTITY,
                    content,
                    dirty,
                };
                draw(id, &mut sub, &info);
            }
            compositor.end(PaintTarget::Surface(surface), sub);
            if let Err(err) = walked {
                if let Some(entry) = self.offscreens.get_mut(&id) {
                    entry.damage.merge(&own);
                }
                return Err(err);
            }
        }

        let composite_area = transform_rect_bbox(to_target, content);
        if target_damage.intersects(composite_area) {
            compositor
                .composite(surface, canvas, to_target)
                .map_err(|source| PaintError { node: Some(id), source })?;
        }
        Ok(())
    }
}
