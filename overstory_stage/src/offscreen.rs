// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The offscreen compositing tree and upward damage propagation.
//!
//! Nodes that paint through a transform or clip own an offscreen surface.
//! Those entries form a second, sparser tree over the scene: each entry's
//! parent is the nearest boundary ancestor, and entries with no boundary
//! ancestor composite directly onto the root surface. Damage reported deep in
//! the scene accumulates in every entry it crosses on the way up, so a paint
//! pass can redraw each surface's dirty part and re-composite only where
//! needed.

use alloc::vec::Vec;
use kurbo::{Rect, Size};

use crate::damage::DamageRegion;
use crate::tree::Stage;
use crate::types::{NodeId, SurfaceId};
use crate::util::{is_positive_area, transform_rect_bbox};

/// Compositing state for one boundary node.
#[derive(Clone, Debug)]
pub(crate) struct OffscreenEntry {
    pub(crate) surface: SurfaceId,
    /// Nearest boundary ancestor; `None` composites onto the root surface.
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) damage: DamageRegion,
    /// Surface dimensions last announced to the compositor.
    pub(crate) size: Size,
    /// Whether the compositor has been asked to create the surface yet.
    pub(crate) realized: bool,
}

impl Stage {
    /// Queue a repaint of `rect`, in `id`'s local coordinates.
    ///
    /// The rect is clamped by every clipping node on the way up and dropped
    /// once it clips out entirely. It accumulates in each offscreen entry it
    /// crosses (starting with `id`'s own, if any) and finally lands in the
    /// root damage region. Damage on stale ids or detached subtrees is
    /// silently discarded.
    pub fn damage(&mut self, id: NodeId, rect: Rect) {
        if !self.is_alive(id) {
            return;
        }
        let mut cur = id;
        let mut rect = rect;
        loop {
            let v = &self.node(cur).visual;
            if v.clipped {
                rect = rect.intersect(v.content_rect());
            }
            if !is_positive_area(rect) {
                return;
            }
            if cur == self.root() {
                self.root_damage.add(rect);
                return;
            }
            if let Some(entry) = self.offscreens.get_mut(&cur) {
                entry.damage.add(rect);
            }
            rect = transform_rect_bbox(self.node(cur).visual.to_parent(), rect);
            match self.node(cur).parent {
                Some(p) => cur = p,
                None => return,
            }
        }
    }

    /// Returns true if the node currently owns an offscreen surface.
    pub fn has_offscreen(&self, id: NodeId) -> bool {
        self.offscreens.contains_key(&id)
    }

    /// For a node owning an offscreen surface, the nearest ancestor that also
    /// owns one, or `None` when it composites straight onto the root surface.
    pub fn offscreen_parent(&self, id: NodeId) -> Option<NodeId> {
        self.offscreens.get(&id)?.parent
    }

    /// Pending damage on a node's offscreen surface, if it owns one.
    pub fn offscreen_damage(&self, id: NodeId) -> Option<&DamageRegion> {
        self.offscreens.get(&id).map(|e| &e.damage)
    }

    /// Pending damage for the root surface.
    pub fn root_damage(&self) -> &DamageRegion {
        &self.root_damage
    }

    /// Take the root surface's pending damage, leaving it empty.
    ///
    /// Hosts driving their own renderer can use this instead of
    /// [`Stage::paint`].
    pub fn take_root_damage(&mut self) -> DamageRegion {
        self.root_damage.take()
    }

    /// Create or destroy `id`'s offscreen entry to match its visual state.
    ///
    /// Called after any mutation that can change whether the node paints
    /// through a transform or clip, or whether it is attached at all.
    pub(crate) fn ensure_offscreen(&mut self, id: NodeId) {
        let needs = id != self.root()
            && self.is_attached(id)
            && self.node(id).visual.is_boundary();
        let has = self.offscreens.contains_key(&id);
        if needs && !has {
            self.create_offscreen(id);
        } else if !needs && has {
            self.flatten_offscreen(id);
        }
    }

    /// Re-run [`Stage::ensure_offscreen`] over a whole subtree, top-down.
    pub(crate) fn rebuild_offscreens(&mut self, id: NodeId) {
        self.ensure_offscreen(id);
        let children = self.node(id).children.clone();
        for child in children {
            self.rebuild_offscreens(child);
        }
    }

    /// Destroy every offscreen entry inside `subtree` (inclusive), retiring
    /// their surfaces and unlinking them from surviving entries.
    pub(crate) fn destroy_offscreens_in(&mut self, subtree: NodeId) {
        let dead: Vec<NodeId> = self
            .offscreens
            .keys()
            .copied()
            .filter(|&n| n == subtree || self.has_ancestor(n, subtree))
            .collect();
        if dead.is_empty() {
            return;
        }
        for &d in &dead {
            if let Some(entry) = self.offscreens.remove(&d)
                && entry.realized
            {
                self.retired_surfaces.push(entry.surface);
            }
        }
        self.offscreen_roots.retain(|n| !dead.contains(n));
        for entry in self.offscreens.values_mut() {
            entry.children.retain(|n| !dead.contains(n));
        }
    }

    /// Returns true if `ancestor` is a strict ancestor of `node`.
    pub(crate) fn has_ancestor(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.node(node).parent;
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.node(n).parent;
        }
        false
    }

    /// Nearest strict ancestor of `id` that owns an offscreen entry.
    fn boundary_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.node(id).parent;
        while let Some(n) = cur {
            if self.offscreens.contains_key(&n) {
                return Some(n);
            }
            cur = self.node(n).parent;
        }
        None
    }

    fn create_offscreen(&mut self, id: NodeId) {
        let surface = SurfaceId(self.next_surface);
        self.next_surface += 1;
        let parent = self.boundary_ancestor(id);

        // Entries previously at this level that sit inside the new boundary
        // move under it.
        let level: &[NodeId] = match parent {
            Some(p) => self
                .offscreens
                .get(&p)
                .map(|e| e.children.as_slice())
                .unwrap_or(&[]),
            None => &self.offscreen_roots,
        };
        let captured: Vec<NodeId> = level
            .iter()
            .copied()
            .filter(|&n| self.has_ancestor(n, id))
            .collect();
        match parent {
            Some(p) => {
                if let Some(e) = self.offscreens.get_mut(&p) {
                    e.children.retain(|n| !captured.contains(n));
                    e.children.push(id);
                }
            }
            None => {
                self.offscreen_roots.retain(|n| !captured.contains(n));
                self.offscreen_roots.push(id);
            }
        }
        for &c in &captured {
            if let Some(e) = self.offscreens.get_mut(&c) {
                e.parent = Some(id);
            }
        }

        let content = self.node(id).visual.content_rect();
        let mut damage = DamageRegion::new();
        damage.add(content);
        self.offscreens.insert(
            id,
            OffscreenEntry {
                surface,
                parent,
                children: captured,
                damage,
                size: Size::ZERO,
                realized: false,
            },
        );
    }

    /// Remove `id`'s entry, handing its child entries to the enclosing level.
    fn flatten_offscreen(&mut self, id: NodeId) {
        let Some(entry) = self.offscreens.remove(&id) else {
            return;
        };
        if entry.realized {
            self.retired_surfaces.push(entry.surface);
        }
        match entry.parent {
            Some(p) => {
                if let Some(e) = self.offscreens.get_mut(&p) {
                    e.children.retain(|n| *n != id);
                    e.children.extend_from_slice(&entry.children);
                }
            }
            None => {
                self.offscreen_roots.retain(|n| *n != id);
                self.offscreen_roots.extend_from_slice(&entry.children);
            }
        }
        for &c in &entry.children {
            if let Some(e) = self.offscreens.get_mut(&c) {
                e.parent = entry.parent;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Stage;
    use crate::types::Visual;
    use kurbo::{Affine, Point};

    fn plain(rect: Rect) -> Visual {
        Visual {
            rect,
            ..Visual::default()
        }
    }

    #[test]
    fn transform_or_clip_creates_entry_and_clearing_flattens() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let a = stage.create(plain(Rect::new(10.0, 10.0, 110.0, 110.0)));
        stage.attach(stage.root(), a).unwrap();
        assert!(!stage.has_offscreen(a));

        stage.set_transform(a, Some(Affine::rotate(0.5)));
        assert!(stage.has_offscreen(a));

        // Still a boundary while either condition holds.
        stage.set_clipped(a, true);
        assert!(stage.has_offscreen(a));
        stage.set_transform(a, None);
        assert!(stage.has_offscreen(a));

        stage.set_clipped(a, false);
        assert!(!stage.has_offscreen(a));
    }

    #[test]
    fn entry_parents_follow_nearest_boundary_ancestor() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let a = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 300.0, 300.0),
            clipped: true,
            ..Visual::default()
        });
        let b = stage.create(plain(Rect::new(10.0, 10.0, 200.0, 200.0)));
        let c = stage.create(Visual {
            rect: Rect::new(5.0, 5.0, 100.0, 100.0),
            transform: Some(Affine::scale(2.0)),
            ..Visual::default()
        });
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();
        stage.attach(b, c).unwrap();

        assert!(stage.has_offscreen(a));
        assert!(!stage.has_offscreen(b));
        assert!(stage.has_offscreen(c));
        assert_eq!(stage.offscreen_parent(a), None);
        assert_eq!(stage.offscreen_parent(c), Some(a));
        assert_eq!(stage.offscreen_roots, [a]);
    }

    #[test]
    fn new_boundary_captures_descendant_entries() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let a = stage.create(plain(Rect::new(0.0, 0.0, 300.0, 300.0)));
        let b = stage.create(Visual {
            rect: Rect::new(10.0, 10.0, 110.0, 110.0),
            transform: Some(Affine::rotate(0.3)),
            ..Visual::default()
        });
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();
        assert_eq!(stage.offscreen_parent(b), None);

        // `a` becomes a boundary between the root and `b`.
        stage.set_clipped(a, true);
        assert_eq!(stage.offscreen_parent(b), Some(a));
        assert_eq!(stage.offscreen_roots, [a]);

        // And flattening `a` hands `b` back to the root level.
        stage.set_clipped(a, false);
        assert!(!stage.has_offscreen(a));
        assert_eq!(stage.offscreen_parent(b), None);
        assert_eq!(stage.offscreen_roots, [b]);
    }

    #[test]
    fn detach_destroys_subtree_entries() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let a = stage.create(plain(Rect::new(0.0, 0.0, 300.0, 300.0)));
        let b = stage.create(Visual {
            rect: Rect::new(10.0, 10.0, 110.0, 110.0),
            clipped: true,
            ..Visual::default()
        });
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();
        assert!(stage.has_offscreen(b));

        stage.detach(a).unwrap();
        assert!(!stage.has_offscreen(b));
        assert!(stage.offscreen_roots.is_empty());

        // Reattaching rebuilds the entry.
        stage.attach(stage.root(), a).unwrap();
        assert!(stage.has_offscreen(b));
    }

    #[test]
    fn damage_accumulates_in_crossed_entries_and_root() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let p = stage.create(Visual {
            rect: Rect::new(10.0, 10.0, 110.0, 110.0),
            clipped: true,
            ..Visual::default()
        });
        let c = stage.create(plain(Rect::new(0.0, 0.0, 200.0, 200.0)));
        stage.attach(stage.root(), p).unwrap();
        stage.attach(p, c).unwrap();
        stage.root_damage.clear();
        if let Some(e) = stage.offscreens.get_mut(&p) {
            e.damage.clear();
        }

        stage.damage(c, Rect::new(0.0, 0.0, 200.0, 200.0));
        // Clamped to the clip's 100x100 content, then offset into root space.
        assert_eq!(
            stage.offscreen_damage(p).and_then(DamageRegion::union),
            Some(Rect::new(0.0, 0.0, 100.0, 100.0))
        );
        assert_eq!(
            stage.root_damage().union(),
            Some(Rect::new(10.0, 10.0, 110.0, 110.0))
        );
    }

    #[test]
    fn damage_clipped_out_is_dropped() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let p = stage.create(Visual {
            rect: Rect::new(10.0, 10.0, 110.0, 110.0),
            clipped: true,
            ..Visual::default()
        });
        let c = stage.create(plain(Rect::new(150.0, 150.0, 250.0, 250.0)));
        stage.attach(stage.root(), p).unwrap();
        stage.attach(p, c).unwrap();
        stage.root_damage.clear();

        // `c` sits wholly outside `p`'s clip.
        stage.damage(c, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(stage.root_damage().is_empty());
    }

    #[test]
    fn damage_on_detached_island_is_dropped() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let a = stage.create(plain(Rect::new(0.0, 0.0, 50.0, 50.0)));
        stage.root_damage.clear();
        stage.damage(a, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert!(stage.root_damage().is_empty());
    }

    #[test]
    fn damage_maps_through_transforms() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let a = stage.create(Visual {
            rect: Rect::new(100.0, 100.0, 150.0, 150.0),
            transform: Some(Affine::scale(2.0)),
            ..Visual::default()
        });
        stage.attach(stage.root(), a).unwrap();
        stage.root_damage.clear();

        stage.damage(a, Rect::new(0.0, 0.0, 10.0, 10.0));
        // Scaled by 2, then offset by the allocation origin.
        assert_eq!(
            stage.root_damage().union(),
            Some(Rect::new(100.0, 100.0, 120.0, 120.0))
        );
        assert!(stage.root_damage().union().unwrap().contains(Point::new(110.0, 110.0)));
    }

    #[test]
    fn take_root_damage_leaves_empty() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let taken = stage.take_root_damage();
        assert!(!taken.is_empty());
        assert!(stage.root_damage().is_empty());
    }
}
