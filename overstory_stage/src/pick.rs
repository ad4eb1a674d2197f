// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point picking: map a point to the stack of interested nodes beneath it.

use kurbo::{Point, Shape};
use smallvec::SmallVec;

use crate::tree::Stage;
use crate::types::{EventMask, NodeFlags, NodeId, Visual};

/// Result of a pick: the hit path and the pick point in leaf coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Pick {
    /// Nodes on the hit path whose interest includes the picked class,
    /// outermost first.
    pub stack: SmallVec<[NodeId; 8]>,
    /// The pick point in the hit leaf's local coordinates.
    ///
    /// The leaf is the topmost node that hit. It is absent from `stack` when
    /// its own interest does not include the picked class.
    pub leaf_local: Point,
}

impl Pick {
    /// The innermost interested node, if any.
    pub fn leaf(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }
}

impl Stage {
    /// Find the topmost visible node under `point` (root coordinates) and
    /// return the interest-filtered path to it.
    ///
    /// Siblings are tried front to back, so the highest-depth hit wins. A
    /// clipped node swallows its whole subtree when the point falls outside
    /// its content; unclipped children remain pickable outside their parent's
    /// bounds. A node that hits but lacks interest in `class` still occludes
    /// everything painted beneath it.
    ///
    /// The root never hits on its own; attach a full-size child to catch
    /// picks over empty stage area.
    pub fn pick(&self, class: EventMask, point: Point) -> Option<Pick> {
        self.pick_from(self.root(), class, point)
    }

    /// As [`Stage::pick`], but restricted to `ancestor`'s subtree, with
    /// `point` in `ancestor`'s local coordinates.
    pub fn pick_from(&self, ancestor: NodeId, class: EventMask, point: Point) -> Option<Pick> {
        if !self.is_alive(ancestor) {
            return None;
        }
        let mut stack = SmallVec::new();
        let mut leaf_local = point;
        if self.pick_rec(ancestor, point, class, &mut stack, &mut leaf_local) {
            // Built leaf to root while unwinding.
            stack.reverse();
            Some(Pick { stack, leaf_local })
        } else {
            None
        }
    }

    /// Map `point` from root coordinates into `id`'s local coordinates.
    ///
    /// Returns `None` for stale ids and nodes not attached under the root.
    pub fn localize(&self, id: NodeId, point: Point) -> Option<Point> {
        if !self.is_attached(id) {
            return None;
        }
        let mut chain: SmallVec<[NodeId; 8]> = SmallVec::new();
        let mut cur = id;
        while cur != self.root() {
            chain.push(cur);
            cur = self.node(cur).parent?;
        }
        let mut local = point;
        for &n in chain.iter().rev() {
            local = self.node(n).visual.to_parent().inverse() * local;
        }
        Some(local)
    }

    /// The chain from the outermost ancestor down to `id`, inclusive.
    ///
    /// For an attached node the chain starts at the root; for a detached one
    /// it starts at the island's top. Stale ids yield an empty chain.
    pub fn ancestors_of(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut chain: SmallVec<[NodeId; 8]> = SmallVec::new();
        if !self.is_alive(id) {
            return chain;
        }
        let mut cur = Some(id);
        while let Some(n) = cur {
            chain.push(n);
            cur = self.node(n).parent;
        }
        chain.reverse();
        chain
    }

    fn pick_rec(
        &self,
        id: NodeId,
        local: Point,
        class: EventMask,
        stack: &mut SmallVec<[NodeId; 8]>,
        leaf_local: &mut Point,
    ) -> bool {
        let v = &self.node(id).visual;
        if !v.flags.contains(NodeFlags::VISIBLE) {
            return false;
        }
        let in_content = v.content_rect().contains(local);
        if v.clipped && !in_content {
            return false;
        }
        let mut found = false;
        for &child in self.node(id).children.iter().rev() {
            let child_local = self.node(child).visual.to_parent().inverse() * local;
            if self.pick_rec(child, child_local, class, stack, leaf_local) {
                found = true;
                break;
            }
        }
        if !found {
            // The root is a container, not content: it never hits on its
            // own, so a pick over empty stage area misses.
            if id == self.root() || !Self::hits(v, local, in_content) {
                return false;
            }
            *leaf_local = local;
        }
        if v.interest.intersects(class) {
            stack.push(id);
        }
        true
    }

    fn hits(v: &Visual, local: Point, in_content: bool) -> bool {
        match v.hit_shape {
            Some(shape) => shape.contains(local),
            None => in_content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Stage;
    use kurbo::{Affine, Rect, RoundedRect, Size};

    fn reactive(rect: Rect) -> Visual {
        Visual {
            rect,
            ..Visual::default()
        }
    }

    #[test]
    fn pick_nested_returns_path_and_leaf_coords() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let a = stage.create(reactive(Rect::new(50.0, 50.0, 150.0, 150.0)));
        let b = stage.create(reactive(Rect::new(0.0, 0.0, 50.0, 50.0)));
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();

        let pick = stage.pick(EventMask::POINTER, Point::new(60.0, 60.0)).unwrap();
        assert_eq!(&pick.stack[..], &[a, b]);
        assert_eq!(pick.leaf_local, Point::new(10.0, 10.0));
        assert_eq!(pick.leaf(), Some(b));
    }

    #[test]
    fn pick_misses_outside_everything() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let a = stage.create(reactive(Rect::new(50.0, 50.0, 150.0, 150.0)));
        stage.attach(stage.root(), a).unwrap();
        assert_eq!(stage.pick(EventMask::POINTER, Point::new(5.0, 5.0)), None);
    }

    #[test]
    fn topmost_sibling_wins() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let low = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            depth: 0,
            ..Visual::default()
        });
        let high = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            depth: 5,
            ..Visual::default()
        });
        stage.attach(stage.root(), low).unwrap();
        stage.attach(stage.root(), high).unwrap();

        let pick = stage.pick(EventMask::POINTER, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(pick.leaf(), Some(high));
    }

    #[test]
    fn uninterested_leaf_occludes_but_is_filtered() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let parent = stage.create(reactive(Rect::new(0.0, 0.0, 200.0, 200.0)));
        let below = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            depth: 0,
            ..Visual::default()
        });
        let cover = stage.create(Visual {
            rect: Rect::new(20.0, 20.0, 120.0, 120.0),
            depth: 5,
            interest: EventMask::empty(),
            ..Visual::default()
        });
        stage.attach(stage.root(), parent).unwrap();
        stage.attach(parent, below).unwrap();
        stage.attach(parent, cover).unwrap();

        // The cover hits first; the pick must not fall through to `below`.
        let pick = stage.pick(EventMask::POINTER, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(&pick.stack[..], &[parent]);
        assert_eq!(pick.leaf_local, Point::new(30.0, 30.0));
    }

    #[test]
    fn clipped_parent_swallows_outside_children() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let clipper = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 50.0, 50.0),
            clipped: true,
            depth: 5,
            ..Visual::default()
        });
        let child = stage.create(reactive(Rect::new(0.0, 0.0, 200.0, 200.0)));
        let under = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 200.0, 200.0),
            depth: 0,
            ..Visual::default()
        });
        stage.attach(stage.root(), clipper).unwrap();
        stage.attach(clipper, child).unwrap();
        stage.attach(stage.root(), under).unwrap();

        // Inside the clip: the child wins.
        let inside = stage.pick(EventMask::POINTER, Point::new(25.0, 25.0)).unwrap();
        assert_eq!(inside.leaf(), Some(child));
        // Outside the clip the subtree is invisible, so the pick falls
        // through to whatever is underneath.
        let outside = stage.pick(EventMask::POINTER, Point::new(100.0, 100.0)).unwrap();
        assert_eq!(outside.leaf(), Some(under));
    }

    #[test]
    fn unclipped_child_pickable_outside_parent_rect() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let parent = stage.create(reactive(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let child = stage.create(reactive(Rect::new(100.0, 100.0, 150.0, 150.0)));
        stage.attach(stage.root(), parent).unwrap();
        stage.attach(parent, child).unwrap();

        let pick = stage.pick(EventMask::POINTER, Point::new(120.0, 120.0)).unwrap();
        // The parent does not hit, but it is still on the path.
        assert_eq!(&pick.stack[..], &[parent, child]);
        assert_eq!(pick.leaf_local, Point::new(20.0, 20.0));
    }

    #[test]
    fn transforms_map_the_pick_point() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let a = stage.create(Visual {
            rect: Rect::new(100.0, 100.0, 200.0, 200.0),
            transform: Some(Affine::scale(2.0)),
            ..Visual::default()
        });
        stage.attach(stage.root(), a).unwrap();

        // Root (140, 140) → minus origin (100, 100) → unscaled (20, 20).
        let pick = stage.pick(EventMask::POINTER, Point::new(140.0, 140.0)).unwrap();
        assert_eq!(pick.leaf(), Some(a));
        assert_eq!(pick.leaf_local, Point::new(20.0, 20.0));
    }

    #[test]
    fn invisible_subtree_falls_through() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let top = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            depth: 5,
            ..Visual::default()
        });
        let bottom = stage.create(reactive(Rect::new(0.0, 0.0, 100.0, 100.0)));
        stage.attach(stage.root(), top).unwrap();
        stage.attach(stage.root(), bottom).unwrap();
        stage.set_visible(top, false);

        let pick = stage.pick(EventMask::POINTER, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(pick.leaf(), Some(bottom));
    }

    #[test]
    fn hit_shape_overrides_content_rect() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let rounded = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            hit_shape: Some(RoundedRect::new(0.0, 0.0, 100.0, 100.0, 40.0)),
            depth: 5,
            ..Visual::default()
        });
        let under = stage.create(reactive(Rect::new(0.0, 0.0, 200.0, 200.0)));
        stage.attach(stage.root(), rounded).unwrap();
        stage.attach(stage.root(), under).unwrap();

        // Center is inside the rounded shape, the extreme corner is not.
        let center = stage.pick(EventMask::POINTER, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(center.leaf(), Some(rounded));
        let corner = stage.pick(EventMask::POINTER, Point::new(2.0, 2.0)).unwrap();
        assert_eq!(corner.leaf(), Some(under));
    }

    #[test]
    fn class_filter_selects_different_stacks() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let pointer_only = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            interest: EventMask::POINTER,
            ..Visual::default()
        });
        let touch_child = stage.create(Visual {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            interest: EventMask::TOUCH,
            ..Visual::default()
        });
        stage.attach(stage.root(), pointer_only).unwrap();
        stage.attach(pointer_only, touch_child).unwrap();

        let p = stage.pick(EventMask::POINTER, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(&p.stack[..], &[pointer_only]);
        let t = stage.pick(EventMask::TOUCH, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(&t.stack[..], &[touch_child]);
    }

    #[test]
    fn pick_from_restricts_to_subtree() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let a = stage.create(reactive(Rect::new(50.0, 50.0, 150.0, 150.0)));
        let b = stage.create(reactive(Rect::new(10.0, 10.0, 60.0, 60.0)));
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();

        // Point in a's local space.
        let pick = stage.pick_from(a, EventMask::POINTER, Point::new(20.0, 20.0)).unwrap();
        assert_eq!(&pick.stack[..], &[a, b]);
        assert_eq!(pick.leaf_local, Point::new(10.0, 10.0));
    }

    #[test]
    fn localize_descends_through_origins_and_transforms() {
        let mut stage = Stage::new(Size::new(400.0, 400.0));
        let a = stage.create(reactive(Rect::new(100.0, 100.0, 300.0, 300.0)));
        let b = stage.create(Visual {
            rect: Rect::new(50.0, 50.0, 150.0, 150.0),
            transform: Some(Affine::scale(2.0)),
            ..Visual::default()
        });
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();

        // (200, 200) → a-local (100, 100) → minus b origin (50, 50) → /2.
        assert_eq!(stage.localize(b, Point::new(200.0, 200.0)), Some(Point::new(25.0, 25.0)));
        // Detached nodes have no root-relative position.
        let island = stage.create(reactive(Rect::ZERO));
        assert_eq!(stage.localize(island, Point::ORIGIN), None);
    }

    #[test]
    fn ancestors_run_root_to_leaf() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let a = stage.create(reactive(Rect::ZERO));
        let b = stage.create(reactive(Rect::ZERO));
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();
        assert_eq!(&stage.ancestors_of(b)[..], &[stage.root(), a, b]);
        assert_eq!(&stage.ancestors_of(stage.root())[..], &[stage.root()]);
    }
}
