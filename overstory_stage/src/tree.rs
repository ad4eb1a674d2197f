// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core stage structure: node arena, depth-ordered sibling lists, state
//! setters.

use alloc::vec::Vec;
use hashbrown::HashMap;
use kurbo::{Affine, Point, Rect, RoundedRect, Size};

use crate::damage::DamageRegion;
use crate::offscreen::OffscreenEntry;
use crate::types::{EventMask, NodeFlags, NodeId, SurfaceId, Visual};
use crate::util::transform_rect_bbox;

/// Errors reported by structural stage operations.
///
/// Misuse never corrupts the tree: a failed operation leaves all stage state
/// unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageError {
    /// A supplied node id is stale (already released, or from another stage).
    Stale,
    /// The child already has a parent.
    AlreadyAttached,
    /// The node has no parent.
    NotAttached,
    /// The attachment would make a node its own ancestor.
    WouldCycle,
    /// The operation does not apply to the stage root.
    RootNode,
}

impl core::fmt::Display for StageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::Stale => "stale node id",
            Self::AlreadyAttached => "node already has a parent",
            Self::NotAttached => "node has no parent",
            Self::WouldCycle => "attachment would create a cycle",
            Self::RootNode => "operation does not apply to the stage root",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for StageError {}

/// One run of same-depth siblings in a parent's child list.
///
/// A parent's `groups` are sorted ascending by `depth` and partition its
/// `children` into contiguous runs: group `k` covers the `len` children
/// starting at the sum of the lengths of groups `0..k`. Finding an insertion
/// point therefore scans groups, not children.
#[derive(Clone, Copy, Debug)]
struct DepthGroup {
    depth: i32,
    len: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    /// Paint order: back to front.
    pub(crate) children: Vec<NodeId>,
    groups: Vec<DepthGroup>,
    pub(crate) visual: Visual,
}

impl Node {
    fn new(generation: u32, visual: Visual) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            groups: Vec::new(),
            visual,
        }
    }
}

/// The stage: a depth-ordered scene tree plus the offscreen compositing tree,
/// pending damage, picking, and the paint walk.
///
/// Nodes are owned externally; the stage stores their pushed visual state in
/// an arena addressed by generational [`NodeId`]s. Mutations (attach, detach,
/// geometry setters) queue damage immediately; [`Stage::paint`] consumes the
/// pending damage on the next pass.
///
/// ## Example
///
/// ```rust
/// use kurbo::{Rect, Size};
/// use overstory_stage::{Stage, Visual};
///
/// let mut stage = Stage::new(Size::new(800.0, 600.0));
/// let panel = stage.create(Visual {
///     rect: Rect::new(10.0, 10.0, 210.0, 110.0),
///     ..Visual::default()
/// });
/// stage.attach(stage.root(), panel).unwrap();
/// assert_eq!(stage.children_of(stage.root()), &[panel]);
/// ```
pub struct Stage {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    pub(crate) offscreens: HashMap<NodeId, OffscreenEntry>,
    /// Entries composited directly onto the root surface.
    pub(crate) offscreen_roots: Vec<NodeId>,
    pub(crate) root_damage: DamageRegion,
    /// Surfaces whose entries died since the last paint pass.
    pub(crate) retired_surfaces: Vec<SurfaceId>,
    pub(crate) next_surface: u32,
}

impl core::fmt::Debug for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Stage")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("offscreens", &self.offscreens.len())
            .field("root_damage_rects", &self.root_damage.len())
            .finish_non_exhaustive()
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl Stage {
    /// Create a stage whose root surface covers `root_size`.
    ///
    /// The root node is created attached, positioned at the origin, and
    /// visible. It cannot be detached, released, transformed, or clipped. Its
    /// interest mask starts empty so pick stacks only contain nodes that
    /// opted in; use [`Stage::set_interest`] to receive stage-level events.
    pub fn new(root_size: Size) -> Self {
        let mut stage = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            offscreens: HashMap::new(),
            offscreen_roots: Vec::new(),
            root_damage: DamageRegion::new(),
            retired_surfaces: Vec::new(),
            next_surface: 0,
        };
        stage.root = stage.create(Visual {
            rect: Rect::from_origin_size(Point::ORIGIN, root_size),
            interest: EventMask::empty(),
            ..Visual::default()
        });
        stage.root_damage.add(stage.node(stage.root).visual.content_rect());
        stage
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a new, unattached node holding `visual`.
    ///
    /// The returned id is live immediately but the node participates in
    /// painting and picking only once attached under the root.
    pub fn create(&mut self, visual: Visual) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, visual));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, visual)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Release a node and its whole subtree, detaching it first if needed.
    ///
    /// All ids in the subtree become stale. Releasing a stale id or the root
    /// is a no-op.
    pub fn release(&mut self, id: NodeId) {
        if !self.is_alive(id) || id == self.root {
            return;
        }
        if self.node(id).parent.is_some() {
            let _ = self.detach(id);
        }
        self.free_subtree(id);
    }

    /// Attach `child` under `parent`, splicing it into the parent's sibling
    /// order by stacking depth.
    ///
    /// The insertion point is found by scanning the parent's depth groups
    /// (O(distinct depths)): the child lands immediately after the last
    /// previously-inserted sibling whose depth is less than or equal to its
    /// own. Offscreen entries for the attached subtree are (re)built and the
    /// child's extent is damaged.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), StageError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(StageError::Stale);
        }
        if child == self.root {
            return Err(StageError::RootNode);
        }
        if self.node(child).parent.is_some() {
            return Err(StageError::AlreadyAttached);
        }
        let mut cur = Some(parent);
        while let Some(n) = cur {
            if n == child {
                return Err(StageError::WouldCycle);
            }
            cur = self.node(n).parent;
        }
        self.splice_child(parent, child);
        self.rebuild_offscreens(child);
        self.damage_whole(child);
        Ok(())
    }

    /// Detach `child` from its parent, leaving its subtree intact but outside
    /// the stage.
    ///
    /// The vacated extent is damaged and every offscreen entry owned by the
    /// detached subtree is destroyed (surfaces are released on the next paint
    /// pass). Reattaching rebuilds them.
    pub fn detach(&mut self, child: NodeId) -> Result<(), StageError> {
        if !self.is_alive(child) {
            return Err(StageError::Stale);
        }
        if child == self.root {
            return Err(StageError::RootNode);
        }
        let Some(parent) = self.node(child).parent else {
            return Err(StageError::NotAttached);
        };
        self.damage_whole(child);
        self.destroy_offscreens_in(child);
        self.unsplice_child(parent, child);
        Ok(())
    }

    /// Change a node's stacking depth.
    ///
    /// On an attached node this re-splices it among its siblings; setting the
    /// current depth again moves the node to the end of its depth's run. On a
    /// detached node (or the root) only the stored value changes.
    pub fn set_depth(&mut self, id: NodeId, depth: i32) {
        let Some(parent) = self.parent_of(id) else {
            if let Some(n) = self.node_opt_mut(id) {
                n.visual.depth = depth;
            }
            return;
        };
        self.damage_whole(id);
        self.unsplice_child(parent, id);
        self.node_mut(id).visual.depth = depth;
        self.splice_child(parent, id);
    }

    /// Update the allocated rectangle.
    ///
    /// Both the vacated and the newly covered extents are damaged. On the
    /// root the origin is ignored; prefer [`Stage::set_root_size`].
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if id == self.root {
            self.set_root_size(rect.size());
            return;
        }
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.visual.rect == rect {
            return;
        }
        let old_size = n.visual.rect.size();
        self.damage_parent_extent(id);
        self.node_mut(id).visual.rect = rect;
        self.damage_parent_extent(id);
        if rect.size() != old_size
            && let Some(entry) = self.offscreens.get_mut(&id)
        {
            // The surface will be re-sized at paint time; its content must be
            // fully redrawn.
            entry.damage.add(Rect::from_origin_size(Point::ORIGIN, rect.size()));
        }
    }

    /// Resize the root surface, damaging the full root extent.
    pub fn set_root_size(&mut self, size: Size) {
        let root = self.root;
        let old = self.node(root).visual.content_rect();
        self.node_mut(root).visual.rect = Rect::from_origin_size(Point::ORIGIN, size);
        let new = self.node(root).visual.content_rect();
        self.root_damage.add(old);
        self.root_damage.add(new);
    }

    /// Update the local transform. Ignored on the root.
    ///
    /// Acquiring a first transform (with no clip set) creates the node's
    /// offscreen entry; clearing the last boundary condition destroys it,
    /// flattening any child entries into its parent surface.
    pub fn set_transform(&mut self, id: NodeId, transform: Option<Affine>) {
        if id == self.root {
            return;
        }
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.visual.transform == transform {
            return;
        }
        self.damage_parent_extent(id);
        self.node_mut(id).visual.transform = transform;
        self.ensure_offscreen(id);
        self.damage_parent_extent(id);
    }

    /// Update the clip-to-allocation flag. Ignored on the root.
    pub fn set_clipped(&mut self, id: NodeId, clipped: bool) {
        if id == self.root {
            return;
        }
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.visual.clipped == clipped {
            return;
        }
        self.damage_parent_extent(id);
        self.node_mut(id).visual.clipped = clipped;
        self.ensure_offscreen(id);
        self.damage_parent_extent(id);
    }

    /// Update visibility, damaging the node's extent on change.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        let Some(n) = self.node_opt_mut(id) else {
            return;
        };
        if n.visual.flags.contains(NodeFlags::VISIBLE) == visible {
            return;
        }
        self.node_mut(id).visual.flags.set(NodeFlags::VISIBLE, visible);
        if id == self.root {
            let full = self.node(id).visual.content_rect();
            self.root_damage.add(full);
        } else {
            self.damage_parent_extent(id);
        }
    }

    /// Update the event classes the node wants routed to it.
    pub fn set_interest(&mut self, id: NodeId, interest: EventMask) {
        if let Some(n) = self.node_opt_mut(id) {
            n.visual.interest = interest;
        }
    }

    /// Update the optional hit-region override (local coordinates).
    pub fn set_hit_shape(&mut self, id: NodeId, shape: Option<RoundedRect>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.visual.hit_shape = shape;
        }
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation
    /// matches the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns true if `id` is live and reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.node(cur).parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Returns the parent of a node if live, or `None` for the root, detached
    /// nodes, and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).parent
    }

    /// Get the children of a node in paint order, or an empty slice if the id
    /// is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Returns the stacking depth of a live node.
    pub fn depth_of(&self, id: NodeId) -> Option<i32> {
        self.visual_of(id).map(|v| v.depth)
    }

    /// Returns the allocated rectangle (parent coordinates) of a live node.
    pub fn rect_of(&self, id: NodeId) -> Option<Rect> {
        self.visual_of(id).map(|v| v.rect)
    }

    /// Returns a live node's pushed visual state.
    pub fn visual_of(&self, id: NodeId) -> Option<&Visual> {
        if !self.is_alive(id) {
            return None;
        }
        Some(&self.node(id).visual)
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Insert `child` into `parent`'s sibling order at the end of its depth's
    /// run, creating the run if absent.
    fn splice_child(&mut self, parent: NodeId, child: NodeId) {
        let depth = self.node(child).visual.depth;
        let p = self.node_mut(parent);
        let mut gi = 0;
        let mut at = 0_usize;
        while gi < p.groups.len() && p.groups[gi].depth <= depth {
            at += p.groups[gi].len as usize;
            gi += 1;
        }
        if gi > 0 && p.groups[gi - 1].depth == depth {
            p.groups[gi - 1].len += 1;
        } else {
            p.groups.insert(gi, DepthGroup { depth, len: 1 });
        }
        p.children.insert(at, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Remove `child` from `parent`'s sibling order, dropping its depth run
    /// when it empties.
    fn unsplice_child(&mut self, parent: NodeId, child: NodeId) {
        let depth = self.node(child).visual.depth;
        let p = self.node_mut(parent);
        if let Some(pos) = p.children.iter().position(|c| *c == child) {
            p.children.remove(pos);
            if let Some(gi) = p.groups.iter().position(|g| g.depth == depth) {
                p.groups[gi].len -= 1;
                if p.groups[gi].len == 0 {
                    p.groups.remove(gi);
                }
            }
        }
        self.node_mut(child).parent = None;
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.free_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Union of the node's content and all visible descendant extents, in
    /// local coordinates. A clipped node's extent is just its content.
    pub(crate) fn subtree_extent_local(&self, id: NodeId) -> Rect {
        let v = &self.node(id).visual;
        let mut extent = v.content_rect();
        if v.clipped {
            return extent;
        }
        for &child in &self.node(id).children {
            let cv = &self.node(child).visual;
            if !cv.flags.contains(NodeFlags::VISIBLE) {
                continue;
            }
            let child_extent = self.subtree_extent_local(child);
            extent = extent.union(transform_rect_bbox(cv.to_parent(), child_extent));
        }
        extent
    }

    /// Damage the node's full extent (subtree included) in its parent's
    /// space.
    pub(crate) fn damage_parent_extent(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let extent = self.subtree_extent_local(id);
        let rect = transform_rect_bbox(self.node(id).visual.to_parent(), extent);
        self.damage(parent, rect);
    }

    /// Damage the node's full extent, subtree included.
    pub(crate) fn damage_whole(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        let extent = self.subtree_extent_local(id);
        self.damage(id, extent);
    }

    #[cfg(test)]
    pub(crate) fn assert_sibling_invariants(&self, parent: NodeId) {
        let p = self.node(parent);
        let group_total: usize = p.groups.iter().map(|g| g.len as usize).sum();
        assert_eq!(group_total, p.children.len(), "group lengths must cover children");
        let mut prev = i32::MIN;
        for g in &p.groups {
            assert!(g.depth > prev, "groups must be sorted ascending");
            assert!(g.len > 0, "groups must be non-empty");
            prev = g.depth;
        }
        let mut prev_depth = i32::MIN;
        for &c in &p.children {
            let d = self.node(c).visual.depth;
            assert!(d >= prev_depth, "children must be depth-sorted");
            prev_depth = d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Visual;

    fn at_depth(depth: i32) -> Visual {
        Visual {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            depth,
            ..Visual::default()
        }
    }

    #[test]
    fn attach_orders_siblings_by_depth_then_insertion() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let root = stage.root();
        let a = stage.create(at_depth(0));
        let b = stage.create(at_depth(5));
        let c = stage.create(at_depth(0));
        let d = stage.create(at_depth(-2));
        stage.attach(root, a).unwrap();
        stage.attach(root, b).unwrap();
        stage.attach(root, c).unwrap();
        stage.attach(root, d).unwrap();
        assert_eq!(stage.children_of(root), &[d, a, c, b]);
        stage.assert_sibling_invariants(root);
    }

    #[test]
    fn lower_depth_sibling_precedes_existing_higher() {
        // root → A → B(depth 5); attaching C(depth 3) under A yields [C, B].
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let a = stage.create(at_depth(0));
        let b = stage.create(at_depth(5));
        let c = stage.create(at_depth(3));
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();
        stage.attach(a, c).unwrap();
        assert_eq!(stage.children_of(a), &[c, b]);
        stage.assert_sibling_invariants(a);
    }

    #[test]
    fn equal_depth_keeps_insertion_order() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let root = stage.root();
        let first = stage.create(at_depth(7));
        let second = stage.create(at_depth(7));
        let third = stage.create(at_depth(7));
        stage.attach(root, first).unwrap();
        stage.attach(root, second).unwrap();
        stage.attach(root, third).unwrap();
        assert_eq!(stage.children_of(root), &[first, second, third]);
    }

    #[test]
    fn attach_rejects_already_attached() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let a = stage.create(at_depth(0));
        let b = stage.create(at_depth(0));
        stage.attach(stage.root(), a).unwrap();
        stage.attach(stage.root(), b).unwrap();
        assert_eq!(stage.attach(a, b), Err(StageError::AlreadyAttached));
        // Order unchanged by the failed attach.
        assert_eq!(stage.children_of(stage.root()), &[a, b]);
        assert!(stage.children_of(a).is_empty());
    }

    #[test]
    fn attach_rejects_stale_cycle_and_root() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let a = stage.create(at_depth(0));
        let b = stage.create(at_depth(0));
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();

        let gone = stage.create(at_depth(0));
        stage.release(gone);
        assert_eq!(stage.attach(stage.root(), gone), Err(StageError::Stale));

        // `a` is an ancestor of `b`.
        stage.detach(a).unwrap();
        assert_eq!(stage.attach(b, a), Err(StageError::WouldCycle));
        assert_eq!(stage.attach(a, a), Err(StageError::WouldCycle));

        let other = stage.create(at_depth(0));
        assert_eq!(stage.attach(other, stage.root()), Err(StageError::RootNode));
    }

    #[test]
    fn detach_cleans_depth_groups() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let root = stage.root();
        let a = stage.create(at_depth(1));
        let b = stage.create(at_depth(2));
        stage.attach(root, a).unwrap();
        stage.attach(root, b).unwrap();
        stage.detach(a).unwrap();
        assert_eq!(stage.children_of(root), &[b]);
        stage.assert_sibling_invariants(root);
        assert_eq!(stage.parent_of(a), None);
        assert!(stage.is_alive(a), "detach must not release the node");
        assert!(!stage.is_attached(a));

        // A detached node can come back, at the end of its depth run.
        stage.attach(root, a).unwrap();
        assert_eq!(stage.children_of(root), &[a, b]);
        assert_eq!(stage.detach(a), Ok(()));
        assert_eq!(stage.detach(a), Err(StageError::NotAttached));
    }

    #[test]
    fn set_depth_moves_to_end_of_run() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let root = stage.root();
        let a = stage.create(at_depth(1));
        let b = stage.create(at_depth(1));
        let c = stage.create(at_depth(9));
        stage.attach(root, a).unwrap();
        stage.attach(root, b).unwrap();
        stage.attach(root, c).unwrap();

        // Same depth: restack to the end of the run.
        stage.set_depth(a, 1);
        assert_eq!(stage.children_of(root), &[b, a, c]);

        // New depth above everything.
        stage.set_depth(b, 10);
        assert_eq!(stage.children_of(root), &[a, c, b]);
        assert_eq!(stage.depth_of(b), Some(10));
        stage.assert_sibling_invariants(root);
    }

    #[test]
    fn set_depth_on_detached_only_records_value() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let a = stage.create(at_depth(1));
        stage.set_depth(a, 4);
        assert_eq!(stage.depth_of(a), Some(4));
        stage.attach(stage.root(), a).unwrap();
        assert_eq!(stage.depth_of(a), Some(4));
    }

    #[test]
    fn release_frees_subtree_and_reuses_slots() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let a = stage.create(at_depth(0));
        let b = stage.create(at_depth(0));
        stage.attach(stage.root(), a).unwrap();
        stage.attach(a, b).unwrap();
        stage.release(a);
        assert!(!stage.is_alive(a));
        assert!(!stage.is_alive(b));
        assert!(stage.children_of(stage.root()).is_empty());

        // Slots are reused with a bumped generation, so the old ids stay stale.
        let c = stage.create(at_depth(0));
        assert!(stage.is_alive(c));
        assert!(!stage.is_alive(a));
        assert!(!stage.is_alive(b));
    }

    #[test]
    fn root_cannot_be_detached_or_released() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        assert_eq!(stage.detach(stage.root()), Err(StageError::RootNode));
        stage.release(stage.root());
        assert!(stage.is_alive(stage.root()));
    }

    #[test]
    fn setters_ignore_stale_ids() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        let a = stage.create(at_depth(0));
        stage.release(a);
        stage.set_rect(a, Rect::new(0.0, 0.0, 5.0, 5.0));
        stage.set_transform(a, Some(Affine::scale(2.0)));
        stage.set_visible(a, false);
        stage.set_depth(a, 3);
        assert_eq!(stage.visual_of(a), None);
    }

    #[test]
    fn set_rect_queues_old_and_new_extents() {
        let mut stage = Stage::new(Size::new(200.0, 200.0));
        let a = stage.create(Visual {
            rect: Rect::new(10.0, 10.0, 30.0, 30.0),
            ..Visual::default()
        });
        stage.attach(stage.root(), a).unwrap();
        stage.root_damage.clear();

        stage.set_rect(a, Rect::new(100.0, 100.0, 140.0, 140.0));
        let union = stage.root_damage.union().expect("damage queued");
        assert!(union.contains(Point::new(15.0, 15.0)), "old extent dirty");
        assert!(union.contains(Point::new(120.0, 120.0)), "new extent dirty");
    }

    #[test]
    fn set_root_size_damages_full_root() {
        let mut stage = Stage::new(Size::new(100.0, 100.0));
        stage.root_damage.clear();
        stage.set_root_size(Size::new(300.0, 200.0));
        assert_eq!(
            stage.root_damage.union(),
            Some(Rect::new(0.0, 0.0, 300.0, 200.0))
        );
        assert_eq!(stage.rect_of(stage.root()), Some(Rect::new(0.0, 0.0, 300.0, 200.0)));
    }

    #[test]
    fn debug_summarizes_counts() {
        let mut stage = Stage::new(Size::new(10.0, 10.0));
        let a = stage.create(at_depth(0));
        stage.attach(stage.root(), a).unwrap();
        let s = alloc::format!("{stage:?}");
        assert!(s.contains("nodes_alive"), "debug output lists live count: {s}");
    }
}
