// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pending-damage regions: small sets of dirty rectangles.

use kurbo::Rect;
use smallvec::SmallVec;

use crate::util::{is_positive_area, rect_contains_rect, rects_overlap};

/// Past this many rectangles a region collapses to its union bound.
const MAX_RECTS: usize = 8;

/// A pending-damage region: rectangles that must be repainted.
///
/// Rectangles are kept loose, not a minimal cover: adding a rectangle absorbs
/// ones it contains and is dropped when already contained, and once the set
/// grows past a small cap it collapses to the single union bound. That keeps
/// per-frame bookkeeping cheap while still bounding a paint traversal.
#[derive(Clone, Debug, Default)]
pub struct DamageRegion {
    rects: SmallVec<[Rect; 4]>,
}

impl DamageRegion {
    /// Create an empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing is dirty.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Number of rectangles currently held.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Add a dirty rectangle. Zero-area rectangles are ignored.
    pub fn add(&mut self, rect: Rect) {
        if !is_positive_area(rect) {
            return;
        }
        for r in &self.rects {
            if rect_contains_rect(*r, rect) {
                return;
            }
        }
        self.rects.retain(|r| !rect_contains_rect(rect, *r));
        self.rects.push(rect);
        if self.rects.len() > MAX_RECTS
            && let Some(u) = self.union()
        {
            self.rects.clear();
            self.rects.push(u);
        }
    }

    /// Merge another region into this one.
    pub fn merge(&mut self, other: &Self) {
        for r in &other.rects {
            self.add(*r);
        }
    }

    /// Whether any dirty rectangle overlaps `rect` over a positive area.
    pub fn intersects(&self, rect: Rect) -> bool {
        self.rects.iter().any(|r| rects_overlap(*r, rect))
    }

    /// Bounding box of the dirty area overlapping `rect`, if any.
    pub fn dirty_within(&self, rect: Rect) -> Option<Rect> {
        let mut acc: Option<Rect> = None;
        for r in &self.rects {
            let hit = r.intersect(rect);
            if is_positive_area(hit) {
                acc = Some(match acc {
                    Some(a) => a.union(hit),
                    None => hit,
                });
            }
        }
        acc
    }

    /// Returns the union of all dirty rects.
    pub fn union(&self) -> Option<Rect> {
        let mut it = self.rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// Iterate the dirty rectangles.
    pub fn iter(&self) -> impl Iterator<Item = Rect> + '_ {
        self.rects.iter().copied()
    }

    /// Take the region, leaving this one empty.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// Drop all dirty rectangles.
    pub fn clear(&mut self) {
        self.rects.clear();
    }
}
