// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-leaf visibility bookkeeping.

use veil_region::{IntRect, Region};

use crate::cullable::Cullable;
use crate::types::{ContentId, LeafRole};

/// State of a drawable node: its content reference and visibility regions.
///
/// Coordinate spaces:
/// - The unobscured and clip regions are in screen space, as handed down by
///   the cull pass.
/// - The input and opaque regions are surface-local, relative to the node's
///   bounds origin, as delivered by the window system.
///
/// Absent regions are never "nothing": an absent unobscured region means
/// visibility is unknown and the leaf is treated as fully visible, and an
/// absent input region means the whole bounds accept input.
#[derive(Clone, Debug)]
pub struct Leaf {
    role: LeafRole,
    content: Option<ContentId>,
    unobscured: Option<Region>,
    clip: Option<Region>,
    input: Option<Region>,
    opaque: Option<Region>,
    has_mapped_clones: bool,
}

impl Leaf {
    /// A leaf with no content and all regions absent.
    pub fn new(role: LeafRole) -> Self {
        Self {
            role,
            content: None,
            unobscured: None,
            clip: None,
            input: None,
            opaque: None,
            has_mapped_clones: false,
        }
    }

    /// What this leaf presents.
    pub fn role(&self) -> LeafRole {
        self.role
    }

    /// The drawable resource, if one is attached.
    pub fn content(&self) -> Option<ContentId> {
        self.content
    }

    /// The region recorded by the last cull, or `None` after a reset.
    pub fn unobscured_region(&self) -> Option<&Region> {
        self.unobscured.as_ref()
    }

    /// The clip region received with the last cull, or `None` after a reset.
    ///
    /// Painting may skip pixels outside it. Unlike the unobscured region it
    /// is not clipped to anything, so it is the area still to be resolved
    /// for the whole frame.
    pub fn clip_region(&self) -> Option<&Region> {
        self.clip.as_ref()
    }

    /// The unobscured region consumers should honor.
    ///
    /// While the content is also shown by a mapped clone, the recorded region
    /// only describes one of its on-screen copies, so it is ignored. This
    /// only looks at the leaf's own flag; inside a tree, use
    /// [`Tree::effective_unobscured_region`](crate::Tree::effective_unobscured_region),
    /// which also honors clones of ancestors.
    pub fn effective_unobscured_region(&self) -> Option<&Region> {
        if self.has_mapped_clones {
            None
        } else {
            self.unobscured.as_ref()
        }
    }

    /// The interactive shape, if restricted.
    pub fn input_region(&self) -> Option<&Region> {
        self.input.as_ref()
    }

    /// The part of the content declared fully opaque.
    pub fn opaque_region(&self) -> Option<&Region> {
        self.opaque.as_ref()
    }

    /// Whether the content is currently shown by a clone as well.
    pub fn has_mapped_clones(&self) -> bool {
        self.has_mapped_clones
    }

    pub(crate) fn set_content(&mut self, content: Option<ContentId>) {
        self.content = content;
    }

    pub(crate) fn set_input_region(&mut self, region: Option<Region>) {
        self.input = region;
    }

    pub(crate) fn set_opaque_region(&mut self, region: Option<Region>) {
        self.opaque = region;
    }

    pub(crate) fn set_has_mapped_clones(&mut self, clones: bool) {
        self.has_mapped_clones = clones;
    }

    /// Narrows `bounds` to what may actually be visible.
    ///
    /// With a recorded region, reports the intersection of `bounds` with the
    /// region's extents, which is empty when the leaf is fully obscured.
    /// Without one, reports `bounds` unchanged.
    pub fn paint_volume(&self, bounds: IntRect) -> IntRect {
        narrow_to_visible(bounds, self.effective_unobscured_region())
    }

    /// Returns `true` only when visibility is known and nothing is visible.
    pub fn is_obscured(&self) -> bool {
        self.effective_unobscured_region()
            .is_some_and(Region::is_empty)
    }

    /// Whether the pixel `(x, y)` (screen space) hits this leaf.
    ///
    /// Occlusion plays no part here: the input region alone decides, falling
    /// back to `bounds` when absent.
    pub fn pick_contains(&self, bounds: IntRect, x: i32, y: i32) -> bool {
        match &self.input {
            Some(input) => input.contains_point(x - bounds.x, y - bounds.y),
            None => bounds.contains(x, y),
        }
    }

    /// Whether damage to `area` (surface-local) must be redrawn.
    ///
    /// Damage is dropped only when a recorded region proves the damaged
    /// pixels are hidden.
    pub fn needs_redraw(&self, bounds: IntRect, area: IntRect) -> bool {
        damage_is_visible(bounds, area, self.effective_unobscured_region())
    }

    /// The opaque region moved to screen space and clipped to `bounds`.
    pub fn screen_opaque_region(&self, bounds: IntRect) -> Option<Region> {
        let mut region = self.opaque.as_ref()?.translated(bounds.x, bounds.y);
        region.intersect_rect(bounds);
        Some(region)
    }
}

impl Cullable for Leaf {
    fn cull_out(&mut self, unobscured: Option<&Region>, clip: Option<&Region>) {
        // Own copies: the caller keeps shrinking its working regions.
        self.unobscured = unobscured.cloned();
        self.clip = clip.cloned();
    }

    fn reset_culling(&mut self) {
        self.unobscured = None;
        self.clip = None;
    }
}

/// `bounds` narrowed to the extents of `visible`; unchanged when unknown.
pub(crate) fn narrow_to_visible(bounds: IntRect, visible: Option<&Region>) -> IntRect {
    match visible {
        Some(region) => bounds.intersect(&region.extents()),
        None => bounds,
    }
}

/// Whether damage to `area` (local to `bounds`) touches `visible`.
pub(crate) fn damage_is_visible(bounds: IntRect, area: IntRect, visible: Option<&Region>) -> bool {
    let screen = area.translate(bounds.x, bounds.y).intersect(&bounds);
    if screen.is_empty() {
        return false;
    }
    match visible {
        Some(region) => {
            let mut hit = region.clone();
            hit.intersect_rect(screen);
            !hit.is_empty()
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: IntRect = IntRect::new(0, 0, 100, 100);

    #[test]
    fn fresh_leaf_is_fully_visible() {
        let leaf = Leaf::new(LeafRole::Surface);
        assert!(leaf.unobscured_region().is_none());
        assert_eq!(leaf.paint_volume(BOUNDS), BOUNDS);
        assert!(!leaf.is_obscured());
    }

    #[test]
    fn paint_volume_is_narrowed_to_extents() {
        let mut leaf = Leaf::new(LeafRole::Surface);
        leaf.cull_out(Some(&Region::from_rect(IntRect::new(10, 10, 50, 50))), None);
        assert_eq!(leaf.paint_volume(BOUNDS), IntRect::new(10, 10, 50, 50));
    }

    #[test]
    fn empty_region_gives_zero_area() {
        let mut leaf = Leaf::new(LeafRole::Background);
        leaf.cull_out(Some(&Region::new()), None);
        assert!(leaf.paint_volume(BOUNDS).is_empty());
        assert_eq!(leaf.paint_volume(BOUNDS).area(), 0);
        assert!(leaf.is_obscured());
    }

    #[test]
    fn reset_returns_to_absent() {
        let mut leaf = Leaf::new(LeafRole::Surface);
        leaf.cull_out(Some(&Region::new()), None);
        leaf.reset_culling();
        assert!(leaf.unobscured_region().is_none());
        leaf.reset_culling();
        assert!(leaf.unobscured_region().is_none());
        assert_eq!(leaf.paint_volume(BOUNDS), BOUNDS);
    }

    #[test]
    fn clip_is_stored_and_reset() {
        let clip = Region::from_rect(IntRect::new(0, 0, 30, 30));
        let mut leaf = Leaf::new(LeafRole::Surface);
        leaf.cull_out(Some(&Region::new()), Some(&clip));
        assert_eq!(leaf.clip_region(), Some(&clip));
        leaf.cull_out(Some(&Region::new()), None);
        assert_eq!(leaf.clip_region(), None);
        leaf.cull_out(None, Some(&clip));
        leaf.reset_culling();
        assert_eq!(leaf.clip_region(), None);
    }

    #[test]
    fn absent_argument_clears() {
        let mut leaf = Leaf::new(LeafRole::Surface);
        leaf.cull_out(Some(&Region::from_rect(BOUNDS)), None);
        leaf.cull_out(None, None);
        assert!(leaf.unobscured_region().is_none());
    }

    #[test]
    fn cull_out_is_idempotent_and_snapshots() {
        let mut working = Region::from_rect(IntRect::new(0, 0, 80, 80));
        let mut leaf = Leaf::new(LeafRole::Surface);
        leaf.cull_out(Some(&working), None);
        let first = leaf.unobscured_region().cloned();
        leaf.cull_out(Some(&working), None);
        assert_eq!(leaf.unobscured_region(), first.as_ref());
        assert_eq!(leaf.unobscured_region(), Some(&working));

        working.subtract_rect(IntRect::new(0, 0, 80, 40));
        assert_eq!(
            leaf.unobscured_region().map(Region::extents),
            Some(IntRect::new(0, 0, 80, 80))
        );
    }

    #[test]
    fn input_region_ignores_occlusion() {
        let mut leaf = Leaf::new(LeafRole::Surface);
        leaf.set_input_region(Some(Region::from_rect(IntRect::new(0, 0, 10, 10))));
        leaf.cull_out(Some(&Region::from_rect(IntRect::new(50, 50, 10, 10))), None);
        assert!(leaf.pick_contains(BOUNDS, 5, 5));
        assert!(!leaf.pick_contains(BOUNDS, 55, 55));
    }

    #[test]
    fn input_region_is_surface_local() {
        let bounds = IntRect::new(200, 100, 50, 50);
        let mut leaf = Leaf::new(LeafRole::Surface);
        assert!(leaf.pick_contains(bounds, 249, 149));
        leaf.set_input_region(Some(Region::from_rect(IntRect::new(0, 0, 10, 10))));
        assert!(leaf.pick_contains(bounds, 205, 105));
        assert!(!leaf.pick_contains(bounds, 5, 5));
        assert!(!leaf.pick_contains(bounds, 249, 149));
    }

    #[test]
    fn mapped_clones_disable_narrowing() {
        let mut leaf = Leaf::new(LeafRole::Surface);
        leaf.cull_out(Some(&Region::new()), None);
        leaf.set_has_mapped_clones(true);
        assert!(leaf.unobscured_region().is_some());
        assert_eq!(leaf.paint_volume(BOUNDS), BOUNDS);
        assert!(!leaf.is_obscured());
        assert!(leaf.needs_redraw(BOUNDS, IntRect::new(0, 0, 1, 1)));
    }

    #[test]
    fn damage_outside_visible_area_is_dropped() {
        let bounds = IntRect::new(100, 100, 100, 100);
        let mut leaf = Leaf::new(LeafRole::Surface);
        assert!(leaf.needs_redraw(bounds, IntRect::new(0, 0, 10, 10)));

        leaf.cull_out(Some(&Region::from_rect(IntRect::new(150, 150, 50, 50))), None);
        assert!(!leaf.needs_redraw(bounds, IntRect::new(0, 0, 10, 10)));
        assert!(leaf.needs_redraw(bounds, IntRect::new(45, 45, 10, 10)));
        // Damage outside the surface never counts.
        assert!(!leaf.needs_redraw(bounds, IntRect::new(500, 500, 10, 10)));
    }

    #[test]
    fn opaque_region_moves_to_screen() {
        let bounds = IntRect::new(10, 20, 30, 30);
        let mut leaf = Leaf::new(LeafRole::Surface);
        assert!(leaf.screen_opaque_region(bounds).is_none());
        leaf.set_opaque_region(Some(Region::from_rect(IntRect::new(0, 0, 100, 10))));
        assert_eq!(
            leaf.screen_opaque_region(bounds),
            Some(Region::from_rect(IntRect::new(10, 20, 30, 10)))
        );
    }
}
