// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame cull pass and its occlusion policies.

use hashbrown::HashSet;
use veil_region::Region;

use crate::cullable::NodeKind;
use crate::trace::CullTrace;
use crate::tree::Tree;
use crate::types::{NodeFlags, NodeId};

/// Decides what each leaf hides from the nodes behind it.
///
/// The pass asks after the leaf has recorded its own visibility, so a leaf
/// never occludes itself.
pub trait OcclusionPolicy {
    /// Screen-space region `node` covers for everything painted before it.
    fn occluder(&mut self, tree: &Tree, node: NodeId) -> Option<Region>;
}

/// Nothing occludes anything: every leaf records the incoming region.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOcclusion;

impl OcclusionPolicy for NoOcclusion {
    #[inline]
    fn occluder(&mut self, _tree: &Tree, _node: NodeId) -> Option<Region> {
        None
    }
}

/// Leaves occlude their opaque coverage, see [`Tree::opaque_coverage`].
#[derive(Copy, Clone, Debug, Default)]
pub struct SubtractOpaque;

impl OcclusionPolicy for SubtractOpaque {
    fn occluder(&mut self, tree: &Tree, node: NodeId) -> Option<Region> {
        tree.opaque_coverage(node)
    }
}

/// Options for a [`CullPass`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PassConfig {
    /// Reset culling below the root before walking it, so nodes the pass
    /// skips (hidden ones) are left fully visible rather than stale.
    pub reset_first: bool,
    /// Also remove occluders from the clip region, not only from the
    /// unobscured region.
    pub shrink_clip: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            reset_first: true,
            shrink_clip: true,
        }
    }
}

/// Counters from one [`CullPass::run`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CullStats {
    /// Visible nodes walked, containers included.
    pub visited: usize,
    /// Leaves that recorded a region.
    pub recorded: usize,
    /// Leaves that recorded an empty region.
    pub obscured: usize,
}

/// Walks a tree front to back once per frame, computing visibility.
///
/// The pass owns two working regions, seeded from the caller's:
///
/// - `unobscured`: screen area not yet covered by anything walked so far.
/// - `clip`: screen area still to be resolved this frame.
///
/// Containers share the working regions with their children, so what one
/// child occludes is gone for every sibling behind it. Each leaf receives a
/// snapshot of the working unobscured region clipped to its bounds through
/// [`Tree::cull_out`], which also hands it to the leaf's own children. The
/// [`OcclusionPolicy`] then decides what to subtract before the walk moves
/// on to the nodes behind.
///
/// Hidden subtrees are skipped: they record nothing and occlude nothing.
///
/// Reuse one pass across frames to keep its allocations.
#[derive(Clone, Debug, Default)]
pub struct CullPass {
    config: PassConfig,
    visited: HashSet<NodeId>,
    unobscured: Region,
    clip: Region,
}

impl CullPass {
    /// Creates a pass with the given options.
    #[must_use]
    pub fn new(config: PassConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The options of this pass.
    pub fn config(&self) -> PassConfig {
        self.config
    }

    /// Screen area no visited leaf covered during the last run.
    ///
    /// Whatever is left here shows the stage behind the scene.
    pub fn uncovered(&self) -> &Region {
        &self.unobscured
    }

    /// The clip region left after the last run.
    ///
    /// Equal to the clip passed in unless [`PassConfig::shrink_clip`] is set.
    pub fn remaining_clip(&self) -> &Region {
        &self.clip
    }

    /// Computes visibility for `root` and everything below it.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale, or if a node is reached twice.
    pub fn run<P, T>(
        &mut self,
        tree: &mut Tree,
        root: NodeId,
        unobscured: &Region,
        clip: &Region,
        policy: &mut P,
        trace: &mut T,
    ) -> CullStats
    where
        P: OcclusionPolicy + ?Sized,
        T: CullTrace + ?Sized,
    {
        assert!(tree.is_alive(root), "cull pass on stale node {root:?}");
        if self.config.reset_first {
            tree.reset_culling(root);
        }
        self.visited.clear();
        self.unobscured.clone_from(unobscured);
        self.clip.clone_from(clip);

        let mut walk = Walk {
            config: self.config,
            visited: &mut self.visited,
            unobscured: &mut self.unobscured,
            clip: &mut self.clip,
            stats: CullStats::default(),
        };
        walk.visit(tree, root, policy, trace);
        let stats = walk.stats;
        log::debug!("cull pass from {root:?}: {stats:?}");
        stats
    }
}

struct Walk<'a> {
    config: PassConfig,
    visited: &'a mut HashSet<NodeId>,
    unobscured: &'a mut Region,
    clip: &'a mut Region,
    stats: CullStats,
}

impl Walk<'_> {
    fn visit<P, T>(&mut self, tree: &mut Tree, id: NodeId, policy: &mut P, trace: &mut T)
    where
        P: OcclusionPolicy + ?Sized,
        T: CullTrace + ?Sized,
    {
        assert!(
            self.visited.insert(id),
            "node {id:?} reached twice in one cull pass"
        );
        let (Some(flags), Some(bounds), Some(kind)) = (tree.flags(id), tree.bounds(id), tree.kind(id))
        else {
            panic!("cull pass reached stale node {id:?}");
        };
        if !flags.contains(NodeFlags::VISIBLE) {
            return;
        }
        self.stats.visited += 1;

        if matches!(kind, NodeKind::Container(_)) {
            for i in (0..tree.children(id).len()).rev() {
                let child = tree.children(id)[i];
                self.visit(tree, child, policy, trace);
            }
            return;
        }

        let mut snapshot = self.unobscured.clone();
        snapshot.intersect_rect(bounds);
        tree.cull_out(id, Some(&snapshot), Some(&*self.clip));
        self.stats.recorded += 1;
        if snapshot.is_empty() {
            self.stats.obscured += 1;
        }
        log::trace!("cull {id:?}: unobscured {snapshot:?}");
        trace.recorded(id, &snapshot);

        if let Some(occluder) = policy.occluder(tree, id)
            && !occluder.is_empty()
        {
            trace.occluded(id, &occluder);
            self.unobscured.subtract(&occluder);
            if self.config.shrink_clip {
                self.clip.subtract(&occluder);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{CullEvent, CullRecorder};
    use veil_region::IntRect;

    fn rect(x: i32, y: i32, w: i32, h: i32) -> IntRect {
        IntRect::new(x, y, w, h)
    }

    fn screen() -> Region {
        Region::from_rect(rect(0, 0, 100, 100))
    }

    #[test]
    fn opaque_front_leaf_shrinks_region_behind() {
        let mut tree = Tree::new();
        let group = tree.insert_container(None, rect(0, 0, 100, 100)).unwrap();
        let back = tree.insert_surface(Some(group), rect(0, 0, 100, 100)).unwrap();
        let front = tree.insert_surface(Some(group), rect(0, 0, 50, 50)).unwrap();
        tree.set_flags(front, NodeFlags::default() | NodeFlags::OPAQUE)
            .unwrap();

        let mut pass = CullPass::default();
        let mut recorder = CullRecorder::new();
        let stats = pass.run(
            &mut tree,
            group,
            &screen(),
            &screen(),
            &mut SubtractOpaque,
            &mut recorder,
        );

        let mut expected = screen();
        expected.subtract_rect(rect(0, 0, 50, 50));
        assert_eq!(tree.unobscured_region(back), Some(&expected));
        assert_eq!(
            tree.unobscured_region(front),
            Some(&Region::from_rect(rect(0, 0, 50, 50)))
        );
        assert_eq!(recorder.culled_order(), &[front, back]);
        assert_eq!(
            stats,
            CullStats {
                visited: 3,
                recorded: 2,
                obscured: 0
            }
        );
    }

    #[test]
    fn no_occlusion_hands_everyone_the_same_region() {
        let mut tree = Tree::new();
        let group = tree.insert_container(None, rect(0, 0, 100, 100)).unwrap();
        let a = tree.insert_background(Some(group), rect(0, 0, 100, 100)).unwrap();
        let b = tree.insert_background(Some(group), rect(0, 0, 100, 100)).unwrap();
        tree.set_flags(b, NodeFlags::VISIBLE | NodeFlags::OPAQUE).unwrap();

        CullPass::default().run(&mut tree, group, &screen(), &screen(), &mut NoOcclusion, &mut ());
        assert_eq!(tree.unobscured_region(a), Some(&screen()));
        assert_eq!(tree.unobscured_region(b), Some(&screen()));
    }

    #[test]
    fn fully_covered_leaf_is_obscured() {
        let mut tree = Tree::new();
        let group = tree.insert_container(None, rect(0, 0, 100, 100)).unwrap();
        let bg = tree.insert_background(Some(group), rect(0, 0, 100, 100)).unwrap();
        let win = tree.insert_surface(Some(group), rect(0, 0, 100, 100)).unwrap();
        tree.set_opaque_region(win, Some(Region::from_rect(rect(0, 0, 100, 100))))
            .unwrap();

        let stats = CullPass::default().run(
            &mut tree,
            group,
            &screen(),
            &screen(),
            &mut SubtractOpaque,
            &mut (),
        );
        assert!(tree.is_obscured(bg));
        assert_eq!(tree.paint_volume(bg).map(|r| r.area()), Some(0));
        assert_eq!(tree.paint_order(group), &[win, tree.texture_of(win).unwrap()]);
        assert_eq!(stats.obscured, 1);
    }

    #[test]
    fn hidden_nodes_neither_record_nor_occlude() {
        let mut tree = Tree::new();
        let group = tree.insert_container(None, rect(0, 0, 100, 100)).unwrap();
        let bg = tree.insert_background(Some(group), rect(0, 0, 100, 100)).unwrap();
        let win = tree.insert_surface(Some(group), rect(0, 0, 100, 100)).unwrap();
        tree.set_flags(win, NodeFlags::OPAQUE).unwrap();

        // A stale snapshot on the hidden window must not survive the pass.
        tree.cull_out(win, Some(&Region::new()), None);
        CullPass::default().run(
            &mut tree,
            group,
            &screen(),
            &screen(),
            &mut SubtractOpaque,
            &mut (),
        );
        assert_eq!(tree.unobscured_region(win), None);
        assert_eq!(tree.unobscured_region(bg), Some(&screen()));
    }

    #[test]
    fn clip_shrinks_only_when_configured() {
        let mut tree = Tree::new();
        let group = tree.insert_container(None, rect(0, 0, 100, 100)).unwrap();
        let back = tree.insert_background(Some(group), rect(0, 0, 100, 100)).unwrap();
        let front = tree.insert_background(Some(group), rect(0, 0, 100, 40)).unwrap();
        tree.set_flags(front, NodeFlags::VISIBLE | NodeFlags::OPAQUE).unwrap();

        let mut recorder = CullRecorder::new();
        let mut pass = CullPass::new(PassConfig {
            reset_first: true,
            shrink_clip: false,
        });
        assert!(!pass.config().shrink_clip);
        pass.run(&mut tree, group, &screen(), &screen(), &mut SubtractOpaque, &mut recorder);

        let occluded = recorder
            .events()
            .iter()
            .filter(|e| matches!(e, CullEvent::Occluded { .. }))
            .count();
        assert_eq!(occluded, 1, "only the front layer is opaque");
        assert_eq!(
            recorder.recorded_for(back),
            Some(&Region::from_rect(rect(0, 40, 100, 60)))
        );
        let rest = Region::from_rect(rect(0, 40, 100, 60));
        assert_eq!(pass.remaining_clip(), &screen());
        assert_eq!(pass.uncovered(), &rest);

        let mut pass = CullPass::default();
        pass.run(&mut tree, group, &screen(), &screen(), &mut SubtractOpaque, &mut ());
        assert_eq!(pass.remaining_clip(), &rest);
        assert_eq!(pass.uncovered(), &rest);
    }

    #[test]
    fn nested_containers_share_working_region() {
        let mut tree = Tree::new();
        let stage = tree.insert_container(None, rect(0, 0, 100, 100)).unwrap();
        let backgrounds = tree.insert_container(Some(stage), rect(0, 0, 100, 100)).unwrap();
        let bg = tree.insert_background(Some(backgrounds), rect(0, 0, 100, 100)).unwrap();
        let windows = tree.insert_container(Some(stage), rect(0, 0, 100, 100)).unwrap();
        let left = tree.insert_surface(Some(windows), rect(0, 0, 50, 100)).unwrap();
        let right = tree.insert_surface(Some(windows), rect(50, 0, 50, 100)).unwrap();
        for win in [left, right] {
            tree.set_opaque_region(win, Some(Region::from_rect(rect(0, 0, 50, 50))))
                .unwrap();
        }

        CullPass::default().run(
            &mut tree,
            stage,
            &screen(),
            &screen(),
            &mut SubtractOpaque,
            &mut (),
        );
        assert_eq!(
            tree.unobscured_region(bg),
            Some(&Region::from_rect(rect(0, 50, 100, 50)))
        );
        assert_eq!(
            tree.unobscured_bounds(left),
            Some(rect(0, 0, 50, 100)),
            "right window does not overlap left"
        );
    }

    #[test]
    #[should_panic(expected = "cull pass on stale node")]
    fn stale_root_panics() {
        let mut tree = Tree::new();
        let root = tree.insert_container(None, rect(0, 0, 10, 10)).unwrap();
        tree.remove(root).unwrap();
        CullPass::default().run(&mut tree, root, &screen(), &screen(), &mut NoOcclusion, &mut ());
    }
}
