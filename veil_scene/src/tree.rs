// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene tree: an arena of nodes addressed by generational ids.

use alloc::vec::Vec;

use kurbo::Point;
use veil_region::{IntRect, Region};

use crate::cullable::{Container, Cullable, NodeKind};
use crate::error::TreeError;
use crate::leaf::{Leaf, damage_is_visible, narrow_to_visible};
use crate::types::{ContentId, LeafRole, NodeFlags, NodeId};

#[derive(Clone, Debug)]
struct Node {
    bounds: IntRect,
    flags: NodeFlags,
    kind: NodeKind,
    parent: Option<NodeId>,
    /// Paint order: back to front.
    children: Vec<NodeId>,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Scene tree holding containers and leaves.
///
/// The tree owns every node. Parents own their children through ordered child
/// lists (back to front); the parent link is a plain id. Top-level nodes are
/// kept in [`Tree::roots`], also back to front.
///
/// Bounds are screen-space rectangles supplied by whoever lays out the scene.
///
/// Every mutation that can change what covers what (insertion, removal,
/// restacking, bounds, visibility, opacity) resets culling on the whole tree,
/// so visibility recorded before the change is never read after it.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    scratch: Vec<NodeId>,
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Top-level nodes, back to front.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Parent of a node, or `None` for top-level or stale nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node, back to front. Empty for stale nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The payload of a node.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    /// The leaf payload of a node, if it is a live leaf.
    pub fn leaf(&self, id: NodeId) -> Option<&Leaf> {
        self.kind(id)?.as_leaf()
    }

    /// Screen-space bounds of a node.
    pub fn bounds(&self, id: NodeId) -> Option<IntRect> {
        self.node(id).map(|n| n.bounds)
    }

    /// Flags of a node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node(id).map(|n| n.flags)
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Inserts a container on top of `parent`'s children (or of the roots).
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds `u32::MAX` slots.
    pub fn insert_container(
        &mut self,
        parent: Option<NodeId>,
        bounds: IntRect,
    ) -> Result<NodeId, TreeError> {
        self.insert(
            parent,
            bounds,
            NodeFlags::default(),
            NodeKind::Container(Container),
        )
    }

    /// Inserts a window surface together with its texture child.
    ///
    /// The texture child shares the surface's bounds and is not reactive, so
    /// picks resolve to the surface itself.
    pub fn insert_surface(
        &mut self,
        parent: Option<NodeId>,
        bounds: IntRect,
    ) -> Result<NodeId, TreeError> {
        let surface = self.insert(
            parent,
            bounds,
            NodeFlags::default(),
            NodeKind::Leaf(Leaf::new(LeafRole::Surface)),
        )?;
        self.insert(
            Some(surface),
            bounds,
            NodeFlags::VISIBLE,
            NodeKind::Leaf(Leaf::new(LeafRole::Texture)),
        )?;
        Ok(surface)
    }

    /// Inserts a background layer.
    pub fn insert_background(
        &mut self,
        parent: Option<NodeId>,
        bounds: IntRect,
    ) -> Result<NodeId, TreeError> {
        self.insert(
            parent,
            bounds,
            NodeFlags::VISIBLE,
            NodeKind::Leaf(Leaf::new(LeafRole::Background)),
        )
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        bounds: IntRect,
        flags: NodeFlags,
        kind: NodeKind,
    ) -> Result<NodeId, TreeError> {
        if let Some(p) = parent
            && !self.is_alive(p)
        {
            return Err(TreeError::StaleNode(p));
        }
        let node = Node {
            bounds,
            flags,
            kind,
            parent,
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.node = Some(node);
                NodeId::new(idx, slot.generation)
            }
            None => {
                assert!(
                    self.slots.len() < u32::MAX as usize,
                    "Too many nodes (max {})",
                    u32::MAX
                );
                #[expect(clippy::cast_possible_truncation, reason = "checked above")]
                let idx = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 1,
                    node: Some(node),
                });
                NodeId::new(idx, 1)
            }
        };
        self.siblings_mut(parent).push(id);
        self.invalidate();
        Ok(id)
    }

    /// Removes a node and its whole subtree.
    ///
    /// Ids of removed nodes become stale.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        let parent = self.node(id).ok_or(TreeError::StaleNode(id))?.parent;
        self.siblings_mut(parent).retain(|&c| c != id);
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            let slot = &mut self.slots[next.idx()];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                self.free.push(next.0);
            }
        }
        self.invalidate();
        Ok(())
    }

    /// Moves `child` (with its subtree) to the top of `parent`'s children.
    ///
    /// `None` makes it a top-level node.
    pub fn append_child(
        &mut self,
        parent: Option<NodeId>,
        child: NodeId,
    ) -> Result<(), TreeError> {
        let old_parent = self.node(child).ok_or(TreeError::StaleNode(child))?.parent;
        if let Some(p) = parent {
            if !self.is_alive(p) {
                return Err(TreeError::StaleNode(p));
            }
            let mut cursor = Some(p);
            while let Some(ancestor) = cursor {
                if ancestor == child {
                    return Err(TreeError::WouldCycle { parent: p, child });
                }
                cursor = self.parent(ancestor);
            }
        }
        self.siblings_mut(old_parent).retain(|&c| c != child);
        self.siblings_mut(parent).push(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = parent;
        }
        self.invalidate();
        Ok(())
    }

    /// Restacks `child` among its siblings; `0` is the bottom.
    ///
    /// Indices past the end move it to the top.
    pub fn set_child_index(&mut self, child: NodeId, index: usize) -> Result<(), TreeError> {
        let parent = self.node(child).ok_or(TreeError::StaleNode(child))?.parent;
        let siblings = self.siblings_mut(parent);
        siblings.retain(|&c| c != child);
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.invalidate();
        Ok(())
    }

    /// Updates the screen-space bounds of a node.
    ///
    /// A surface's texture child follows it.
    pub fn set_bounds(&mut self, id: NodeId, bounds: IntRect) -> Result<(), TreeError> {
        let node = self.node_mut(id).ok_or(TreeError::StaleNode(id))?;
        if node.bounds == bounds {
            return Ok(());
        }
        node.bounds = bounds;
        let is_surface = node
            .kind
            .as_leaf()
            .is_some_and(|l| l.role() == LeafRole::Surface);
        if is_surface
            && let Some(texture) = self.texture_of(id)
            && let Some(child) = self.node_mut(texture)
        {
            child.bounds = bounds;
        }
        self.invalidate();
        Ok(())
    }

    /// Updates the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), TreeError> {
        let node = self.node_mut(id).ok_or(TreeError::StaleNode(id))?;
        let changed = node.flags ^ flags;
        node.flags = flags;
        if changed.intersects(NodeFlags::VISIBLE | NodeFlags::OPAQUE) {
            self.invalidate();
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Leaf state
    // -------------------------------------------------------------------------

    /// Restricts (or, with `None`, unrestricts) the interactive shape of a
    /// leaf. The region is surface-local and stored as given.
    ///
    /// Input shape does not affect occlusion, so culling is left untouched.
    pub fn set_input_region(
        &mut self,
        id: NodeId,
        region: Option<Region>,
    ) -> Result<(), TreeError> {
        self.leaf_mut(id)?.set_input_region(region);
        Ok(())
    }

    /// Sets the surface-local region the content declares fully opaque.
    pub fn set_opaque_region(
        &mut self,
        id: NodeId,
        region: Option<Region>,
    ) -> Result<(), TreeError> {
        self.leaf_mut(id)?.set_opaque_region(region);
        self.invalidate();
        Ok(())
    }

    /// Marks whether the leaf's content is also shown by a mapped clone.
    ///
    /// A clone shows the whole subtree, so the flag affects every descendant,
    /// see [`Tree::has_mapped_clones`].
    pub fn set_has_mapped_clones(&mut self, id: NodeId, clones: bool) -> Result<(), TreeError> {
        self.leaf_mut(id)?.set_has_mapped_clones(clones);
        Ok(())
    }

    /// Attaches (or detaches) the drawable resource of a leaf.
    pub fn set_content(&mut self, id: NodeId, content: Option<ContentId>) -> Result<(), TreeError> {
        self.leaf_mut(id)?.set_content(content);
        Ok(())
    }

    /// Whether a mapped clone shows this node, directly or through an
    /// ancestor.
    ///
    /// While it does, recorded visibility below it is ignored by every
    /// consumer: the clone may put the content anywhere on screen.
    pub fn has_mapped_clones(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                return false;
            };
            if node.kind.as_leaf().is_some_and(Leaf::has_mapped_clones) {
                return true;
            }
            cursor = node.parent;
        }
        false
    }

    /// Whether the node and all its ancestors are [`NodeFlags::VISIBLE`].
    ///
    /// `false` for stale nodes.
    pub fn is_shown(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                return false;
            };
            if !node.flags.contains(NodeFlags::VISIBLE) {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    /// The texture child of a surface.
    pub fn texture_of(&self, surface: NodeId) -> Option<NodeId> {
        self.children(surface)
            .iter()
            .copied()
            .find(|&c| self.leaf(c).is_some_and(|l| l.role() == LeafRole::Texture))
    }

    // -------------------------------------------------------------------------
    // Culling
    // -------------------------------------------------------------------------

    /// Hands visibility to a node and, unchanged, to all its descendants.
    ///
    /// Leaves store their own copy of `unobscured`; containers store nothing.
    /// Children are visited front to back.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale: culling a detached node is a lifecycle bug.
    pub fn cull_out(&mut self, id: NodeId, unobscured: Option<&Region>, clip: Option<&Region>) {
        let Some(node) = self.node_mut(id) else {
            panic!("cull_out on stale node {id:?}");
        };
        node.kind.cull_out(unobscured, clip);
        for i in (0..node.children.len()).rev() {
            let child = self.slots[id.idx()]
                .node
                .as_ref()
                .map(|n| n.children[i]);
            if let Some(child) = child {
                self.cull_out(child, unobscured, clip);
            }
        }
    }

    /// Clears recorded visibility on a node and all its descendants.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn reset_culling(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            panic!("reset_culling on stale node {id:?}");
        };
        node.kind.reset_culling();
        for i in (0..node.children.len()).rev() {
            let child = self.slots[id.idx()]
                .node
                .as_ref()
                .map(|n| n.children[i]);
            if let Some(child) = child {
                self.reset_culling(child);
            }
        }
    }

    /// Clears recorded visibility on every node.
    pub fn reset_all_culling(&mut self) {
        for slot in &mut self.slots {
            if let Some(node) = &mut slot.node {
                node.kind.reset_culling();
            }
        }
    }

    fn invalidate(&mut self) {
        log::trace!("scene changed, resetting culling");
        self.reset_all_culling();
    }

    // -------------------------------------------------------------------------
    // Consumers
    // -------------------------------------------------------------------------

    /// The unobscured region recorded on a leaf.
    ///
    /// `None` means unknown: treat the leaf as fully visible.
    pub fn unobscured_region(&self, id: NodeId) -> Option<&Region> {
        self.leaf(id)?.unobscured_region()
    }

    /// The clip region a leaf received with its last cull.
    pub fn clip_region(&self, id: NodeId) -> Option<&Region> {
        self.leaf(id)?.clip_region()
    }

    /// The unobscured region consumers should honor: the recorded one,
    /// unless a mapped clone shows the leaf or one of its ancestors.
    pub fn effective_unobscured_region(&self, id: NodeId) -> Option<&Region> {
        if self.has_mapped_clones(id) {
            return None;
        }
        self.leaf(id)?.unobscured_region()
    }

    /// Extents of the effective unobscured region of a leaf.
    pub fn unobscured_bounds(&self, id: NodeId) -> Option<IntRect> {
        self.effective_unobscured_region(id).map(Region::extents)
    }

    /// Screen-space volume the renderer must consider for this node.
    ///
    /// For leaves, narrowed by the recorded visibility (see
    /// [`Leaf::paint_volume`]); containers report their bounds.
    pub fn paint_volume(&self, id: NodeId) -> Option<IntRect> {
        let node = self.node(id)?;
        Some(match &node.kind {
            NodeKind::Leaf(_) => narrow_to_visible(node.bounds, self.effective_unobscured_region(id)),
            NodeKind::Container(_) => node.bounds,
        })
    }

    /// Returns `true` only when the leaf is known to be fully hidden.
    pub fn is_obscured(&self, id: NodeId) -> bool {
        self.effective_unobscured_region(id)
            .is_some_and(Region::is_empty)
    }

    /// Leaves below `root` that contribute pixels, back to front.
    ///
    /// Hidden subtrees and leaves with an empty paint volume are skipped.
    pub fn paint_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let cloned = self.parent(root).is_some_and(|p| self.has_mapped_clones(p));
        self.collect_paint_order(root, cloned, &mut out);
        out
    }

    fn collect_paint_order(&self, id: NodeId, cloned: bool, out: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else { return };
        if !node.flags.contains(NodeFlags::VISIBLE) {
            return;
        }
        let mut cloned = cloned;
        if let NodeKind::Leaf(leaf) = &node.kind {
            cloned |= leaf.has_mapped_clones();
            let visible = if cloned {
                None
            } else {
                leaf.unobscured_region()
            };
            if !narrow_to_visible(node.bounds, visible).is_empty() {
                out.push(id);
            }
        }
        for &child in &node.children {
            self.collect_paint_order(child, cloned, out);
        }
    }

    /// Whether `pt` hits this node.
    ///
    /// The node must be visible and reactive. Leaves test their input region
    /// when set, otherwise their bounds; occlusion is not consulted.
    pub fn pick(&self, id: NodeId, pt: Point) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.flags.contains(NodeFlags::VISIBLE | NodeFlags::REACTIVE) {
            return false;
        }
        let (x, y) = pixel(pt);
        match &node.kind {
            NodeKind::Leaf(leaf) => leaf.pick_contains(node.bounds, x, y),
            NodeKind::Container(_) => node.bounds.contains(x, y),
        }
    }

    /// Topmost leaf picked at `pt`.
    pub fn hit_test_point(&self, pt: Point) -> Option<NodeId> {
        self.roots
            .iter()
            .rev()
            .find_map(|&root| self.hit_test_from(root, pt))
    }

    fn hit_test_from(&self, id: NodeId, pt: Point) -> Option<NodeId> {
        let node = self.node(id)?;
        if !node.flags.contains(NodeFlags::VISIBLE) {
            return None;
        }
        node.children
            .iter()
            .rev()
            .find_map(|&child| self.hit_test_from(child, pt))
            .or_else(|| {
                (matches!(node.kind, NodeKind::Leaf(_)) && self.pick(id, pt)).then_some(id)
            })
    }

    /// Reports damage to `area` (surface-local) of a leaf.
    ///
    /// Returns whether a redraw is needed: `false` when the node or one of
    /// its ancestors is hidden, or the damaged pixels are known to be
    /// obscured.
    pub fn damage_area(&self, id: NodeId, area: IntRect) -> Result<bool, TreeError> {
        let node = self.node(id).ok_or(TreeError::StaleNode(id))?;
        if node.kind.as_leaf().is_none() {
            return Err(TreeError::NotALeaf(id));
        }
        if !self.is_shown(id) {
            return Ok(false);
        }
        Ok(damage_is_visible(
            node.bounds,
            area,
            self.effective_unobscured_region(id),
        ))
    }

    /// Reports damage to the whole content of a leaf.
    pub fn damage_all(&self, id: NodeId) -> Result<bool, TreeError> {
        let bounds = self.bounds(id).ok_or(TreeError::StaleNode(id))?;
        self.damage_area(id, IntRect::new(0, 0, bounds.width, bounds.height))
    }

    /// Screen-space region this node hides from everything behind it.
    ///
    /// A leaf's declared opaque region when it has one; otherwise its bounds
    /// when flagged [`NodeFlags::OPAQUE`]; otherwise nothing. Hidden nodes
    /// never occlude.
    pub fn opaque_coverage(&self, id: NodeId) -> Option<Region> {
        let node = self.node(id)?;
        if !node.flags.contains(NodeFlags::VISIBLE) {
            return None;
        }
        let declared = node
            .kind
            .as_leaf()
            .and_then(|leaf| leaf.screen_opaque_region(node.bounds));
        match declared {
            Some(region) => Some(region),
            None if node.flags.contains(NodeFlags::OPAQUE) => Some(Region::from_rect(node.bounds)),
            None => None,
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn leaf_mut(&mut self, id: NodeId) -> Result<&mut Leaf, TreeError> {
        self.node_mut(id)
            .ok_or(TreeError::StaleNode(id))?
            .kind
            .as_leaf_mut()
            .ok_or(TreeError::NotALeaf(id))
    }

    /// The child list `parent` refers to; the roots for `None`.
    ///
    /// A stale `parent` yields a detached scratch list.
    fn siblings_mut(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        let Self {
            slots,
            roots,
            scratch,
            ..
        } = self;
        let Some(p) = parent else {
            return roots;
        };
        let node = slots
            .get_mut(p.idx())
            .filter(|slot| slot.generation == p.generation())
            .and_then(|slot| slot.node.as_mut());
        match node {
            Some(node) => &mut node.children,
            None => {
                debug_assert!(false, "sibling list of stale node {p:?}");
                scratch.clear();
                scratch
            }
        }
    }
}

/// The pixel containing `pt`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int `as` casts saturate, which is fine for pixel lookup"
)]
fn pixel(pt: Point) -> (i32, i32) {
    let pt = pt.floor();
    (pt.x as i32, pt.y as i32)
}
