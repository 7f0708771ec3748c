// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, flags and leaf roles.

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
/// - Generations wrap around after `u32::MAX` reuses of one slot. An id kept across that many
///   reuses could alias a live node again; no other aliasing is possible.
///
/// ### Liveness
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
/// Stale `NodeId`s never alias a different live node because the generation must match.
/// Culling a stale node is a lifecycle bug upstream and panics.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Node flags controlling painting, picking and occlusion.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is shown. Hidden nodes are skipped by the cull pass and
        /// hit testing, together with their subtree.
        const VISIBLE  = 0b0000_0001;
        /// Node accepts pointer input.
        const REACTIVE = 0b0000_0010;
        /// Content is fully opaque over the node's bounds. Used when the
        /// node declares no opaque region of its own.
        const OPAQUE   = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::REACTIVE
    }
}

/// What a leaf node presents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LeafRole {
    /// Window content. Owns a [`LeafRole::Texture`] child.
    Surface,
    /// The texture presentation child of a surface.
    Texture,
    /// A background layer.
    Background,
}

/// Opaque reference to the drawable resource a leaf presents.
///
/// The texture provider owns the resource; the scene only carries the key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentId(pub u64);
