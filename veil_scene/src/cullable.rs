// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cull protocol and the closed set of node payloads implementing it.

use veil_region::Region;

use crate::leaf::Leaf;

/// Participation in the per-frame occlusion pass.
///
/// Implementors only update their own state. Recursion into children is done
/// by [`Tree::cull_out`](crate::Tree::cull_out) and
/// [`Tree::reset_culling`](crate::Tree::reset_culling), which call these
/// methods on a node and then on each child, front to back, with the same
/// arguments.
///
/// `None` for `unobscured` is the "no occlusion data" sentinel: the receiver
/// must treat itself as fully visible. An empty region means fully obscured.
pub trait Cullable {
    /// Consumes the visibility computed for this node.
    fn cull_out(&mut self, unobscured: Option<&Region>, clip: Option<&Region>);

    /// Forgets any visibility recorded by [`Cullable::cull_out`].
    fn reset_culling(&mut self);
}

/// A grouping node. Has no content and records nothing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Container;

impl Cullable for Container {
    #[inline]
    fn cull_out(&mut self, _unobscured: Option<&Region>, _clip: Option<&Region>) {}

    #[inline]
    fn reset_culling(&mut self) {}
}

/// Payload of a scene node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Pass-through grouping node.
    Container(Container),
    /// Drawable surface, texture or background.
    Leaf(Leaf),
}

impl NodeKind {
    /// The leaf payload, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Container(_) => None,
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Container(_) => None,
        }
    }
}

impl Cullable for NodeKind {
    fn cull_out(&mut self, unobscured: Option<&Region>, clip: Option<&Region>) {
        match self {
            Self::Container(c) => c.cull_out(unobscured, clip),
            Self::Leaf(l) => l.cull_out(unobscured, clip),
        }
    }

    fn reset_culling(&mut self) {
        match self {
            Self::Container(c) => c.reset_culling(),
            Self::Leaf(l) => l.reset_culling(),
        }
    }
}
