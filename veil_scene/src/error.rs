// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::types::NodeId;

/// Errors from tree mutations and leaf-only operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The id does not refer to a live node.
    StaleNode(NodeId),
    /// The operation needs a leaf, but the node is a container.
    NotALeaf(NodeId),
    /// Attaching `child` under `parent` would make a node its own ancestor.
    WouldCycle {
        /// The requested parent.
        parent: NodeId,
        /// The node being attached.
        child: NodeId,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "node {id:?} is not alive"),
            Self::NotALeaf(id) => write!(f, "node {id:?} is a container, not a leaf"),
            Self::WouldCycle { parent, child } => write!(
                f,
                "attaching {child:?} under {parent:?} would create a cycle"
            ),
        }
    }
}

impl core::error::Error for TreeError {}
