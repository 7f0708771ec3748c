// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability hooks for the cull pass.
//!
//! The tree only keeps the latest snapshot per leaf. When debugging "why was
//! this window not painted", it helps to see the whole sequence: which region
//! each leaf was handed, and what each occluder took away from the nodes
//! behind it. [`CullPass::run`](crate::CullPass::run) reports both to a
//! [`CullTrace`] sink; `()` ignores them and [`CullRecorder`] keeps them.

use alloc::vec::Vec;

use veil_region::Region;

use crate::types::NodeId;

/// A callback sink for cull pass tracing.
pub trait CullTrace {
    /// Called after `node` recorded `unobscured` as its visible region.
    fn recorded(&mut self, node: NodeId, unobscured: &Region);

    /// Called when `node` hides `occluder` from the nodes behind it.
    fn occluded(&mut self, node: NodeId, occluder: &Region);
}

impl CullTrace for () {
    #[inline]
    fn recorded(&mut self, _node: NodeId, _unobscured: &Region) {}

    #[inline]
    fn occluded(&mut self, _node: NodeId, _occluder: &Region) {}
}

/// One traced step of a cull pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CullEvent {
    /// A leaf recorded its visible region.
    Recorded {
        /// The leaf.
        node: NodeId,
        /// What it recorded.
        unobscured: Region,
    },
    /// A leaf occluded part of the scene behind it.
    Occluded {
        /// The occluding leaf.
        node: NodeId,
        /// Its screen-space occluder.
        occluder: Region,
    },
}

/// Records every event of a pass, in order.
#[derive(Clone, Debug, Default)]
pub struct CullRecorder {
    events: Vec<CullEvent>,
}

impl CullRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far.
    pub fn events(&self) -> &[CullEvent] {
        &self.events
    }

    /// Forgets all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Leaves in the order they were culled.
    pub fn culled_order(&self) -> Vec<NodeId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CullEvent::Recorded { node, .. } => Some(*node),
                CullEvent::Occluded { .. } => None,
            })
            .collect()
    }

    /// The region most recently recorded for `node`.
    pub fn recorded_for(&self, node: NodeId) -> Option<&Region> {
        self.events.iter().rev().find_map(|e| match e {
            CullEvent::Recorded {
                node: n,
                unobscured,
            } if *n == node => Some(unobscured),
            _ => None,
        })
    }
}

impl CullTrace for CullRecorder {
    fn recorded(&mut self, node: NodeId, unobscured: &Region) {
        self.events.push(CullEvent::Recorded {
            node,
            unobscured: unobscured.clone(),
        });
    }

    fn occluded(&mut self, node: NodeId, occluder: &Region) {
        self.events.push(CullEvent::Occluded {
            node,
            occluder: occluder.clone(),
        });
    }
}
