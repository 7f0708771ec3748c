// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Veil Scene: a compositor scene tree with occlusion culling.
//!
//! Every frame, a compositor can save a lot of work by knowing which parts of
//! each window are actually visible. This crate keeps that knowledge next to
//! the scene:
//!
//! - [`Tree`]: containers and leaves (window surfaces, their textures and
//!   backgrounds), addressed by generational [`NodeId`]s.
//! - [`Cullable`]: the two-call protocol every node takes part in.
//!   [`Cullable::cull_out`] hands a node the screen region not covered by
//!   anything in front of it; [`Cullable::reset_culling`] forgets it.
//! - [`Leaf`]: stores its own snapshot of that region plus the input and
//!   opaque shapes delivered by the window system.
//! - [`CullPass`]: walks the tree front to back, subtracting what each leaf
//!   covers (per an [`OcclusionPolicy`]) before visiting the nodes behind it.
//!
//! Consumers then ask the tree:
//!
//! - [`Tree::paint_volume`]: bounds narrowed to what may be visible, empty
//!   when fully obscured.
//! - [`Tree::pick`] and [`Tree::hit_test_point`]: restricted by input
//!   regions, never by occlusion.
//! - [`Tree::damage_area`]: whether damage to a surface needs a redraw.
//!
//! An absent region always means "unknown, assume fully visible". Any change
//! to what covers what (structure, stacking, bounds, visibility, opacity)
//! resets every recorded region, so stale visibility is never read.
//!
//! ```rust
//! use veil_region::{IntRect, Region};
//! use veil_scene::{CullPass, NodeFlags, SubtractOpaque, Tree};
//!
//! let screen = Region::from_rect(IntRect::new(0, 0, 100, 100));
//!
//! let mut tree = Tree::new();
//! let stage = tree.insert_container(None, IntRect::new(0, 0, 100, 100)).unwrap();
//! let back = tree.insert_surface(Some(stage), IntRect::new(0, 0, 100, 100)).unwrap();
//! let front = tree.insert_surface(Some(stage), IntRect::new(0, 0, 50, 50)).unwrap();
//! tree.set_flags(front, NodeFlags::default() | NodeFlags::OPAQUE).unwrap();
//!
//! CullPass::default().run(&mut tree, stage, &screen, &screen, &mut SubtractOpaque, &mut ());
//!
//! let mut expected = screen.clone();
//! expected.subtract_rect(IntRect::new(0, 0, 50, 50));
//! assert_eq!(tree.unobscured_region(back), Some(&expected));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cullable;
mod error;
mod leaf;
mod pass;
mod trace;
mod tree;
mod types;

pub use cullable::{Container, Cullable, NodeKind};
pub use error::TreeError;
pub use leaf::Leaf;
pub use pass::{CullPass, CullStats, NoOcclusion, OcclusionPolicy, PassConfig, SubtractOpaque};
pub use trace::{CullEvent, CullRecorder, CullTrace};
pub use tree::Tree;
pub use types::{ContentId, LeafRole, NodeFlags, NodeId};
