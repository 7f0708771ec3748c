// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Veil Region: integer pixel regions for compositor visibility bookkeeping.
//!
//! A [`Region`] is a set of pixels stored as non-overlapping [`IntRect`]s in
//! canonical banded form. It supports the handful of operations an occlusion
//! pass needs: union, intersection, subtraction, extents, rectangle
//! enumeration and translation.
//!
//! ```rust
//! use veil_region::{IntRect, Region};
//!
//! // The screen, minus an opaque window in the top-left corner.
//! let mut unobscured = Region::from_rect(IntRect::new(0, 0, 100, 100));
//! unobscured.subtract_rect(IntRect::new(0, 0, 50, 50));
//!
//! assert_eq!(unobscured.num_rects(), 2);
//! assert_eq!(unobscured.extents(), IntRect::new(0, 0, 100, 100));
//! assert!(!unobscured.contains_point(10, 10));
//! ```
//!
//! Regions are values. Cloning one yields an independent snapshot, which is
//! what scene nodes store while a traversal keeps shrinking its working copy.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod rect;
mod region;

pub use rect::IntRect;
pub use region::{Overlap, Region};
