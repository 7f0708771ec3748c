// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel rectangles.

use kurbo::Rect;

/// An axis-aligned integer rectangle in pixel coordinates.
///
/// Stored as origin plus size, matching what window systems deliver for
/// damage and shape rectangles. A rectangle with a non-positive width or
/// height is empty; all empty rectangles cover the same (empty) set of pixels,
/// but they are not normalized and may still carry an origin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl IntRect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from its edges. `x1`/`y1` are exclusive.
    #[inline]
    pub const fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn x1(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn y1(&self) -> i32 {
        self.y + self.height
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered.
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.width) * i64::from(self.height)
        }
    }

    /// Returns `true` if the pixel at `(x, y)` lies inside.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x1() && y >= self.y && y < self.y1()
    }

    /// Returns `true` if every pixel of `other` lies inside `self`.
    ///
    /// An empty `other` is contained by anything.
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.is_empty()
            || (!self.is_empty()
                && other.x >= self.x
                && other.y >= self.y
                && other.x1() <= self.x1()
                && other.y1() <= self.y1())
    }

    /// Intersection of two rectangles, or [`IntRect::ZERO`] if they do not overlap.
    pub fn intersect(&self, other: &Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.x1().min(other.x1());
        let y1 = self.y1().min(other.y1());
        if x1 <= x0 || y1 <= y0 {
            Self::ZERO
        } else {
            Self::from_edges(x0, y0, x1, y1)
        }
    }

    /// Returns `true` if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Smallest rectangle covering both. Empty inputs are ignored.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.x1().max(other.x1()),
            self.y1().max(other.y1()),
        )
    }

    /// Returns the rectangle moved by `(dx, dy)`.
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Converts to a Kurbo rectangle.
    pub fn to_kurbo(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x1()),
            f64::from(self.y1()),
        )
    }

    /// Smallest integer rectangle covering a Kurbo rectangle.
    ///
    /// Coordinates outside the `i32` range saturate.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to int `as` casts saturate, which is the behavior we want here"
    )]
    pub fn from_kurbo_outer(rect: Rect) -> Self {
        let r = rect.abs().expand();
        Self::from_edges(r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32)
    }
}

impl From<IntRect> for Rect {
    fn from(rect: IntRect) -> Self {
        rect.to_kurbo()
    }
}
