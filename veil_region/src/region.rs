// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Banded pixel regions.

use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

use crate::rect::IntRect;

/// How a rectangle relates to a region, see [`Region::contains_rect`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Overlap {
    /// Every pixel of the rectangle is in the region.
    In,
    /// No pixel of the rectangle is in the region.
    Out,
    /// Some, but not all, pixels of the rectangle are in the region.
    Part,
}

/// A set of pixels described by non-overlapping integer rectangles.
///
/// The rectangles are kept in canonical banded form:
///
/// - Rectangles are sorted by `y`, then by `x`.
/// - Rectangles in the same band share `y` and `height` and never touch
///   horizontally.
/// - Vertically adjacent bands with identical horizontal spans are merged.
///
/// Because the form is canonical, two regions covering the same pixels have
/// identical rectangle lists, and `==` compares coverage.
///
/// Regions are plain values: cloning gives an independent copy, so a stored
/// snapshot is never affected by later edits to the region it was cloned from.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Region {
    rects: SmallVec<[IntRect; 4]>,
}

#[derive(Copy, Clone, Debug)]
enum Op {
    Union,
    Intersect,
    Subtract,
}

impl Op {
    #[inline]
    fn keep(self, in_a: bool, in_b: bool) -> bool {
        match self {
            Self::Union => in_a || in_b,
            Self::Intersect => in_a && in_b,
            Self::Subtract => in_a && !in_b,
        }
    }
}

type Span = (i32, i32);

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a region covering a single rectangle.
    ///
    /// An empty rectangle yields an empty region.
    #[must_use]
    pub fn from_rect(rect: IntRect) -> Self {
        let mut rects = SmallVec::new();
        if !rect.is_empty() {
            rects.push(rect);
        }
        Self { rects }
    }

    /// Creates the union of a set of possibly overlapping rectangles.
    #[must_use]
    pub fn from_rects<I>(rects: I) -> Self
    where
        I: IntoIterator<Item = IntRect>,
    {
        let input: Vec<IntRect> = rects.into_iter().filter(|r| !r.is_empty()).collect();
        Self {
            rects: combine(&input, &[], Op::Union),
        }
    }

    /// Returns `true` if the region covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The rectangles making up the region, in banded order.
    #[inline]
    pub fn rects(&self) -> &[IntRect] {
        &self.rects
    }

    /// Number of rectangles in the canonical decomposition.
    #[inline]
    pub fn num_rects(&self) -> usize {
        self.rects.len()
    }

    /// The `n`th rectangle of the decomposition.
    #[inline]
    pub fn rect(&self, n: usize) -> Option<IntRect> {
        self.rects.get(n).copied()
    }

    /// Bounding rectangle of the region, or [`IntRect::ZERO`] when empty.
    pub fn extents(&self) -> IntRect {
        let (Some(first), Some(last)) = (self.rects.first(), self.rects.last()) else {
            return IntRect::ZERO;
        };
        let x0 = self.rects.iter().map(|r| r.x).min().unwrap_or(first.x);
        let x1 = self.rects.iter().map(IntRect::x1).max().unwrap_or(first.x1());
        IntRect::from_edges(x0, first.y, x1, last.y1())
    }

    /// Total number of pixels covered.
    pub fn area(&self) -> i64 {
        self.rects.iter().map(IntRect::area).sum()
    }

    /// Returns `true` if the pixel at `(x, y)` is in the region.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains(x, y))
    }

    /// Classifies how `rect` overlaps the region.
    ///
    /// An empty `rect` is reported as [`Overlap::Out`].
    pub fn contains_rect(&self, rect: IntRect) -> Overlap {
        if rect.is_empty() {
            return Overlap::Out;
        }
        let covered: i64 = self.rects.iter().map(|r| r.intersect(&rect).area()).sum();
        if covered == 0 {
            Overlap::Out
        } else if covered == rect.area() {
            Overlap::In
        } else {
            Overlap::Part
        }
    }

    /// Replaces `self` with the union of `self` and `other`.
    pub fn union(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.rects.clone_from(&other.rects);
            return;
        }
        self.rects = combine(&self.rects, &other.rects, Op::Union);
    }

    /// Replaces `self` with the intersection of `self` and `other`.
    pub fn intersect(&mut self, other: &Self) {
        if self.is_empty() || other.is_empty() {
            self.rects.clear();
            return;
        }
        self.rects = combine(&self.rects, &other.rects, Op::Intersect);
    }

    /// Removes every pixel of `other` from `self`.
    pub fn subtract(&mut self, other: &Self) {
        if self.is_empty() || other.is_empty() || !self.extents().overlaps(&other.extents()) {
            return;
        }
        self.rects = combine(&self.rects, &other.rects, Op::Subtract);
    }

    /// Adds a rectangle to the region.
    pub fn union_rect(&mut self, rect: IntRect) {
        self.union(&Self::from_rect(rect));
    }

    /// Clips the region to a rectangle.
    pub fn intersect_rect(&mut self, rect: IntRect) {
        self.intersect(&Self::from_rect(rect));
    }

    /// Removes a rectangle from the region.
    pub fn subtract_rect(&mut self, rect: IntRect) {
        self.subtract(&Self::from_rect(rect));
    }

    /// Moves the region by `(dx, dy)`. Translation preserves banded form.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        for r in &mut self.rects {
            *r = r.translate(dx, dy);
        }
    }

    /// Returns a translated copy.
    #[must_use]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        let mut out = self.clone();
        out.translate(dx, dy);
        out
    }
}

impl From<IntRect> for Region {
    fn from(rect: IntRect) -> Self {
        Self::from_rect(rect)
    }
}

impl FromIterator<IntRect> for Region {
    fn from_iter<T: IntoIterator<Item = IntRect>>(iter: T) -> Self {
        Self::from_rects(iter)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.rects
                    .iter()
                    .map(|r| (r.x, r.y, r.width, r.height)),
            )
            .finish()
    }
}

/// Band-by-band boolean combination of two rectangle lists.
///
/// The inputs do not need to be canonical; the output always is.
fn combine(a: &[IntRect], b: &[IntRect], op: Op) -> SmallVec<[IntRect; 4]> {
    let mut ys: Vec<i32> = a
        .iter()
        .chain(b)
        .filter(|r| !r.is_empty())
        .flat_map(|r| [r.y, r.y1()])
        .collect();
    ys.sort_unstable();
    ys.dedup();

    let mut out: SmallVec<[IntRect; 4]> = SmallVec::new();
    let mut spans_a = Vec::new();
    let mut spans_b = Vec::new();
    let mut spans = Vec::new();
    // Start index and bottom edge of the last band written to `out`.
    let mut prev_band: Option<(usize, i32)> = None;

    for w in ys.windows(2) {
        let (y0, y1) = (w[0], w[1]);
        band_spans(a, y0, y1, &mut spans_a);
        band_spans(b, y0, y1, &mut spans_b);
        combine_spans(&spans_a, &spans_b, op, &mut spans);

        if spans.is_empty() {
            prev_band = None;
            continue;
        }

        if let Some((start, bottom)) = prev_band
            && bottom == y0
            && out.len() - start == spans.len()
            && out[start..]
                .iter()
                .zip(&spans)
                .all(|(r, &(x0, x1))| r.x == x0 && r.x1() == x1)
        {
            for r in &mut out[start..] {
                r.height += y1 - y0;
            }
            prev_band = Some((start, y1));
            continue;
        }

        let start = out.len();
        out.extend(
            spans
                .iter()
                .map(|&(x0, x1)| IntRect::from_edges(x0, y0, x1, y1)),
        );
        prev_band = Some((start, y1));
    }
    out
}

/// Collects the sorted, merged horizontal spans of `rects` covering `[y0, y1)`.
///
/// `y0`/`y1` are consecutive edges of the combined edge set, so any rectangle
/// touching the band covers all of it.
fn band_spans(rects: &[IntRect], y0: i32, y1: i32, out: &mut Vec<Span>) {
    out.clear();
    out.extend(
        rects
            .iter()
            .filter(|r| !r.is_empty() && r.y <= y0 && r.y1() >= y1)
            .map(|r| (r.x, r.x1())),
    );
    out.sort_unstable();
    let mut len = 0;
    for i in 0..out.len() {
        let span = out[i];
        if len > 0 && span.0 <= out[len - 1].1 {
            out[len - 1].1 = out[len - 1].1.max(span.1);
        } else {
            out[len] = span;
            len += 1;
        }
    }
    out.truncate(len);
}

/// One-dimensional boolean op over two sorted, disjoint span lists.
fn combine_spans(a: &[Span], b: &[Span], op: Op, out: &mut Vec<Span>) {
    out.clear();
    let mut xs: Vec<i32> = a.iter().chain(b).flat_map(|&(x0, x1)| [x0, x1]).collect();
    xs.sort_unstable();
    xs.dedup();

    let (mut ia, mut ib) = (0, 0);
    for w in xs.windows(2) {
        let (x0, x1) = (w[0], w[1]);
        while ia < a.len() && a[ia].1 <= x0 {
            ia += 1;
        }
        while ib < b.len() && b[ib].1 <= x0 {
            ib += 1;
        }
        let in_a = ia < a.len() && a[ia].0 <= x0;
        let in_b = ib < b.len() && b[ib].0 <= x0;
        if !op.keep(in_a, in_b) {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.1 == x0 => last.1 = x1,
            _ => out.push((x0, x1)),
        }
    }
}
