// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding boxes in corner form and their strict predicates.
//!
//! All comparisons here are strict. A point lying exactly on an edge is not
//! contained, and two boxes that only share an edge do not overlap. Adjacent
//! tiles share edges, so strictness keeps a boundary point out of both.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

/// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)`.
///
/// Boxes are expected to be well ordered (`min <= max` on both axes) and free of NaNs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum x (left)
    pub min_x: f64,
    /// Minimum y (top)
    pub min_y: f64,
    /// Maximum x (right)
    pub max_x: f64,
    /// Maximum y (bottom)
    pub max_y: f64,
}

impl BoundingBox {
    /// The full domain of a tile, `(0, 0, 1, 1)`.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create a new box from min/max corners.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a box from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }

    /// Width of the box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Area of the box. Not guarded against degenerate boxes.
    #[inline]
    pub fn area(&self) -> f64 {
        area(self)
    }

    /// Whether the point lies strictly inside the box.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        contains(self, p)
    }

    /// Whether the two boxes overlap with a positive-area intersection.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        overlaps(self, other)
    }

    /// Origin and extent form, `(x, y, width, height)`.
    #[inline]
    pub fn to_corner_size(&self) -> (f64, f64, f64, f64) {
        to_corner_size(self)
    }

    /// Convert to a Kurbo rectangle, for drawing.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Map a point from local `[0, 1]²` space into this box.
    #[inline]
    pub fn map_local(&self, p: Point) -> Point {
        Point::new(
            self.min_x + p.x * self.width(),
            self.min_y + p.y * self.height(),
        )
    }

    /// The `(col, row)` cell of an equal-size `k × k` grid over this box.
    pub fn cell(&self, col: u32, row: u32, k: u32) -> Self {
        let k = f64::from(k);
        let w = self.width() / k;
        let h = self.height() / k;
        let x0 = self.min_x + f64::from(col) * w;
        let y0 = self.min_y + f64::from(row) * h;
        Self::new(x0, y0, x0 + w, y0 + h)
    }

    /// Keep only the points strictly inside the box, along with their parallel ranks.
    ///
    /// `points` and `ranks` must have the same length.
    pub fn retain_contained(&self, points: &mut Vec<Point>, ranks: &mut Vec<f64>) {
        debug_assert_eq!(
            points.len(),
            ranks.len(),
            "points and ranks must be parallel"
        );
        let mut keep = 0;
        for i in 0..points.len() {
            if self.contains(points[i]) {
                points.swap(keep, i);
                ranks.swap(keep, i);
                keep += 1;
            }
        }
        points.truncate(keep);
        ranks.truncate(keep);
    }
}

impl From<Rect> for BoundingBox {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }
}

impl From<BoundingBox> for Rect {
    fn from(b: BoundingBox) -> Self {
        b.to_rect()
    }
}

/// Area of a box, `(max_x - min_x) * (max_y - min_y)`.
#[inline]
pub fn area(b: &BoundingBox) -> f64 {
    (b.max_x - b.min_x) * (b.max_y - b.min_y)
}

/// Strict interior containment of a point.
#[inline]
pub fn contains(b: &BoundingBox, p: Point) -> bool {
    b.min_x < p.x && p.x < b.max_x && b.min_y < p.y && p.y < b.max_y
}

/// Strict overlap of two boxes. Boxes touching at an edge do not overlap.
#[inline]
pub fn overlaps(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.min_x < b.max_x && b.min_x < a.max_x && a.min_y < b.max_y && b.min_y < a.max_y
}

/// Origin and extent form, `(x, y, width, height)`.
#[inline]
pub fn to_corner_size(b: &BoundingBox) -> (f64, f64, f64, f64) {
    (b.min_x, b.min_y, b.max_x - b.min_x, b.max_y - b.min_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn unit_area_and_corner_size() {
        assert_eq!(BoundingBox::UNIT.area(), 1.0);
        let b = BoundingBox::new(0.25, 0.5, 1.0, 2.0);
        assert_eq!(b.to_corner_size(), (0.25, 0.5, 0.75, 1.5));
        assert_eq!(b.area(), 0.75 * 1.5);
    }

    #[test]
    fn containment_excludes_edges() {
        let b = BoundingBox::UNIT;
        assert!(b.contains(Point::new(0.5, 0.5)));
        assert!(!b.contains(Point::new(0.0, 0.5)));
        assert!(!b.contains(Point::new(0.5, 1.0)));
        assert!(!b.contains(Point::new(1.5, 0.5)));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let right = BoundingBox::new(1.0, 0.0, 2.0, 1.0);
        let inside = BoundingBox::new(0.9, 0.9, 2.0, 2.0);
        assert!(!a.overlaps(&right));
        assert!(!right.overlaps(&a));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn cells_tile_the_parent() {
        let b = BoundingBox::new(1.0, 2.0, 3.0, 6.0);
        assert_eq!(b.cell(0, 0, 2), BoundingBox::new(1.0, 2.0, 2.0, 4.0));
        assert_eq!(b.cell(1, 0, 2), BoundingBox::new(2.0, 2.0, 3.0, 4.0));
        assert_eq!(b.cell(0, 1, 2), BoundingBox::new(1.0, 4.0, 2.0, 6.0));
        assert_eq!(b.cell(1, 1, 2).area() * 4.0, b.area());
    }

    #[test]
    fn map_local_spans_the_box() {
        let b = BoundingBox::new(1.0, 2.0, 3.0, 6.0);
        assert_eq!(b.map_local(Point::ZERO), Point::new(1.0, 2.0));
        assert_eq!(b.map_local(Point::new(0.5, 0.25)), Point::new(2.0, 3.0));
    }

    #[test]
    fn retain_contained_keeps_order() {
        let b = BoundingBox::new(0.0, 0.0, 0.5, 0.5);
        let mut pts = vec![
            Point::new(0.1, 0.1),
            Point::new(0.9, 0.1),
            Point::new(0.2, 0.3),
            Point::new(0.5, 0.2),
        ];
        let mut ranks = vec![0.0, 1.0, 2.0, 3.0];
        b.retain_contained(&mut pts, &mut ranks);
        assert_eq!(pts, vec![Point::new(0.1, 0.1), Point::new(0.2, 0.3)]);
        assert_eq!(ranks, vec![0.0, 2.0]);
    }

    #[test]
    fn rect_round_trip_normalizes() {
        let b: BoundingBox = Rect::new(2.0, 3.0, 0.0, 1.0).into();
        assert_eq!(b, BoundingBox::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(Rect::from(b), Rect::new(0.0, 1.0, 2.0, 3.0));
    }
}
