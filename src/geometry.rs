//! Planar primitives shared by the router and the validators.

use serde::{Deserialize, Serialize};

/// A coordinate on the diagram canvas (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn manhattan(&self, other: &Point) -> f64 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Snap to the nearest multiple of `grid_size` on both axes.
    ///
    /// A non-positive or non-finite grid leaves the point untouched.
    pub fn snap(&self, grid_size: f64) -> Point {
        if !(grid_size.is_finite() && grid_size > 0.0) {
            return *self;
        }
        Point {
            x: (self.x / grid_size).round() * grid_size,
            y: (self.y / grid_size).round() * grid_size,
        }
    }

    /// Point `length` units away along the unit vector `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64, length: f64) -> Point {
        Point {
            x: self.x + dx * length,
            y: self.y + dy * length,
        }
    }

    /// Linear interpolation towards `other` (`t = 0` is `self`).
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Zero or negative extent on either axis.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Inclusive containment. Degenerate rectangles contain nothing.
    pub fn contains(&self, p: &Point) -> bool {
        !self.is_degenerate()
            && p.x >= self.x
            && p.x <= self.right()
            && p.y >= self.y
            && p.y <= self.bottom()
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// True if the segment `a..b` has an endpoint inside or crosses an edge.
    pub fn intersects_segment(&self, a: &Point, b: &Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        if self.contains(a) || self.contains(b) {
            return true;
        }
        let c = self.corners();
        (0..4).any(|i| segments_intersect(a, b, &c[i], &c[(i + 1) % 4]))
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Degenerate rectangle at a single point; grows via [`Rect::union`].
    pub fn at(p: &Point) -> Rect {
        Rect::new(p.x, p.y, 0.0, 0.0)
    }
}

/// Parametric segment/segment test. Parallel and collinear pairs never intersect.
pub fn segments_intersect(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> bool {
    let denom = (p2.x - p1.x) * (p4.y - p3.y) - (p2.y - p1.y) * (p4.x - p3.x);
    if denom == 0.0 || !denom.is_finite() {
        return false;
    }
    let t = ((p3.x - p1.x) * (p4.y - p3.y) - (p3.y - p1.y) * (p4.x - p3.x)) / denom;
    let u = ((p3.x - p1.x) * (p2.y - p1.y) - (p3.y - p1.y) * (p2.x - p1.x)) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Total length of a polyline.
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(a.manhattan(&b), 7.0);
    }

    #[test]
    fn test_snap_rounds_to_nearest_cell() {
        let p = Point::new(14.0, 16.0).snap(10.0);
        assert_eq!(p, Point::new(10.0, 20.0));
        let p = Point::new(-14.0, -6.0).snap(10.0);
        assert_eq!(p, Point::new(-10.0, -10.0));
    }

    #[test]
    fn test_snap_with_invalid_grid_is_noop() {
        let p = Point::new(3.3, 4.4);
        assert_eq!(p.snap(0.0), p);
        assert_eq!(p.snap(-5.0), p);
        assert_eq!(p.snap(f64::NAN), p);
    }

    #[test]
    fn test_crossing_segments() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 10.0);
        let c = Point::new(0.0, 10.0);
        let d = Point::new(10.0, 0.0);
        assert!(segments_intersect(&a, &b, &c, &d));
    }

    #[test]
    fn test_parallel_segments_never_intersect() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!(!segments_intersect(&a, &b, &Point::new(0.0, 5.0), &Point::new(10.0, 5.0)));
        // collinear overlap is treated as parallel
        assert!(!segments_intersect(&a, &b, &Point::new(5.0, 0.0), &Point::new(15.0, 0.0)));
    }

    #[test]
    fn test_segment_through_rect() {
        let r = Rect::new(45.0, -10.0, 10.0, 20.0);
        assert!(r.intersects_segment(&Point::new(0.0, 0.0), &Point::new(100.0, 0.0)));
        assert!(!r.intersects_segment(&Point::new(0.0, 30.0), &Point::new(100.0, 30.0)));
    }

    #[test]
    fn test_segment_with_endpoint_inside_rect() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.intersects_segment(&Point::new(5.0, 5.0), &Point::new(6.0, 5.0)));
    }

    #[test]
    fn test_degenerate_rect_never_intersects() {
        let flat = Rect::new(0.0, 0.0, 0.0, 10.0);
        assert!(!flat.intersects_segment(&Point::new(-5.0, 5.0), &Point::new(5.0, 5.0)));
        let negative = Rect::new(0.0, 0.0, -10.0, -10.0);
        assert!(!negative.contains(&Point::new(-5.0, -5.0)));
    }

    #[test]
    fn test_expand_and_union() {
        let r = Rect::new(10.0, 10.0, 10.0, 10.0).expand(5.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 20.0, 20.0));
        let u = Rect::at(&Point::new(0.0, 0.0)).union(&r);
        assert_eq!(u, Rect::new(0.0, 0.0, 25.0, 25.0));
    }

    #[test]
    fn test_nan_does_not_panic() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let nan = Point::new(f64::NAN, 0.0);
        assert!(!nan.is_finite());
        let _ = r.intersects_segment(&nan, &Point::new(5.0, 5.0));
    }

    proptest! {
        #[test]
        fn snap_is_idempotent(x in -1.0e6f64..1.0e6, y in -1.0e6f64..1.0e6, grid in 0.5f64..100.0) {
            let once = Point::new(x, y).snap(grid);
            let twice = once.snap(grid);
            prop_assert!((once.x - twice.x).abs() < 1e-9);
            prop_assert!((once.y - twice.y).abs() < 1e-9);
        }
    }
}
