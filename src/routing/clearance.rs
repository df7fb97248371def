//! Margin-expanded obstacle set used by every intersection test.

use crate::geometry::{Point, Rect};
use crate::registry::Obstacle;

/// Obstacles with the clearance margin already applied.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField<'a> {
    rects: Vec<(&'a str, Rect)>,
}

impl<'a> ObstacleField<'a> {
    pub fn new(obstacles: impl IntoIterator<Item = &'a Obstacle>, margin: f64) -> Self {
        Self {
            rects: obstacles
                .into_iter()
                .map(|o| (o.id.as_str(), o.bounds.expand(margin)))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Ids of obstacles the segment `a..b` touches, in registration order.
    pub fn blocking(&self, a: &Point, b: &Point) -> Vec<&'a str> {
        self.rects
            .iter()
            .filter(|(_, r)| r.intersects_segment(a, b))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn is_clear(&self, a: &Point, b: &Point) -> bool {
        !self.rects.iter().any(|(_, r)| r.intersects_segment(a, b))
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.rects.iter().any(|(_, r)| r.contains(p))
    }

    /// Same field minus every obstacle that contains one of `points`.
    ///
    /// Lets a search leave (or enter) the body an endpoint sits on.
    pub fn excluding_containing(&self, points: &[Point]) -> Self {
        Self {
            rects: self
                .rects
                .iter()
                .filter(|(_, r)| !points.iter().any(|p| r.contains(p)))
                .copied()
                .collect(),
        }
    }

    /// Bounding box of all expanded obstacles plus `extra` points.
    pub fn extent(&self, extra: &[Point]) -> Option<Rect> {
        let mut boxes = extra
            .iter()
            .map(Rect::at)
            .chain(self.rects.iter().filter(|(_, r)| !r.is_degenerate()).map(|(_, r)| *r));
        let first = boxes.next()?;
        Some(boxes.fold(first, |acc, r| acc.union(&r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(obstacles: &[Obstacle], margin: f64) -> ObstacleField<'_> {
        ObstacleField::new(obstacles, margin)
    }

    #[test]
    fn test_margin_is_applied() {
        let obstacles = vec![Obstacle::new("o", Rect::new(0.0, 0.0, 10.0, 10.0))];
        let f = field(&obstacles, 5.0);
        let a = Point::new(-20.0, -3.0);
        let b = Point::new(30.0, -3.0);
        assert_eq!(f.blocking(&a, &b), vec!["o"]);
        assert!(field(&obstacles, 0.0).is_clear(&a, &b));
    }

    #[test]
    fn test_excluding_containing() {
        let obstacles = vec![
            Obstacle::new("body", Rect::new(0.0, 0.0, 10.0, 10.0)),
            Obstacle::new("other", Rect::new(50.0, 0.0, 10.0, 10.0)),
        ];
        let f = field(&obstacles, 0.0).excluding_containing(&[Point::new(5.0, 5.0)]);
        assert!(!f.contains(&Point::new(5.0, 5.0)));
        assert!(f.contains(&Point::new(55.0, 5.0)));
    }

    #[test]
    fn test_extent_ignores_degenerate() {
        let obstacles = vec![
            Obstacle::new("o", Rect::new(10.0, 10.0, 10.0, 10.0)),
            Obstacle::new("flat", Rect::new(500.0, 500.0, 0.0, 0.0)),
        ];
        let ext = field(&obstacles, 0.0).extent(&[Point::new(0.0, 0.0)]).unwrap();
        assert_eq!(ext, Rect::new(0.0, 0.0, 20.0, 20.0));
        assert!(ObstacleField::default().extent(&[]).is_none());
    }
}
