//! Bounding box structure for defining regions

use super::point::Point;

/// An axis aligned bounding box in a coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox { min_x, min_y, max_x, max_y }
    }

    /// Smallest box containing every finite point, None if there is none
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut bbox: Option<BoundingBox> = None;
        for p in points.into_iter().filter(Point::is_finite) {
            match bbox.as_mut() {
                Some(b) => b.expand_to(&p),
                None => bbox = Some(BoundingBox::new(p.x, p.y, p.x, p.y)),
            }
        }
        bbox
    }

    /// Get the width of the bounding box
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Get the height of the bounding box
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if this bounding box contains a point (edges included)
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x &&
            point.y >= self.min_y && point.y <= self.max_y
    }

    /// Whether two boxes share at least one point
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x && other.min_x <= self.max_x &&
            self.min_y <= other.max_y && other.min_y <= self.max_y
    }

    /// Grow the box to include a point
    pub fn expand_to(&mut self, point: &Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// Corner points, counter-clockwise from the lower left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_includes_touching_edges() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&BoundingBox::new(1.0, 1.0, 2.0, 2.0)));
        assert!(!a.intersects(&BoundingBox::new(1.5, 0.0, 2.0, 1.0)));
    }

    #[test]
    fn from_points_skips_non_finite() {
        let bbox = BoundingBox::from_points(vec![
            Point::new(3.0, -1.0),
            Point::new(f64::NAN, 10.0),
            Point::new(-2.0, 4.0),
        ]).unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 3.0, 4.0));
        assert!(BoundingBox::from_points(Vec::new()).is_none());
    }
}
