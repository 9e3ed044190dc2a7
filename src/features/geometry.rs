//! Region geometries in longitude/latitude

use crate::coordinate::geodesy::{disc_half_extents, haversine_distance};
use crate::coordinate::{BoundingBox, Point};

/// Geometry of a region, coordinates in WGS 84 degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Point(Point),
    /// Points within `radius` metres (great-circle) of the centre
    Disc { center: Point, radius: f64 },
    Rectangle(BoundingBox),
}

impl Geometry {
    /// Whether a lon/lat position lies inside the geometry (boundary included)
    pub fn contains(&self, lonlat: &Point) -> bool {
        match self {
            Geometry::Point(p) => p == lonlat,
            Geometry::Disc { center, radius } => haversine_distance(center, lonlat) <= *radius,
            Geometry::Rectangle(bbox) => bbox.contains(lonlat),
        }
    }

    /// Lon/lat bounding box
    ///
    /// Disc bounds are not wrapped at the antimeridian.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Geometry::Point(p) => BoundingBox::new(p.x, p.y, p.x, p.y),
            Geometry::Disc { center, radius } => {
                let (dlon, dlat) = disc_half_extents(center, radius.max(0.0));
                BoundingBox::new(center.x - dlon, center.y - dlat, center.x + dlon, center.y + dlat)
            },
            Geometry::Rectangle(bbox) => *bbox,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Disc { .. } => "Disc",
            Geometry::Rectangle(_) => "Rectangle",
        }
    }
}
