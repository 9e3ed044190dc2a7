//! Regions: buffered point geometries with their attributes

use crate::collection::Attributes;
use crate::coordinate::BoundingBox;

use super::geometry::Geometry;

/// A geometry carrying the attributes of the point it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub geometry: Geometry,
    pub attributes: Attributes,
}

impl Region {
    pub fn new(geometry: Geometry, attributes: Attributes) -> Self {
        Region { geometry, attributes }
    }

    /// Lon/lat bounding box of the geometry
    pub fn bounds(&self) -> BoundingBox {
        self.geometry.bounds()
    }
}
