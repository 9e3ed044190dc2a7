//! Named input locations

use crate::collection::{Attributes, Value};
use crate::coordinate::Point;

/// A WGS 84 location with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Longitude (x) and latitude (y) in degrees
    pub location: Point,
    pub attributes: Attributes,
}

impl PointRecord {
    pub fn new(lon: f64, lat: f64, attributes: Attributes) -> Self {
        PointRecord { location: Point::new(lon, lat), attributes }
    }

    /// A point carrying a single identifier attribute
    pub fn with_id(id_field: &str, id: &str, lon: f64, lat: f64) -> Self {
        let mut attributes = Attributes::new();
        attributes.set(id_field, Value::from(id));
        PointRecord::new(lon, lat, attributes)
    }
}
