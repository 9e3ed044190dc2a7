//! Coordinate transformation between supported systems

use log::trace;

use super::bbox::BoundingBox;
use super::crs::CoordinateSystem;
use super::point::Point;

/// Transformer for converting between coordinate systems
///
/// Every transformation passes through geographic longitude/latitude.
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    /// Transform a point between coordinate systems
    pub fn transform_point(point: &Point, from_crs: &CoordinateSystem, to_crs: &CoordinateSystem) -> Point {
        if from_crs == to_crs {
            return *point;
        }
        let lonlat = from_crs.to_lonlat(*point);
        let out = to_crs.from_lonlat(lonlat);
        trace!("Transformed ({}, {}) {} -> ({}, {}) {}", point.x, point.y, from_crs, out.x, out.y, to_crs);
        out
    }

    /// Bounding box of a transformed box, densified along each edge
    ///
    /// Projected edges are curves in the target system, so `steps` points
    /// per edge are transformed rather than just the corners.
    pub fn transform_bbox(
        bbox: &BoundingBox,
        from_crs: &CoordinateSystem,
        to_crs: &CoordinateSystem,
        steps: usize,
    ) -> Option<BoundingBox> {
        if from_crs == to_crs {
            return Some(*bbox);
        }
        let points = densify(bbox, steps.max(1))
            .into_iter()
            .map(|p| Self::transform_point(&p, from_crs, to_crs));
        BoundingBox::from_points(points)
    }
}

/// Points along the outline of a box, `steps` segments per edge
pub fn densify(bbox: &BoundingBox, steps: usize) -> Vec<Point> {
    let corners = bbox.corners();
    let mut points = Vec::with_capacity(4 * steps);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            points.push(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::CoordinateSystemFactory;
    use approx::assert_abs_diff_eq;

    #[test]
    fn same_system_is_identity() {
        let p = Point::new(1.0, 2.0);
        let crs = CoordinateSystem::WGS84;
        assert_eq!(CoordinateTransformer::transform_point(&p, &crs, &crs), p);
    }

    #[test]
    fn utm_to_lcc_via_lonlat() {
        let utm = CoordinateSystemFactory::from_epsg(32632).unwrap();
        let lcc = CoordinateSystemFactory::from_epsg(5243).unwrap();
        let origin = utm.from_lonlat(Point::new(10.5, 51.0));
        let p = CoordinateTransformer::transform_point(&origin, &utm, &lcc);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn densified_outline_has_all_edges() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 2.0);
        let points = densify(&bbox, 4);
        assert_eq!(points.len(), 16);
        assert!(points.contains(&Point::new(2.0, 0.0)));
        assert!(points.contains(&Point::new(0.0, 1.0)));
    }
}
