//! Point buffering

use log::{debug, warn};

use super::geometry::Geometry;
use super::point::PointRecord;
use super::region::Region;

/// Builds the function turning a point into its buffered region
///
/// # Arguments
/// * `radius` - Buffer radius in metres; not validated
/// * `bounds` - Replace the disc by its lon/lat bounding box
///
/// # Returns
/// A function mapping each point to a region carrying its attributes
pub fn buffer_points(radius: f64, bounds: bool) -> impl Fn(&PointRecord) -> Region {
    if radius <= 0.0 || radius.is_nan() {
        warn!("Buffer radius {} is not positive; regions will cover at most their centre", radius);
    }
    debug!("Buffering points by {} m ({})", radius, if bounds { "bounding box" } else { "disc" });

    move |point: &PointRecord| {
        let disc = Geometry::Disc { center: point.location, radius };
        let geometry = if bounds {
            Geometry::Rectangle(disc.bounds())
        } else {
            disc
        };
        Region::new(geometry, point.attributes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Point;

    #[test]
    fn bounds_flag_selects_the_box() {
        let point = PointRecord::with_id("plot_id", "SCH", 13.75, 52.96);

        let disc = buffer_points(10_000.0, false)(&point);
        assert_eq!(disc.geometry.type_name(), "Disc");
        assert_eq!(disc.attributes, point.attributes);

        let boxed = buffer_points(10_000.0, true)(&point);
        assert_eq!(boxed.geometry, Geometry::Rectangle(disc.bounds()));
        let corner = Point::new(disc.bounds().max_x, disc.bounds().max_y);
        assert!(boxed.geometry.contains(&corner));
        assert!(!disc.geometry.contains(&corner));
    }

    #[test]
    fn non_positive_radius_passes_through() {
        let point = PointRecord::with_id("plot_id", "ALB", 9.41, 48.43);
        let region = buffer_points(-1.0, false)(&point);
        assert_eq!(region.geometry, Geometry::Disc { center: point.location, radius: -1.0 });
    }
}
