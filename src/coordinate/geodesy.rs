//! Distances and unit conversions on the sphere

use super::point::Point;

/// Mean Earth radius in metres (IUGG)
pub const EARTH_MEAN_RADIUS: f64 = 6_371_008.8;

/// Metres per degree along the WGS 84 equator
pub const METERS_PER_DEGREE: f64 = 111_319.490_793_273_57;

/// Great-circle distance in metres between two lon/lat points
pub fn haversine_distance(a: &Point, b: &Point) -> f64 {
    let phi1 = a.y.to_radians();
    let phi2 = b.y.to_radians();
    let dphi = phi2 - phi1;
    let dlambda = (b.x - a.x).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS * h.sqrt().min(1.0).asin()
}

/// Longitude and latitude half-extents in degrees of a disc of `radius` metres
///
/// The longitude extent covers every longitude when the disc reaches a pole.
pub fn disc_half_extents(center: &Point, radius: f64) -> (f64, f64) {
    let angular = radius / EARTH_MEAN_RADIUS;
    let dlat = angular.to_degrees();

    let ratio = angular.sin() / center.y.to_radians().cos();
    let dlon = if angular >= std::f64::consts::FRAC_PI_2 || !ratio.is_finite() || ratio.abs() >= 1.0 {
        180.0
    } else {
        ratio.asin().to_degrees()
    };

    (dlon, dlat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_distance(&Point::new(10.0, 50.0), &Point::new(10.0, 51.0));
        assert_relative_eq!(d, EARTH_MEAN_RADIUS * 1f64.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn extents_widen_with_latitude() {
        let (dlon_eq, dlat) = disc_half_extents(&Point::new(0.0, 0.0), 10_000.0);
        let (dlon_north, _) = disc_half_extents(&Point::new(0.0, 60.0), 10_000.0);
        assert_relative_eq!(dlon_eq, dlat, epsilon = 1e-6);
        assert!(dlon_north > 1.9 * dlon_eq);
        assert_eq!(disc_half_extents(&Point::new(0.0, 89.99), 50_000.0).0, 180.0);
    }
}
