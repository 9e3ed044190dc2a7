//! Map projections
//!
//! Forward and inverse formulas for the projections the supported EPSG
//! codes use. Formulas follow Snyder, "Map Projections: A Working Manual"
//! (USGS PP 1395). Datum shifts are not applied: ETRS89, WGS 84 and GRS80
//! based codes are treated as sharing one geographic frame.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use lazy_static::lazy_static;

use super::point::Point;

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in metres
    pub a: f64,
    /// Flattening
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid { a: 6378137.0, f: 1.0 / 298.257223563 };
    pub const GRS80: Ellipsoid = Ellipsoid { a: 6378137.0, f: 1.0 / 298.257222101 };

    /// First eccentricity squared
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// First eccentricity
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }
}

/// Spherical Web Mercator radius
const WEB_MERCATOR_RADIUS: f64 = 6378137.0;

/// Latitude limit of Web Mercator
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Projections supported for EPSG codes outside the built-in families
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Spherical Mercator as used by EPSG:3857
    WebMercator,
    TransverseMercator(TransverseMercator),
    LambertConformalConic(LambertConformalConic),
}

impl Projection {
    /// Project geographic degrees to map coordinates
    pub fn forward(&self, lonlat: Point) -> Point {
        match self {
            Projection::WebMercator => web_mercator_forward(lonlat),
            Projection::TransverseMercator(tm) => tm.forward(lonlat),
            Projection::LambertConformalConic(lcc) => lcc.forward(lonlat),
        }
    }

    /// Unproject map coordinates to geographic degrees
    pub fn inverse(&self, xy: Point) -> Point {
        match self {
            Projection::WebMercator => web_mercator_inverse(xy),
            Projection::TransverseMercator(tm) => tm.inverse(xy),
            Projection::LambertConformalConic(lcc) => lcc.inverse(xy),
        }
    }

    /// Short name for logs and inspection output
    pub fn name(&self) -> &'static str {
        match self {
            Projection::WebMercator => "Web Mercator",
            Projection::TransverseMercator(_) => "Transverse Mercator",
            Projection::LambertConformalConic(_) => "Lambert Conformal Conic (2SP)",
        }
    }
}

fn web_mercator_forward(p: Point) -> Point {
    let lat = p.y.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT).to_radians();
    Point::new(
        WEB_MERCATOR_RADIUS * p.x.to_radians(),
        WEB_MERCATOR_RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
    )
}

fn web_mercator_inverse(p: Point) -> Point {
    let lon = (p.x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (p.y / WEB_MERCATOR_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
    Point::new(lon, lat)
}

/// Ellipsoidal Transverse Mercator (Snyder 8-9 to 8-25)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    pub ellipsoid: Ellipsoid,
    /// Central meridian in degrees
    pub lon0: f64,
    /// Latitude of origin in degrees
    pub lat0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TransverseMercator {
    /// UTM zone 1..=60, northern or southern hemisphere
    pub fn utm(zone: u8, north: bool, ellipsoid: Ellipsoid) -> Self {
        TransverseMercator {
            ellipsoid,
            lon0: -183.0 + 6.0 * zone as f64,
            lat0: 0.0,
            k0: 0.9996,
            false_easting: 500_000.0,
            false_northing: if north { 0.0 } else { 10_000_000.0 },
        }
    }

    /// Meridian arc length from the equator to `phi` (radians)
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.ellipsoid.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.ellipsoid.a * (
            (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin()
        )
    }

    pub fn forward(&self, p: Point) -> Point {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let ep2 = e2 / (1.0 - e2);

        let phi = p.y.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let n = a / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = phi.tan().powi(2);
        let c = ep2 * cos_phi * cos_phi;
        let aa = (p.x - self.lon0).to_radians() * cos_phi;

        let m = self.meridian_arc(phi);
        let m0 = self.meridian_arc(self.lat0.to_radians());

        let x = self.k0 * n * (
            aa + (1.0 - t + c) * aa.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * aa.powi(5) / 120.0
        );
        let y = self.k0 * (
            m - m0 + n * phi.tan() * (
                aa * aa / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * aa.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * aa.powi(6) / 720.0
            )
        );

        Point::new(x + self.false_easting, y + self.false_northing)
    }

    pub fn inverse(&self, p: Point) -> Point {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let m0 = self.meridian_arc(self.lat0.to_radians());
        let m = m0 + (p.y - self.false_northing) / self.k0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let c1 = ep2 * cos1 * cos1;
        let t1 = phi1.tan().powi(2);
        let n1 = a / (1.0 - e2 * sin1 * sin1).sqrt();
        let r1 = a * (1.0 - e2) / (1.0 - e2 * sin1 * sin1).powf(1.5);
        let d = (p.x - self.false_easting) / (n1 * self.k0);

        let phi = phi1 - (n1 * phi1.tan() / r1) * (
            d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6) / 720.0
        );
        let lambda = (
            d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5) / 120.0
        ) / cos1;

        Point::new(self.lon0 + lambda.to_degrees(), phi.to_degrees())
    }
}

/// Ellipsoidal Lambert Conformal Conic with two standard parallels (Snyder 15)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertConformalConic {
    pub ellipsoid: Ellipsoid,
    /// First standard parallel in degrees
    pub lat1: f64,
    /// Second standard parallel in degrees
    pub lat2: f64,
    /// Latitude of origin in degrees
    pub lat0: f64,
    /// Central meridian in degrees
    pub lon0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl LambertConformalConic {
    fn m(&self, phi: f64) -> f64 {
        let e2 = self.ellipsoid.e2();
        phi.cos() / (1.0 - e2 * phi.sin().powi(2)).sqrt()
    }

    fn t(&self, phi: f64) -> f64 {
        let e = self.ellipsoid.e();
        let es = e * phi.sin();
        (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
    }

    /// Cone constant n, scaling F and origin radius rho0
    fn constants(&self) -> (f64, f64, f64) {
        let phi1 = self.lat1.to_radians();
        let phi2 = self.lat2.to_radians();
        let (m1, m2) = (self.m(phi1), self.m(phi2));
        let (t1, t2) = (self.t(phi1), self.t(phi2));

        let n = if (self.lat1 - self.lat2).abs() < 1e-10 {
            phi1.sin()
        } else {
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };
        let f = m1 / (n * t1.powf(n));
        let rho0 = self.ellipsoid.a * f * self.t(self.lat0.to_radians()).powf(n);
        (n, f, rho0)
    }

    pub fn forward(&self, p: Point) -> Point {
        let (n, f, rho0) = self.constants();
        let rho = self.ellipsoid.a * f * self.t(p.y.to_radians()).powf(n);
        let theta = n * (p.x - self.lon0).to_radians();

        Point::new(
            self.false_easting + rho * theta.sin(),
            self.false_northing + rho0 - rho * theta.cos(),
        )
    }

    pub fn inverse(&self, p: Point) -> Point {
        let (n, f, rho0) = self.constants();
        let e = self.ellipsoid.e();
        let dx = p.x - self.false_easting;
        let dy = rho0 - (p.y - self.false_northing);

        let sign = n.signum();
        let rho = sign * (dx * dx + dy * dy).sqrt();
        let theta = (sign * dx).atan2(sign * dy);
        let t = (rho / (self.ellipsoid.a * f)).powf(1.0 / n);

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..15 {
            let es = e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).atan();
            let converged = (next - phi).abs() < 1e-12;
            phi = next;
            if converged {
                break;
            }
        }

        Point::new(self.lon0 + (theta / n).to_degrees(), phi.to_degrees())
    }
}

/// A registered projected CRS
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedDefinition {
    pub name: &'static str,
    pub projection: Projection,
}

lazy_static! {
    /// Projected EPSG codes outside the UTM / Web Mercator families
    static ref PROJECTED_REGISTRY: HashMap<u32, ProjectedDefinition> = {
        let mut m = HashMap::new();
        m.insert(5243, ProjectedDefinition {
            name: "ETRS89 / LCC Germany (E-N)",
            projection: Projection::LambertConformalConic(LambertConformalConic {
                ellipsoid: Ellipsoid::GRS80,
                lat1: 48.666_666_666_666_67,
                lat2: 53.666_666_666_666_67,
                lat0: 51.0,
                lon0: 10.5,
                false_easting: 0.0,
                false_northing: 0.0,
            }),
        });
        m.insert(3034, ProjectedDefinition {
            name: "ETRS89-extended / LCC Europe",
            projection: Projection::LambertConformalConic(LambertConformalConic {
                ellipsoid: Ellipsoid::GRS80,
                lat1: 35.0,
                lat2: 65.0,
                lat0: 52.0,
                lon0: 10.0,
                false_easting: 4_000_000.0,
                false_northing: 2_800_000.0,
            }),
        });
        m.insert(2154, ProjectedDefinition {
            name: "RGF93 / Lambert-93",
            projection: Projection::LambertConformalConic(LambertConformalConic {
                ellipsoid: Ellipsoid::GRS80,
                lat1: 49.0,
                lat2: 44.0,
                lat0: 46.5,
                lon0: 3.0,
                false_easting: 700_000.0,
                false_northing: 6_600_000.0,
            }),
        });
        for zone in 28u8..=38 {
            m.insert(25800 + zone as u32, ProjectedDefinition {
                name: "ETRS89 / UTM",
                projection: Projection::TransverseMercator(TransverseMercator::utm(zone, true, Ellipsoid::GRS80)),
            });
        }
        m
    };
}

/// Looks up a registered projected EPSG code
pub fn registered_projection(epsg: u32) -> Option<ProjectedDefinition> {
    PROJECTED_REGISTRY.get(&epsg).copied()
}
