//! Coordinate Reference System handling

use std::fmt;

use crate::errors::{ZonalError, ZonalResult};
use super::point::Point;
use super::projection::{self, Ellipsoid, Projection, TransverseMercator};

/// Geographic EPSG codes read as plain longitude/latitude degrees
const GEOGRAPHIC_CODES: [u32; 3] = [4326, 4258, 4269];

/// Supported coordinate reference systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Geographic longitude/latitude in degrees (EPSG:4326 and friends)
    Geographic(u32),
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// WGS 84 UTM zone (EPSG:326xx northern, 327xx southern)
    UTM(u8, bool),
    /// Projected code from the projection registry
    Registered(u32),
}

impl CoordinateSystem {
    /// WGS 84 geographic coordinates
    pub const WGS84: CoordinateSystem = CoordinateSystem::Geographic(4326);

    /// Get the EPSG code for this coordinate system
    pub fn epsg_code(&self) -> u32 {
        match self {
            CoordinateSystem::Geographic(code) => *code,
            CoordinateSystem::WebMercator => 3857,
            CoordinateSystem::UTM(zone, is_northern) => {
                if *is_northern {
                    32600 + *zone as u32
                } else {
                    32700 + *zone as u32
                }
            },
            CoordinateSystem::Registered(code) => *code,
        }
    }

    /// Whether coordinates are longitude/latitude degrees
    pub fn is_geographic(&self) -> bool {
        matches!(self, CoordinateSystem::Geographic(_))
    }

    /// Projection used by this system, None for geographic systems
    pub fn projection(&self) -> Option<Projection> {
        match self {
            CoordinateSystem::Geographic(_) => None,
            CoordinateSystem::WebMercator => Some(Projection::WebMercator),
            CoordinateSystem::UTM(zone, north) => Some(Projection::TransverseMercator(
                TransverseMercator::utm(*zone, *north, Ellipsoid::WGS84),
            )),
            CoordinateSystem::Registered(code) => {
                projection::registered_projection(*code).map(|def| def.projection)
            },
        }
    }

    /// Converts a coordinate of this system to longitude/latitude degrees
    pub fn to_lonlat(&self, point: Point) -> Point {
        match self.projection() {
            Some(p) => p.inverse(point),
            None => point,
        }
    }

    /// Converts longitude/latitude degrees to a coordinate of this system
    pub fn from_lonlat(&self, lonlat: Point) -> Point {
        match self.projection() {
            Some(p) => p.forward(lonlat),
            None => lonlat,
        }
    }

    /// Get a description of this coordinate system
    pub fn description(&self) -> String {
        match self {
            CoordinateSystem::Geographic(4326) => "WGS 84 (EPSG:4326)".to_string(),
            CoordinateSystem::Geographic(code) => format!("Geographic (EPSG:{})", code),
            CoordinateSystem::WebMercator => "Web Mercator (EPSG:3857)".to_string(),
            CoordinateSystem::UTM(zone, is_northern) => {
                let hemisphere = if *is_northern { "N" } else { "S" };
                format!("UTM Zone {}{} (EPSG:{})", zone, hemisphere, self.epsg_code())
            },
            CoordinateSystem::Registered(code) => match projection::registered_projection(*code) {
                Some(def) => format!("{} (EPSG:{})", def.name, code),
                None => format!("EPSG:{}", code),
            },
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg_code())
    }
}

/// Factory for creating coordinate systems
pub struct CoordinateSystemFactory;

impl CoordinateSystemFactory {
    /// Create a coordinate system from an EPSG code
    pub fn from_epsg(epsg: u32) -> ZonalResult<CoordinateSystem> {
        match epsg {
            code if GEOGRAPHIC_CODES.contains(&code) => Ok(CoordinateSystem::Geographic(code)),
            3857 | 900913 => Ok(CoordinateSystem::WebMercator),
            32601..=32660 => Ok(CoordinateSystem::UTM((epsg - 32600) as u8, true)),
            32701..=32760 => Ok(CoordinateSystem::UTM((epsg - 32700) as u8, false)),
            code if projection::registered_projection(code).is_some() => Ok(CoordinateSystem::Registered(code)),
            _ => Err(ZonalError::UnsupportedCrs(format!("EPSG:{}", epsg))),
        }
    }

    /// Parse a coordinate system from a string (e.g. "EPSG:4326")
    pub fn from_string(crs_str: &str) -> ZonalResult<CoordinateSystem> {
        let upper = crs_str.trim().to_uppercase();
        let code = upper.strip_prefix("EPSG:").unwrap_or(&upper);

        match code.parse::<u32>() {
            Ok(epsg) => Self::from_epsg(epsg),
            Err(_) => Err(ZonalError::UnsupportedCrs(crs_str.to_string())),
        }
    }
}
