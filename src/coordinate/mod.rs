//! Coordinate handling for geospatial data
//!
//! Points, bounding boxes, supported coordinate reference systems and the
//! projections behind them.

mod bbox;
mod crs;
pub mod geodesy;
mod point;
pub mod projection;
mod transform;

pub use self::bbox::BoundingBox;
pub use self::crs::{CoordinateSystem, CoordinateSystemFactory};
pub use self::point::Point;
pub use self::transform::{densify, CoordinateTransformer};
