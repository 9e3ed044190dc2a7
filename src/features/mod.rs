//! Point records and the regions buffered around them

mod buffer;
mod geometry;
mod point;
mod region;

pub use buffer::buffer_points;
pub use geometry::Geometry;
pub use point::PointRecord;
pub use region::Region;
