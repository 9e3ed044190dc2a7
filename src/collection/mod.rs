//! Image collections
//!
//! An image is one GeoTIFF with named bands, typed properties and an
//! acquisition time; a collection orders and filters them by date.

mod image_collection;
mod image;
mod value;

pub use image_collection::ImageCollection;
pub use image::{date_from_name, GeoGrid, Image, DEFAULT_DATE_PATTERN, SYSTEM_INDEX, SYSTEM_PREFIX, SYSTEM_TIME_START};
pub use value::{Attributes, Value};
