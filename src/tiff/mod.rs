//! TIFF file format parsing module
//!
//! Structures and functions for reading the directory, georeferencing and
//! GDAL metadata of TIFF and BigTIFF files.

pub mod constants;
pub mod geo_key_parser;
pub mod ifd;
pub mod metadata;
pub mod reader;
pub mod types;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use geo_key_parser::{GeoInfo, GeoKeyEntry, GeoKeyParser, GeoTransform};
pub use ifd::{IFD, IFDEntry};
pub use metadata::GdalMetadata;
pub use reader::TiffReader;
pub use types::TIFF;
