//! Custom error types for zonal extraction
//!
//! A single error enum covers everything from TIFF decoding up to CSV
//! export, so every stage of the pipeline can propagate with `?`.

use std::fmt;
use std::io;

/// Errors raised while reading rasters, aggregating or exporting
#[derive(Debug)]
pub enum ZonalError {
    /// I/O error
    IoError(io::Error),
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Sample layout the raster reader cannot decode
    UnsupportedSampleLayout(String),
    /// Image dimensions not found
    MissingDimensions,
    /// No acquisition time could be derived for an image
    MissingTimestamp(String),
    /// The image collection has no images to pick a representative from
    EmptyCollection(String),
    /// A rename list does not match its source list in length
    RenameLengthMismatch {
        /// Which option pair was inconsistent ("bands" or "imgProps")
        what: &'static str,
        /// Number of source names
        sources: usize,
        /// Number of target names
        targets: usize,
    },
    /// A selected band is missing from an image
    UnknownBand {
        /// Band name that was requested
        band: String,
        /// Identifier of the image lacking it
        image: String,
    },
    /// Coordinate reference system without a known projection
    UnsupportedCrs(String),
    /// Invalid run configuration
    ConfigError(String),
    /// CSV writer failure
    CsvError(csv::Error),
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for ZonalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZonalError::IoError(e) => write!(f, "I/O error: {}", e),
            ZonalError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            ZonalError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            ZonalError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            ZonalError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            ZonalError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            ZonalError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            ZonalError::UnsupportedSampleLayout(msg) => write!(f, "Unsupported sample layout: {}", msg),
            ZonalError::MissingDimensions => write!(f, "Image dimensions not found"),
            ZonalError::MissingTimestamp(image) => {
                write!(f, "No acquisition time found for image '{}'", image)
            },
            ZonalError::EmptyCollection(id) => write!(
                f,
                "Image collection '{}' is empty; cannot resolve default bands and properties",
                id
            ),
            ZonalError::RenameLengthMismatch { what, sources, targets } => write!(
                f,
                "{} has {} entries but its rename list has {}",
                what, sources, targets
            ),
            ZonalError::UnknownBand { band, image } => {
                write!(f, "Band '{}' not found in image '{}'", band, image)
            },
            ZonalError::UnsupportedCrs(crs) => write!(f, "Unsupported coordinate reference system: {}", crs),
            ZonalError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ZonalError::CsvError(e) => write!(f, "CSV error: {}", e),
            ZonalError::GenericError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ZonalError {}

impl From<io::Error> for ZonalError {
    fn from(error: io::Error) -> Self {
        ZonalError::IoError(error)
    }
}

impl From<csv::Error> for ZonalError {
    fn from(error: csv::Error) -> Self {
        ZonalError::CsvError(error)
    }
}

impl From<toml::de::Error> for ZonalError {
    fn from(error: toml::de::Error) -> Self {
        ZonalError::ConfigError(error.to_string())
    }
}

impl From<String> for ZonalError {
    fn from(msg: String) -> Self {
        ZonalError::GenericError(msg)
    }
}

/// Result type for zonal extraction operations
pub type ZonalResult<T> = Result<T, ZonalError>;
