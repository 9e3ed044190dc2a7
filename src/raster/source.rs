//! Raster sources
//!
//! An image reads its pixels through a [`RasterSource`]. GeoTIFF files
//! are the on-disk format; [`MemoryRaster`](super::MemoryRaster) serves
//! synthetic images.

use std::path::Path;

use crate::errors::{ZonalError, ZonalResult};
use crate::tiff::geo_key_parser::GeoTransform;

use super::geotiff_source::GeoTiffSource;
use super::window::{BandWindow, PixelWindow};

/// Descriptive information about a raster, available without reading pixels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterMetadata {
    pub width: u32,
    pub height: u32,
    /// One name per band
    pub band_names: Vec<String>,
    /// Pixel-to-map transform
    pub transform: Option<GeoTransform>,
    /// EPSG code named by the file, if any
    pub epsg: Option<u32>,
    /// Value marking missing pixels
    pub nodata: Option<f64>,
    /// Dataset level metadata items, in file order
    pub items: Vec<(String, String)>,
    /// TIFF DateTime tag ("YYYY:MM:DD HH:MM:SS")
    pub datetime: Option<String>,
}

impl RasterMetadata {
    pub fn band_count(&self) -> usize {
        self.band_names.len()
    }

    /// Index of a band by name
    pub fn band_index(&self, name: &str) -> Option<usize> {
        self.band_names.iter().position(|b| b == name)
    }
}

/// Source of pixel values for one image
pub trait RasterSource: Send {
    /// Metadata read when the source was opened
    fn metadata(&self) -> &RasterMetadata;

    /// Reads the given bands for a window inside the raster
    ///
    /// Values equal to the nodata marker, and NaN, come back masked.
    fn read_window(&mut self, window: PixelWindow, bands: &[usize]) -> ZonalResult<BandWindow>;

    /// Drops open file handles and cached chunks until the next read
    fn release(&mut self) {}

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Factory opening a raster source by file extension
pub struct RasterSourceFactory;

impl RasterSourceFactory {
    /// Whether a path has an extension a source exists for
    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "tif" | "tiff"))
            .unwrap_or(false)
    }

    /// Opens the file as a raster source
    pub fn open(path: &Path) -> ZonalResult<Box<dyn RasterSource>> {
        if !Self::is_supported(path) {
            return Err(ZonalError::GenericError(format!(
                "Unsupported raster file: {}", path.display()
            )));
        }
        Ok(Box::new(GeoTiffSource::open(path)?))
    }
}
