//! In-memory raster source

use crate::errors::{ZonalError, ZonalResult};

use super::source::{RasterMetadata, RasterSource};
use super::window::{BandWindow, PixelWindow};

/// Raster held in memory, one row-major buffer per band
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    metadata: RasterMetadata,
    bands: Vec<Vec<f64>>,
}

impl MemoryRaster {
    /// Creates a raster; every band buffer must hold width * height values
    pub fn new(metadata: RasterMetadata, bands: Vec<Vec<f64>>) -> ZonalResult<Self> {
        let expected = metadata.width as usize * metadata.height as usize;
        if bands.len() != metadata.band_names.len() {
            return Err(ZonalError::GenericError(format!(
                "{} band buffers for {} band names", bands.len(), metadata.band_names.len()
            )));
        }
        if let Some(bad) = bands.iter().position(|b| b.len() != expected) {
            return Err(ZonalError::GenericError(format!(
                "Band {} holds {} values, expected {}", bad, bands[bad].len(), expected
            )));
        }
        Ok(MemoryRaster { metadata, bands })
    }
}

impl RasterSource for MemoryRaster {
    fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    fn read_window(&mut self, window: PixelWindow, bands: &[usize]) -> ZonalResult<BandWindow> {
        let mut out = BandWindow::masked(window, bands.len());
        let width = self.metadata.width as usize;

        for (pos, &band) in bands.iter().enumerate() {
            let data = self.bands.get(band).ok_or_else(|| {
                ZonalError::GenericError(format!("Band index {} out of range", band))
            })?;
            for row in window.y..window.end_y().min(self.metadata.height) {
                for col in window.x..window.end_x().min(self.metadata.width) {
                    let idx = (row - window.y) as usize * window.width as usize + (col - window.x) as usize;
                    out.values[pos][idx] = data[row as usize * width + col as usize];
                }
            }
        }

        out.mask_nodata(self.metadata.nodata);
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("memory raster {}x{}", self.metadata.width, self.metadata.height)
    }
}
