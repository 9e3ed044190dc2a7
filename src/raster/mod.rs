//! Raster access
//!
//! Decodes pixel windows from strips or tiles of GeoTIFF files, and
//! offers the same interface for rasters held in memory.

mod chunk_reader;
mod geotiff_source;
mod layout;
mod memory_source;
mod sample;
mod source;
mod window;

pub use chunk_reader::ChunkReader;
pub use geotiff_source::GeoTiffSource;
pub use layout::{Chunking, RasterLayout};
pub use memory_source::MemoryRaster;
pub use sample::SampleFormat;
pub use source::{RasterMetadata, RasterSource, RasterSourceFactory};
pub use window::{BandWindow, PixelWindow};
