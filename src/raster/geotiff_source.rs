//! GeoTIFF raster source

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::errors::{ZonalError, ZonalResult};
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{new_subfile_type, tags};
use crate::tiff::geo_key_parser::GeoKeyParser;
use crate::tiff::ifd::IFD;
use crate::tiff::metadata::{parse_nodata, GdalMetadata};
use crate::tiff::reader::TiffReader;

use super::chunk_reader::ChunkReader;
use super::layout::RasterLayout;
use super::source::{RasterMetadata, RasterSource};
use super::window::{BandWindow, PixelWindow};

/// Raster source backed by a (Big)TIFF file
///
/// Only the directory is read on open. The file is reopened for pixel
/// access on the first window read and closed again by `release`.
pub struct GeoTiffSource {
    path: PathBuf,
    metadata: RasterMetadata,
    layout: RasterLayout,
    byte_order: ByteOrder,
    chunks: Option<ChunkReader<BufReader<File>>>,
}

impl GeoTiffSource {
    /// Reads the directory and metadata of a GeoTIFF
    pub fn open(path: &Path) -> ZonalResult<Self> {
        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.load(path)?;

        // Full resolution image, skipping overviews and masks
        let ifd = tiff.ifds.iter()
            .find(|ifd| {
                ifd.get_tag_value(tags::NEW_SUBFILE_TYPE)
                    .map(|t| t & (new_subfile_type::REDUCED_RESOLUTION | new_subfile_type::TRANSPARENCY_MASK) == 0)
                    .unwrap_or(true)
            })
            .ok_or_else(|| ZonalError::GenericError(format!("No image found in {}", path.display())))?;

        let mut reader = tiff_reader.create_reader()?;
        let layout = RasterLayout::from_ifd(&tiff_reader, &mut reader, ifd)?;
        let metadata = Self::read_metadata(&tiff_reader, &mut reader, ifd, &layout)?;
        debug!("Opened {}: {}x{}, bands {:?}",
               path.display(), metadata.width, metadata.height, metadata.band_names);

        Ok(GeoTiffSource {
            path: path.to_path_buf(),
            metadata,
            layout,
            byte_order: tiff.byte_order,
            chunks: None,
        })
    }

    fn chunk_reader(&mut self) -> ZonalResult<&mut ChunkReader<BufReader<File>>> {
        if self.chunks.is_none() {
            debug!("Opening {} for pixel access", self.path.display());
            let reader = BufReader::new(File::open(&self.path)?);
            self.chunks = Some(ChunkReader::new(reader, self.layout.clone(), self.byte_order)?);
        }
        self.chunks
            .as_mut()
            .ok_or_else(|| ZonalError::GenericError("Chunk reader unavailable".to_string()))
    }

    fn read_metadata(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        layout: &RasterLayout,
    ) -> ZonalResult<RasterMetadata> {
        let geo = GeoKeyParser::extract_geo_info(tiff_reader, reader, ifd)?;

        let gdal = if ifd.has_tag(tags::GDAL_METADATA) {
            let xml = tiff_reader.read_ascii(reader, ifd, tags::GDAL_METADATA)?;
            GdalMetadata::parse(&xml).unwrap_or_else(|e| {
                warn!("Ignoring unreadable GDAL metadata: {}", e);
                GdalMetadata::default()
            })
        } else {
            GdalMetadata::default()
        };

        let nodata = if ifd.has_tag(tags::GDAL_NODATA) {
            let text = tiff_reader.read_ascii(reader, ifd, tags::GDAL_NODATA)?;
            let value = parse_nodata(&text);
            if value.is_none() {
                warn!("Ignoring non-numeric nodata value '{}'", text);
            }
            value
        } else {
            None
        };

        let datetime = if ifd.has_tag(tags::DATE_TIME) {
            Some(tiff_reader.read_ascii(reader, ifd, tags::DATE_TIME)?)
        } else {
            None
        };

        let band_names = (0..layout.samples_per_pixel)
            .map(|i| gdal.band_description(i)
                .map(str::to_string)
                .unwrap_or_else(|| format!("b{}", i + 1)))
            .collect();

        Ok(RasterMetadata {
            width: layout.width,
            height: layout.height,
            band_names,
            transform: geo.transform,
            epsg: geo.epsg_code(),
            nodata,
            items: gdal.dataset_items,
            datetime,
        })
    }
}

impl RasterSource for GeoTiffSource {
    fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    fn read_window(&mut self, window: PixelWindow, bands: &[usize]) -> ZonalResult<BandWindow> {
        let window = match window.clip(self.metadata.width, self.metadata.height) {
            Some(w) if w == window => w,
            Some(_) | None => {
                return Err(ZonalError::GenericError(format!(
                    "Window {:?} outside {}x{} raster", window, self.metadata.width, self.metadata.height
                )));
            }
        };
        if let Some(&bad) = bands.iter().find(|&&b| b >= self.metadata.band_count()) {
            return Err(ZonalError::GenericError(format!("Band index {} out of range", bad)));
        }

        let mut out = self.chunk_reader()?.read_window(window, bands)?;
        out.mask_nodata(self.metadata.nodata);
        Ok(out)
    }

    fn release(&mut self) {
        self.chunks = None;
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
