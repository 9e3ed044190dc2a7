//! Physical layout of the pixel data of one IFD

use log::debug;

use crate::compression::CompressionFactory;
use crate::errors::{ZonalError, ZonalResult};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, planar_config, predictor, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

use super::sample::SampleFormat;

/// How the image is cut into independently compressed chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunking {
    /// Full-width strips
    Strips { rows_per_strip: u32 },
    /// Fixed-size tiles, padded at the right and bottom edges
    Tiles { tile_width: u32, tile_height: u32 },
}

/// Everything needed to locate and decode a pixel sample
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayout {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: usize,
    pub bytes_per_sample: usize,
    pub sample_format: SampleFormat,
    /// Whether each band is stored in its own set of chunks
    pub planar: bool,
    pub compression: u64,
    pub predictor: u64,
    pub chunking: Chunking,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
}

impl RasterLayout {
    /// Reads the layout tags of an IFD and checks they can be decoded
    pub fn from_ifd(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> ZonalResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(ZonalError::MissingDimensions)?;
        let samples_per_pixel = ifd.get_samples_per_pixel() as usize;

        let bits = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
            tiff_reader.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?
        } else {
            vec![1]
        };
        let bits_per_sample = bits.first().copied().ok_or_else(|| {
            ZonalError::UnsupportedSampleLayout("BitsPerSample has no values".to_string())
        })?;
        if bits.iter().any(|&b| b != bits_per_sample) {
            return Err(ZonalError::UnsupportedSampleLayout(format!("mixed bits per sample {:?}", bits)));
        }

        let format_value = if ifd.has_tag(tags::SAMPLE_FORMAT) {
            tiff_reader.read_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?
                .first()
                .copied()
                .ok_or_else(|| ZonalError::UnsupportedSampleLayout("SampleFormat has no values".to_string()))?
        } else {
            1
        };
        let sample_format = SampleFormat::from_tag(format_value)
            .ok_or_else(|| ZonalError::UnsupportedSampleLayout(format!("sample format {}", format_value)))?;

        let supported = match sample_format {
            SampleFormat::Float => matches!(bits_per_sample, 32 | 64),
            _ => matches!(bits_per_sample, 8 | 16 | 32 | 64),
        };
        if !supported {
            return Err(ZonalError::UnsupportedSampleLayout(format!(
                "{} bit {} samples", bits_per_sample, sample_format.name()
            )));
        }

        let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY)
            == planar_config::PLANAR;
        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE);
        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE);

        match (predictor, sample_format) {
            (predictor::NONE, _) => {},
            (predictor::HORIZONTAL_DIFFERENCING, SampleFormat::Unsigned | SampleFormat::Signed) => {},
            (predictor::FLOATING_POINT, SampleFormat::Float) => {},
            _ => {
                return Err(ZonalError::UnsupportedSampleLayout(format!(
                    "predictor {} with {} samples", predictor, sample_format.name()
                )));
            }
        }

        let (chunking, offsets, byte_counts) = if ifd.is_tiled() {
            let chunking = Chunking::Tiles {
                tile_width: ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(256) as u32,
                tile_height: ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(256) as u32,
            };
            (
                chunking,
                tiff_reader.read_tag_values(reader, ifd, tags::TILE_OFFSETS)?,
                tiff_reader.read_tag_values(reader, ifd, tags::TILE_BYTE_COUNTS)?,
            )
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .unwrap_or(height)
                .clamp(1, height.max(1)) as u32;
            (
                Chunking::Strips { rows_per_strip },
                tiff_reader.read_tag_values(reader, ifd, tags::STRIP_OFFSETS)?,
                tiff_reader.read_tag_values(reader, ifd, tags::STRIP_BYTE_COUNTS)?,
            )
        };

        let layout = RasterLayout {
            width: width as u32,
            height: height as u32,
            samples_per_pixel,
            bytes_per_sample: bits_per_sample as usize / 8,
            sample_format,
            planar,
            compression,
            predictor,
            chunking,
            offsets,
            byte_counts,
        };

        debug!("Raster layout: {}x{}, {} bands of {} bit {}, {:?}, {} chunks, {}",
               layout.width, layout.height, samples_per_pixel, bits_per_sample,
               sample_format.name(), layout.chunking, layout.offsets.len(),
               CompressionFactory::describe(compression));
        Ok(layout)
    }

    /// Nominal chunk size in pixels
    pub fn chunk_size(&self) -> (u32, u32) {
        match self.chunking {
            Chunking::Strips { rows_per_strip } => (self.width, rows_per_strip.max(1)),
            Chunking::Tiles { tile_width, tile_height } => (tile_width.max(1), tile_height.max(1)),
        }
    }

    /// Number of chunk columns and rows per plane
    pub fn chunk_grid(&self) -> (u32, u32) {
        let (cw, ch) = self.chunk_size();
        (self.width.div_ceil(cw), self.height.div_ceil(ch))
    }

    /// Samples interleaved in each chunk
    pub fn chunk_samples(&self) -> usize {
        if self.planar { 1 } else { self.samples_per_pixel }
    }

    /// Index into offsets/byte counts of a chunk
    pub fn chunk_index(&self, plane: usize, chunk_x: u32, chunk_y: u32) -> usize {
        let (across, down) = self.chunk_grid();
        plane * (across as usize * down as usize) + chunk_y as usize * across as usize + chunk_x as usize
    }

    /// Rows actually stored in a chunk row; the last strip may be short
    pub fn chunk_rows(&self, chunk_y: u32) -> u32 {
        let (_, ch) = self.chunk_size();
        match self.chunking {
            Chunking::Strips { .. } => ch.min(self.height.saturating_sub(chunk_y * ch)),
            Chunking::Tiles { .. } => ch,
        }
    }

    /// Decoded size of a chunk in bytes
    pub fn chunk_byte_len(&self, chunk_y: u32) -> usize {
        let (cw, _) = self.chunk_size();
        cw as usize * self.chunk_rows(chunk_y) as usize * self.chunk_samples() * self.bytes_per_sample
    }
}
