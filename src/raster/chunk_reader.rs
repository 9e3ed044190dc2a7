//! Strip and tile reading
//!
//! Chunks overlapping a requested window are read, decompressed, freed of
//! their predictor and kept in a small cache, since neighbouring regions
//! of one image usually share chunks.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

use log::{debug, trace, warn};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::errors::{ZonalError, ZonalResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::predictor;

use super::layout::RasterLayout;
use super::sample::{self, decode_sample};
use super::window::{BandWindow, PixelWindow};

/// Cached chunks per image before the cache is flushed
const MAX_CACHED_CHUNKS: usize = 256;

/// Reads pixel windows from the chunks of one image
pub struct ChunkReader<R: SeekableReader> {
    reader: R,
    layout: RasterLayout,
    byte_order: ByteOrder,
    handler: Box<dyn ByteOrderHandler>,
    compression: Box<dyn CompressionHandler>,
    /// Decoded chunks; None for sparse or unreadable chunks
    cache: HashMap<usize, Option<Vec<u8>>>,
}

impl<R: SeekableReader> ChunkReader<R> {
    pub fn new(reader: R, layout: RasterLayout, byte_order: ByteOrder) -> ZonalResult<Self> {
        let compression = CompressionFactory::create_handler(layout.compression)?;
        debug!("Chunk reader using {} compression", compression.name());

        Ok(ChunkReader {
            reader,
            layout,
            byte_order,
            handler: byte_order.create_handler(),
            compression,
            cache: HashMap::new(),
        })
    }

    pub fn layout(&self) -> &RasterLayout {
        &self.layout
    }

    /// Reads, decompresses and caches one chunk
    fn load_chunk(&mut self, index: usize, chunk_y: u32) -> ZonalResult<()> {
        if self.cache.contains_key(&index) {
            return Ok(());
        }
        if self.cache.len() >= MAX_CACHED_CHUNKS {
            trace!("Flushing chunk cache");
            self.cache.clear();
        }

        let (offset, byte_count) = match (self.layout.offsets.get(index), self.layout.byte_counts.get(index)) {
            (Some(&o), Some(&c)) => (o, c),
            _ => {
                warn!("Chunk {} missing from offset table, treating as masked", index);
                self.cache.insert(index, None);
                return Ok(());
            }
        };

        if byte_count == 0 {
            trace!("Chunk {} is sparse", index);
            self.cache.insert(index, None);
            return Ok(());
        }

        let stream_len = self.reader.seek(SeekFrom::End(0))?;
        if offset.checked_add(byte_count).map_or(true, |end| end > stream_len) {
            return Err(ZonalError::GenericError(format!(
                "Chunk {} ({} bytes at offset {}) extends past the end of the file ({} bytes)",
                index, byte_count, offset, stream_len
            )));
        }

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0u8; byte_count as usize];
        self.reader.read_exact(&mut compressed)?;

        let mut data = self.compression.decompress(&compressed)?;
        let expected = self.layout.chunk_byte_len(chunk_y);
        if data.len() < expected {
            warn!("Chunk {} decoded to {} bytes, expected {}; missing pixels are masked",
                  index, data.len(), expected);
        }

        let (chunk_width, _) = self.layout.chunk_size();
        let samples = self.layout.chunk_samples();
        match self.layout.predictor {
            predictor::HORIZONTAL_DIFFERENCING => sample::undo_horizontal_predictor(
                &mut data, chunk_width as usize, samples, self.layout.bytes_per_sample, self.handler.as_ref(),
            ),
            predictor::FLOATING_POINT => sample::undo_floating_point_predictor(
                &mut data, chunk_width as usize, samples, self.layout.bytes_per_sample, self.byte_order,
            ),
            _ => {},
        }

        self.cache.insert(index, Some(data));
        Ok(())
    }

    /// Reads the given bands (0-based sample indices) for a window
    ///
    /// The window must lie inside the image. Pixels in sparse or short
    /// chunks come back as NaN.
    pub fn read_window(&mut self, window: PixelWindow, bands: &[usize]) -> ZonalResult<BandWindow> {
        let mut out = BandWindow::masked(window, bands.len());
        if window.is_empty() {
            return Ok(out);
        }

        let (cw, ch) = self.layout.chunk_size();
        let bps = self.layout.bytes_per_sample;
        let chunk_samples = self.layout.chunk_samples();

        for chunk_y in window.y / ch..=(window.end_y() - 1) / ch {
            for chunk_x in window.x / cw..=(window.end_x() - 1) / cw {
                let row_start = (chunk_y * ch).max(window.y);
                let row_end = ((chunk_y + 1) * ch).min(window.end_y());
                let col_start = (chunk_x * cw).max(window.x);
                let col_end = ((chunk_x + 1) * cw).min(window.end_x());

                for (pos, &band) in bands.iter().enumerate() {
                    let (plane, sample_in_chunk) = if self.layout.planar { (band, 0) } else { (0, band) };
                    let index = self.layout.chunk_index(plane, chunk_x, chunk_y);
                    self.load_chunk(index, chunk_y)?;

                    let data = match self.cache.get(&index) {
                        Some(Some(data)) => data,
                        _ => continue,
                    };

                    for row in row_start..row_end {
                        for col in col_start..col_end {
                            let pixel = (row - chunk_y * ch) as usize * cw as usize + (col - chunk_x * cw) as usize;
                            let at = (pixel * chunk_samples + sample_in_chunk) * bps;
                            let bytes = match data.get(at..at + bps) {
                                Some(bytes) => bytes,
                                None => continue,
                            };
                            let value = decode_sample(bytes, self.layout.sample_format, self.handler.as_ref());
                            let out_idx = (row - window.y) as usize * window.width as usize + (col - window.x) as usize;
                            out.values[pos][out_idx] = value;
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::layout::Chunking;
    use crate::raster::sample::SampleFormat;
    use crate::tiff::constants::compression;
    use std::io::Cursor;

    /// 4x3 single band u8 image in 2x2 tiles; the bottom-right tile is sparse
    fn tiled() -> ChunkReader<Cursor<Vec<u8>>> {
        let tiles: [[u8; 4]; 3] = [[0, 1, 4, 5], [2, 3, 6, 7], [8, 9, 0, 0]];
        let mut file = Vec::new();
        let mut offsets = Vec::new();
        for tile in tiles {
            offsets.push(file.len() as u64);
            file.extend_from_slice(&tile);
        }
        offsets.push(0);

        let layout = RasterLayout {
            width: 4,
            height: 3,
            samples_per_pixel: 1,
            bytes_per_sample: 1,
            sample_format: SampleFormat::Unsigned,
            planar: false,
            compression: compression::NONE,
            predictor: predictor::NONE,
            chunking: Chunking::Tiles { tile_width: 2, tile_height: 2 },
            offsets,
            byte_counts: vec![4, 4, 4, 0],
        };
        ChunkReader::new(Cursor::new(file), layout, ByteOrder::LittleEndian).unwrap()
    }

    #[test]
    fn window_spanning_tiles() {
        let mut reader = tiled();
        let w = reader.read_window(PixelWindow::new(1, 0, 2, 3), &[0]).unwrap();
        assert_eq!(w.get(0, 1, 0), Some(1.0));
        assert_eq!(w.get(0, 2, 0), Some(2.0));
        assert_eq!(w.get(0, 2, 1), Some(6.0));
        assert_eq!(w.get(0, 1, 2), Some(9.0));
        // Sparse tile
        assert_eq!(w.get(0, 2, 2), None);
    }

    #[test]
    fn chunky_strips_select_bands() {
        // 2x2 image, 2 bands of u16 little endian, one strip per row
        let mut file = Vec::new();
        for v in [1u16, 10, 2, 20, 3, 30, 4, 40] {
            file.extend_from_slice(&v.to_le_bytes());
        }
        let layout = RasterLayout {
            width: 2,
            height: 2,
            samples_per_pixel: 2,
            bytes_per_sample: 2,
            sample_format: SampleFormat::Unsigned,
            planar: false,
            compression: compression::NONE,
            predictor: predictor::NONE,
            chunking: Chunking::Strips { rows_per_strip: 1 },
            offsets: vec![0, 8],
            byte_counts: vec![8, 8],
        };
        let mut reader = ChunkReader::new(Cursor::new(file), layout, ByteOrder::LittleEndian).unwrap();

        let w = reader.read_window(PixelWindow::new(0, 0, 2, 2), &[1, 0]).unwrap();
        assert_eq!(w.values[0], vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(w.values[1], vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn chunk_past_end_of_file_is_an_error() {
        let layout = RasterLayout {
            width: 2,
            height: 1,
            samples_per_pixel: 1,
            bytes_per_sample: 1,
            sample_format: SampleFormat::Unsigned,
            planar: false,
            compression: compression::NONE,
            predictor: predictor::NONE,
            chunking: Chunking::Strips { rows_per_strip: 1 },
            offsets: vec![0],
            byte_counts: vec![u64::MAX],
        };
        let mut reader = ChunkReader::new(Cursor::new(vec![1u8, 2]), layout, ByteOrder::LittleEndian).unwrap();
        assert!(reader.read_window(PixelWindow::new(0, 0, 2, 1), &[0]).is_err());
    }
}
