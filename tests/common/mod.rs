//! Minimal little-endian GeoTIFF writer for test fixtures
//!
//! Writes float32 pixel-interleaved rasters in EPSG:4326 with GDAL band
//! descriptions, dataset items and an optional nodata marker.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Routes library logs to the test output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const SHORT: u16 = 3;
const LONG: u16 = 4;
const ASCII: u16 = 2;
const DOUBLE: u16 = 12;

pub struct FixtureRaster {
    pub width: u32,
    pub height: u32,
    /// Upper left corner (lon, lat)
    pub origin: (f64, f64),
    /// Pixel size in degrees
    pub pixel_size: f64,
    pub band_names: Vec<String>,
    /// Values per band, row-major
    pub bands: Vec<Vec<f32>>,
    pub items: Vec<(String, String)>,
    pub datetime: Option<String>,
    pub nodata: Option<String>,
    /// Tile size, strips of 8 rows when None
    pub tile: Option<u32>,
    pub deflate: bool,
}

impl FixtureRaster {
    /// A raster where every pixel of band `b` holds `value(b, col, row)`
    pub fn filled<F>(width: u32, height: u32, origin: (f64, f64), pixel_size: f64,
                     band_names: &[&str], value: F) -> Self
    where
        F: Fn(usize, u32, u32) -> f32,
    {
        let bands = (0..band_names.len())
            .map(|b| {
                (0..height)
                    .flat_map(|row| (0..width).map(move |col| (col, row)))
                    .map(|(col, row)| value(b, col, row))
                    .collect::<Vec<f32>>()
            })
            .collect();

        FixtureRaster {
            width,
            height,
            origin,
            pixel_size,
            band_names: band_names.iter().map(|s| s.to_string()).collect(),
            bands,
            items: Vec::new(),
            datetime: None,
            nodata: None,
            tile: Some(16),
            deflate: true,
        }
    }

    fn sample(&self, band: usize, col: u32, row: u32) -> f32 {
        if col >= self.width || row >= self.height {
            return 0.0;
        }
        self.bands[band][(row * self.width + col) as usize]
    }

    fn chunk_bytes(&self, x0: u32, y0: u32, w: u32, h: u32) -> Vec<u8> {
        let mut raw = Vec::new();
        for row in y0..y0 + h {
            for col in x0..x0 + w {
                for band in 0..self.bands.len() {
                    raw.write_f32::<LittleEndian>(self.sample(band, col, row)).unwrap();
                }
            }
        }
        if self.deflate {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&raw).unwrap();
            encoder.finish().unwrap()
        } else {
            raw
        }
    }

    fn gdal_metadata(&self) -> String {
        let mut xml = String::from("<GDALMetadata>\n");
        for (name, value) in &self.items {
            xml.push_str(&format!("  <Item name=\"{}\">{}</Item>\n", name, value));
        }
        for (i, name) in self.band_names.iter().enumerate() {
            xml.push_str(&format!(
                "  <Item name=\"DESCRIPTION\" sample=\"{}\" role=\"description\">{}</Item>\n", i, name
            ));
        }
        xml.push_str("</GDALMetadata>");
        xml
    }

    /// Encodes the raster as a classic TIFF
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0x49, 0x49, 42, 0, 0, 0, 0, 0];
        let bands = self.bands.len() as u32;

        // Pixel chunks first
        let mut offsets = Vec::new();
        let mut counts = Vec::new();
        let (chunk_w, chunk_h) = match self.tile {
            Some(t) => (t, t),
            None => (self.width, 8),
        };
        let across = self.width.div_ceil(chunk_w);
        let down = self.height.div_ceil(chunk_h);
        for cy in 0..down {
            for cx in 0..across {
                let rows = match self.tile {
                    Some(_) => chunk_h,
                    None => chunk_h.min(self.height - cy * chunk_h),
                };
                let bytes = self.chunk_bytes(cx * chunk_w, cy * chunk_h, chunk_w, rows);
                offsets.push(out.len() as u32);
                counts.push(bytes.len() as u32);
                out.extend_from_slice(&bytes);
            }
        }

        let mut entries: Vec<(u16, u16, u32, Vec<u8>)> = Vec::new();
        entries.push((256, LONG, 1, longs(&[self.width])));
        entries.push((257, LONG, 1, longs(&[self.height])));
        entries.push((258, SHORT, bands, shorts(&vec![32; bands as usize])));
        entries.push((259, SHORT, 1, shorts(&[if self.deflate { 8 } else { 1 }])));
        entries.push((262, SHORT, 1, shorts(&[1])));
        entries.push((277, SHORT, 1, shorts(&[bands as u16])));
        entries.push((284, SHORT, 1, shorts(&[1])));
        if let Some(dt) = &self.datetime {
            entries.push((306, ASCII, dt.len() as u32 + 1, ascii(dt)));
        }
        match self.tile {
            Some(t) => {
                entries.push((322, LONG, 1, longs(&[t])));
                entries.push((323, LONG, 1, longs(&[t])));
                entries.push((324, LONG, offsets.len() as u32, longs(&offsets)));
                entries.push((325, LONG, counts.len() as u32, longs(&counts)));
            },
            None => {
                entries.push((273, LONG, offsets.len() as u32, longs(&offsets)));
                entries.push((278, LONG, 1, longs(&[chunk_h])));
                entries.push((279, LONG, counts.len() as u32, longs(&counts)));
            }
        }
        entries.push((339, SHORT, bands, shorts(&vec![3; bands as usize])));
        entries.push((33550, DOUBLE, 3, doubles(&[self.pixel_size, self.pixel_size, 0.0])));
        entries.push((33922, DOUBLE, 6, doubles(&[0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0])));
        // GTModelType geographic, RasterType area, GeographicType 4326
        entries.push((34735, SHORT, 16, shorts(&[1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326])));
        let metadata = self.gdal_metadata();
        entries.push((42112, ASCII, metadata.len() as u32 + 1, ascii(&metadata)));
        if let Some(nodata) = &self.nodata {
            entries.push((42113, ASCII, nodata.len() as u32 + 1, ascii(nodata)));
        }
        entries.sort_by_key(|e| e.0);

        // Out-of-line values, word aligned
        let mut fields = Vec::new();
        for (_, _, _, bytes) in &entries {
            if bytes.len() <= 4 {
                let mut inline = bytes.clone();
                inline.resize(4, 0);
                fields.push(inline);
            } else {
                if out.len() % 2 == 1 {
                    out.push(0);
                }
                fields.push(longs(&[out.len() as u32]));
                out.extend_from_slice(bytes);
            }
        }

        if out.len() % 2 == 1 {
            out.push(0);
        }
        let ifd_offset = out.len() as u32;
        out[4..8].copy_from_slice(&ifd_offset.to_le_bytes());

        out.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
        for ((tag, field_type, count, _), field) in entries.iter().zip(fields) {
            out.write_u16::<LittleEndian>(*tag).unwrap();
            out.write_u16::<LittleEndian>(*field_type).unwrap();
            out.write_u32::<LittleEndian>(*count).unwrap();
            out.extend_from_slice(&field);
        }
        out.write_u32::<LittleEndian>(0).unwrap();
        out
    }

    pub fn write(&self, path: &Path) {
        fs::write(path, self.to_bytes()).unwrap();
    }
}

fn shorts(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_u16::<LittleEndian>(v).unwrap();
    }
    out
}

fn longs(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_u32::<LittleEndian>(v).unwrap();
    }
    out
}

fn doubles(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        out.write_f64::<LittleEndian>(v).unwrap();
    }
    out
}

fn ascii(text: &str) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    out.push(0);
    out
}
