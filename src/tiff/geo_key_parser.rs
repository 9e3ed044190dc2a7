//! GeoTIFF metadata and GeoKey parsing
//!
//! Interprets the GeoKey directory and the model tags (pixel scale,
//! tiepoint, transformation) into the affine georeferencing of an image.

use log::{debug, warn};

use crate::errors::ZonalResult;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{geo_keys, model_type, tags, USER_DEFINED};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// One entry of the GeoKey directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    /// Key identifier
    pub key_id: u16,
    /// Tag holding the value, 0 when the value is inline
    pub tiff_tag_location: u16,
    /// Number of values
    pub count: u16,
    /// Inline value, or index into the referenced tag
    pub value_offset: u16,
}

impl GeoKeyEntry {
    pub fn new(key_id: u16, tiff_tag_location: u16, count: u16, value_offset: u16) -> Self {
        Self { key_id, tiff_tag_location, count, value_offset }
    }

    /// Inline short value, if the key stores one
    pub fn inline_value(&self) -> Option<u16> {
        (self.tiff_tag_location == 0).then_some(self.value_offset)
    }
}

/// Affine pixel-to-map transform in GDAL geotransform order
///
/// `x = origin_x + col * pixel_width + row * row_rotation`
/// `y = origin_y + col * col_rotation + row * pixel_height`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform from an upper-left corner and pixel size
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height: -pixel_height.abs(),
        }
    }

    /// Map coordinates of a fractional pixel position
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width + row * self.row_rotation,
            self.origin_y + col * self.col_rotation + row * self.pixel_height,
        )
    }

    /// Fractional pixel position of a map coordinate, None for a singular transform
    pub fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (dx * self.pixel_height - dy * self.row_rotation) / det;
        let row = (dy * self.pixel_width - dx * self.col_rotation) / det;
        Some((col, row))
    }

    /// Nominal pixel size in map units (mean of the two axis lengths)
    pub fn nominal_pixel_size(&self) -> f64 {
        let sx = self.pixel_width.hypot(self.col_rotation);
        let sy = self.row_rotation.hypot(self.pixel_height);
        (sx + sy) / 2.0
    }
}

/// Geospatial information extracted from a GeoTIFF
#[derive(Debug, Clone, Default)]
pub struct GeoInfo {
    /// ProjectedCSTypeGeoKey
    pub projected_cs_code: u16,
    /// GeographicTypeGeoKey
    pub geographic_cs_code: u16,
    /// GTModelTypeGeoKey
    pub model_type: u16,
    /// Pixel-to-map transform, if the file carries one
    pub transform: Option<GeoTransform>,
}

impl GeoInfo {
    /// EPSG code of the image CRS, if the keys name one
    pub fn epsg_code(&self) -> Option<u32> {
        let projected = self.projected_cs_code != 0 && self.projected_cs_code != USER_DEFINED;
        let geographic = self.geographic_cs_code != 0 && self.geographic_cs_code != USER_DEFINED;

        match self.model_type {
            model_type::GEOGRAPHIC if geographic => Some(self.geographic_cs_code as u32),
            _ if projected => Some(self.projected_cs_code as u32),
            _ if geographic => Some(self.geographic_cs_code as u32),
            _ => None,
        }
    }
}

/// Parser for GeoTIFF geographic metadata
pub struct GeoKeyParser;

impl GeoKeyParser {
    /// Parses the GeoKey directory, empty when the tag is absent
    pub fn parse_geo_key_directory(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> ZonalResult<Vec<GeoKeyEntry>> {
        if !ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            return Ok(Vec::new());
        }

        let values = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
        if values.len() < 4 {
            warn!("GeoKey directory too short ({} values), ignoring", values.len());
            return Ok(Vec::new());
        }

        let num_keys = values[3] as usize;
        debug!("GeoKey directory: version={}, revision={}.{}, keys={}",
               values[0], values[1], values[2], num_keys);

        let keys = values[4..]
            .chunks_exact(4)
            .take(num_keys)
            .map(|k| GeoKeyEntry::new(k[0] as u16, k[1] as u16, k[2] as u16, k[3] as u16))
            .collect();

        Ok(keys)
    }

    /// Extracts CRS codes and the affine transform from an IFD
    pub fn extract_geo_info(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> ZonalResult<GeoInfo> {
        let mut geo_info = GeoInfo::default();

        for key in Self::parse_geo_key_directory(tiff_reader, reader, ifd)? {
            let value = match key.inline_value() {
                Some(v) => v,
                None => continue,
            };
            match key.key_id {
                geo_keys::PROJECTED_CS_TYPE => geo_info.projected_cs_code = value,
                geo_keys::GEOGRAPHIC_TYPE => geo_info.geographic_cs_code = value,
                geo_keys::MODEL_TYPE => geo_info.model_type = value,
                _ => {}
            }
        }

        geo_info.transform = Self::read_transform(tiff_reader, reader, ifd)?;
        Ok(geo_info)
    }

    /// Builds the transform from ModelTransformation, or PixelScale plus Tiepoint
    fn read_transform(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
    ) -> ZonalResult<Option<GeoTransform>> {
        if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
            let m = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
            if m.len() >= 8 {
                return Ok(Some(GeoTransform {
                    origin_x: m[3],
                    pixel_width: m[0],
                    row_rotation: m[1],
                    origin_y: m[7],
                    col_rotation: m[4],
                    pixel_height: m[5],
                }));
            }
            warn!("ModelTransformation has {} values, expected 16", m.len());
        }

        if !ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) || !ifd.has_tag(tags::MODEL_TIEPOINT_TAG) {
            return Ok(None);
        }

        let scale = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        let tie = tiff_reader.read_f64_values(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
        if scale.len() < 2 || tie.len() < 6 {
            warn!("Incomplete pixel scale / tiepoint tags, image is not georeferenced");
            return Ok(None);
        }

        // Tiepoint (i, j) maps to (x, y); rows grow southwards
        let (i, j, x, y) = (tie[0], tie[1], tie[3], tie[4]);
        let origin_x = x - i * scale[0];
        let origin_y = y + j * scale[1];

        Ok(Some(GeoTransform::north_up(origin_x, origin_y, scale[0], scale[1])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transform_inverts_rotated_grid() {
        let gt = GeoTransform {
            origin_x: 100.0,
            pixel_width: 2.0,
            row_rotation: 0.5,
            origin_y: 50.0,
            col_rotation: 0.25,
            pixel_height: -2.0,
        };
        let (x, y) = gt.apply(3.5, 7.25);
        let (col, row) = gt.invert(x, y).unwrap();
        assert_relative_eq!(col, 3.5, epsilon = 1e-9);
        assert_relative_eq!(row, 7.25, epsilon = 1e-9);
    }

    #[test]
    fn projected_code_wins_for_projected_models() {
        let info = GeoInfo {
            projected_cs_code: 5243,
            geographic_cs_code: 4258,
            model_type: model_type::PROJECTED,
            transform: None,
        };
        assert_eq!(info.epsg_code(), Some(5243));

        let geographic = GeoInfo { model_type: model_type::GEOGRAPHIC, projected_cs_code: 0, ..info };
        assert_eq!(geographic.epsg_code(), Some(4258));
    }

    #[test]
    fn user_defined_codes_are_ignored() {
        let info = GeoInfo { projected_cs_code: USER_DEFINED, ..GeoInfo::default() };
        assert_eq!(info.epsg_code(), None);
    }
}
