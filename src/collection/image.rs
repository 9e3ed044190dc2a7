//! Timestamped multi-band images

use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use regex::Regex;

use crate::coordinate::{BoundingBox, CoordinateSystem, CoordinateSystemFactory, CoordinateTransformer, Point};
use crate::coordinate::geodesy::METERS_PER_DEGREE;
use crate::errors::{ZonalError, ZonalResult};
use crate::raster::{BandWindow, PixelWindow, RasterMetadata, RasterSource, RasterSourceFactory};
use crate::tiff::GeoTransform;

use super::value::{Attributes, Value};

/// Property holding the image identifier
pub const SYSTEM_INDEX: &str = "system:index";
/// Property holding the acquisition time in milliseconds since the epoch
pub const SYSTEM_TIME_START: &str = "system:time_start";
/// Prefix of reserved properties
pub const SYSTEM_PREFIX: &str = "system:";

/// Date pattern used when a collection does not configure one
pub const DEFAULT_DATE_PATTERN: &str =
    r"(?P<year>(?:19|20)\d{2})[-_]?(?P<month>[01]\d)[-_]?(?P<day>[0-3]\d)";

const TIFF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Edge samples used when projecting the raster outline to lon/lat
const FOOTPRINT_STEPS: usize = 16;

/// Georeferenced pixel grid of an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoGrid {
    pub width: u32,
    pub height: u32,
    pub transform: GeoTransform,
    pub crs: CoordinateSystem,
}

impl GeoGrid {
    /// Map coordinates of a pixel centre
    pub fn pixel_center(&self, col: u32, row: u32) -> Point {
        let (x, y) = self.transform.apply(col as f64 + 0.5, row as f64 + 0.5);
        Point::new(x, y)
    }

    /// Pixel containing a map coordinate, None outside the grid
    pub fn pixel_at(&self, point: &Point) -> Option<(u32, u32)> {
        let (col, row) = self.transform.invert(point.x, point.y)?;
        let (col, row) = (col.floor(), row.floor());
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return None;
        }
        Some((col as u32, row as u32))
    }

    /// Extent of the grid in its own coordinates
    pub fn extent(&self) -> BoundingBox {
        let (w, h) = (self.width as f64, self.height as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
            .into_iter()
            .map(|(c, r)| {
                let (x, y) = self.transform.apply(c, r);
                Point::new(x, y)
            });
        BoundingBox::from_points(corners).unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Lon/lat bounding box of the grid
    pub fn footprint_lonlat(&self) -> Option<BoundingBox> {
        CoordinateTransformer::transform_bbox(&self.extent(), &self.crs, &CoordinateSystem::WGS84, FOOTPRINT_STEPS)
    }

    /// Pixel size in metres, degrees converted along the equator
    pub fn nominal_scale(&self) -> f64 {
        let size = self.transform.nominal_pixel_size();
        if self.crs.is_geographic() {
            size * METERS_PER_DEGREE
        } else {
            size
        }
    }
}

/// A raster with named bands, typed properties and an acquisition time
pub struct Image {
    id: String,
    time_start: i64,
    grid: GeoGrid,
    footprint: Option<BoundingBox>,
    band_names: Vec<String>,
    properties: Attributes,
    source: Box<dyn RasterSource>,
}

impl Image {
    /// Opens a raster file; the file stem becomes the image id
    pub fn open(path: &Path, date_pattern: &Regex) -> ZonalResult<Image> {
        let id = path.file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ZonalError::GenericError(format!("Invalid image file name: {}", path.display())))?
            .to_string();
        let source = RasterSourceFactory::open(path)?;
        Image::from_source(&id, source, date_pattern)
    }

    /// Builds an image around an opened raster source
    pub fn from_source(id: &str, source: Box<dyn RasterSource>, date_pattern: &Regex) -> ZonalResult<Image> {
        let metadata = source.metadata();

        let transform = metadata.transform.ok_or_else(|| {
            ZonalError::GenericError(format!("Image '{}' is not georeferenced", id))
        })?;
        let crs = match metadata.epsg {
            Some(code) => CoordinateSystemFactory::from_epsg(code)?,
            None => {
                debug!("Image '{}' names no CRS, assuming {}", id, CoordinateSystem::WGS84);
                CoordinateSystem::WGS84
            }
        };
        let grid = GeoGrid { width: metadata.width, height: metadata.height, transform, crs };

        let time_start = acquisition_time(id, metadata, date_pattern)?;

        let mut properties: Attributes = metadata.items.iter()
            .map(|(name, value)| (name.clone(), Value::parse_typed(value)))
            .collect();
        properties.set(SYSTEM_INDEX, id);
        properties.set(SYSTEM_TIME_START, time_start);

        let band_names = metadata.band_names.clone();
        let footprint = grid.footprint_lonlat();
        if footprint.is_none() {
            warn!("Image '{}' has no finite lon/lat footprint", id);
        }

        Ok(Image {
            id: id.to_string(),
            time_start,
            grid,
            footprint,
            band_names,
            properties,
            source,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Acquisition time in milliseconds since the epoch
    pub fn time_start(&self) -> i64 {
        self.time_start
    }

    /// Acquisition time as a UTC date
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time_start)
    }

    pub fn grid(&self) -> &GeoGrid {
        &self.grid
    }

    /// Lon/lat bounding box of the raster
    pub fn footprint(&self) -> Option<BoundingBox> {
        self.footprint
    }

    pub fn band_names(&self) -> &[String] {
        &self.band_names
    }

    pub fn band_index(&self, name: &str) -> Option<usize> {
        self.band_names.iter().position(|b| b == name)
    }

    pub fn properties(&self) -> &Attributes {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Property names outside the reserved `system:` namespace
    pub fn non_system_property_names(&self) -> Vec<String> {
        self.properties.names()
            .filter(|n| !n.starts_with(SYSTEM_PREFIX))
            .map(str::to_string)
            .collect()
    }

    /// Reads band values for a pixel window
    pub fn read_window(&mut self, window: PixelWindow, bands: &[usize]) -> ZonalResult<BandWindow> {
        self.source.read_window(window, bands)
    }

    /// Releases file handles and cached pixel data
    pub fn release(&mut self) {
        self.source.release();
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.time_start.to_string());
        writeln!(f, "Image {} ({})", self.id, self.source.describe())?;
        writeln!(f, "  Date: {}", date)?;
        writeln!(f, "  Size: {}x{}, {}", self.grid.width, self.grid.height, self.grid.crs.description())?;
        writeln!(f, "  Bands: {}", self.band_names.join(", "))?;
        if let Some(fp) = self.footprint {
            writeln!(f, "  Footprint: {:.4},{:.4},{:.4},{:.4}", fp.min_x, fp.min_y, fp.max_x, fp.max_y)?;
        }
        for (name, value) in self.properties.iter() {
            writeln!(f, "  {} = {}", name, value)?;
        }
        Ok(())
    }
}

/// Acquisition time in ms: metadata item, then DateTime tag, then file name
fn acquisition_time(id: &str, metadata: &RasterMetadata, date_pattern: &Regex) -> ZonalResult<i64> {
    if let Some((_, text)) = metadata.items.iter().find(|(n, _)| n == SYSTEM_TIME_START) {
        match Value::parse_typed(text).as_f64() {
            Some(ms) => return Ok(ms as i64),
            None => warn!("Image '{}': ignoring non-numeric {} '{}'", id, SYSTEM_TIME_START, text),
        }
    }

    if let Some(text) = &metadata.datetime {
        match NaiveDateTime::parse_from_str(text.trim(), TIFF_DATETIME_FORMAT) {
            Ok(dt) => return Ok(dt.and_utc().timestamp_millis()),
            Err(e) => warn!("Image '{}': ignoring DateTime tag '{}': {}", id, text, e),
        }
    }

    if let Some(date) = date_from_name(id, date_pattern) {
        debug!("Image '{}': date {} taken from the file name", id, date);
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    Err(ZonalError::MissingTimestamp(id.to_string()))
}

/// Date matched in a name by a pattern with `year` and either `month`/`day` or `doy` groups
pub fn date_from_name(name: &str, pattern: &Regex) -> Option<NaiveDate> {
    let caps = pattern.captures(name)?;
    let number = |group: &str| caps.name(group).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.name("year")?.as_str().parse::<i32>().ok()?;
    if let Some(doy) = number("doy") {
        return NaiveDate::from_yo_opt(year, doy);
    }
    NaiveDate::from_ymd_opt(year, number("month").unwrap_or(1), number("day").unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::MemoryRaster;
    use approx::assert_abs_diff_eq;

    fn pattern() -> Regex {
        Regex::new(DEFAULT_DATE_PATTERN).unwrap()
    }

    fn metadata() -> RasterMetadata {
        RasterMetadata {
            width: 4,
            height: 2,
            band_names: vec!["GMT_0000_PAR".to_string()],
            transform: Some(GeoTransform::north_up(10.0, 52.0, 0.5, 0.5)),
            epsg: Some(4326),
            items: vec![("platform".to_string(), "Terra".to_string()), ("version".to_string(), "61".to_string())],
            ..RasterMetadata::default()
        }
    }

    fn image(metadata: RasterMetadata, id: &str) -> ZonalResult<Image> {
        let raster = MemoryRaster::new(metadata, vec![vec![1.0; 8]])?;
        Image::from_source(id, Box::new(raster), &pattern())
    }

    #[test]
    fn timestamp_precedence() {
        let mut md = metadata();
        md.datetime = Some("2006:03:04 12:00:00".to_string());
        md.items.push((SYSTEM_TIME_START.to_string(), "1136073600000".to_string()));
        assert_eq!(image(md.clone(), "PAR_2010_01_01").unwrap().time_start(), 1136073600000);

        md.items.pop();
        let img = image(md.clone(), "PAR_2010_01_01").unwrap();
        assert_eq!(img.date().unwrap().to_rfc3339(), "2006-03-04T12:00:00+00:00");

        md.datetime = None;
        let img = image(md.clone(), "PAR_2010_01_02").unwrap();
        assert_eq!(img.date().unwrap().format("%Y-%m-%d").to_string(), "2010-01-02");

        assert!(matches!(image(md, "PAR").err(), Some(ZonalError::MissingTimestamp(_))));
    }

    #[test]
    fn properties_and_system_fields() {
        let img = image(metadata(), "PAR_2010_01_01").unwrap();
        assert_eq!(img.property("version"), Some(&Value::Integer(61)));
        assert_eq!(img.property(SYSTEM_INDEX), Some(&Value::from("PAR_2010_01_01")));
        assert_eq!(img.non_system_property_names(), vec!["platform", "version"]);
    }

    #[test]
    fn grid_lookups() {
        let img = image(metadata(), "PAR_2010_01_01").unwrap();
        let grid = img.grid();
        assert_eq!(grid.pixel_center(0, 0), Point::new(10.25, 51.75));
        assert_eq!(grid.pixel_at(&Point::new(11.9, 51.1)), Some((3, 1)));
        assert_eq!(grid.pixel_at(&Point::new(12.1, 51.1)), None);
        assert_eq!(img.footprint(), Some(BoundingBox::new(10.0, 51.0, 12.0, 52.0)));
        assert_abs_diff_eq!(grid.nominal_scale(), 0.5 * METERS_PER_DEGREE, epsilon = 1e-9);
    }

    #[test]
    fn day_of_year_names() {
        let doy = Regex::new(r"A(?P<year>\d{4})(?P<doy>\d{3})").unwrap();
        assert_eq!(date_from_name("MCD18C2.A2006032.061", &doy), NaiveDate::from_ymd_opt(2006, 2, 1));
    }
}
