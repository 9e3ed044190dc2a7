//! Ordered image collections loaded from a directory

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use regex::Regex;

use crate::errors::{ZonalError, ZonalResult};
use crate::raster::RasterSourceFactory;

use super::image::{Image, DEFAULT_DATE_PATTERN};

/// Images ordered by acquisition time, then id
pub struct ImageCollection {
    id: String,
    images: Vec<Image>,
}

impl ImageCollection {
    /// Wraps a set of images, putting them in collection order
    pub fn new(id: &str, mut images: Vec<Image>) -> Self {
        images.sort_by(|a, b| {
            a.time_start()
                .cmp(&b.time_start())
                .then_with(|| a.id().cmp(b.id()))
        });
        ImageCollection { id: id.to_string(), images }
    }

    /// Loads every `.tif`/`.tiff` file of a directory
    ///
    /// `date_pattern` is a regex with named groups `year`, `month`, `day`
    /// (or `doy`) used for files that carry no acquisition time.
    pub fn load(dir: &Path, date_pattern: Option<&str>) -> ZonalResult<Self> {
        let pattern = Regex::new(date_pattern.unwrap_or(DEFAULT_DATE_PATTERN))
            .map_err(|e| ZonalError::ConfigError(format!("Invalid date pattern: {}", e)))?;

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && RasterSourceFactory::is_supported(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        debug!("Found {} raster files in {}", paths.len(), dir.display());

        let images = paths.iter()
            .map(|p| Image::open(p, &pattern))
            .collect::<ZonalResult<Vec<_>>>()?;

        let id = dir.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("collection");
        let collection = ImageCollection::new(id, images);
        info!("Loaded collection '{}' with {} images", collection.id, collection.len());
        Ok(collection)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Keeps images acquired within the closed interval [start, end]
    pub fn filter_date(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let (start_ms, end_ms) = (start.timestamp_millis(), end.timestamp_millis());
        let before = self.images.len();
        let images: Vec<Image> = self.images
            .into_iter()
            .filter(|img| img.time_start() >= start_ms && img.time_start() <= end_ms)
            .collect();
        debug!("Date filter {} .. {} kept {} of {} images", start, end, images.len(), before);
        ImageCollection { id: self.id, images }
    }

    /// Keeps images from `start_year`-01-01 to `end_year`-12-31, both at midnight UTC
    pub fn filter_years(self, start_year: i32, end_year: i32) -> ZonalResult<Self> {
        let start = year_day(start_year, 1, 1)?;
        let end = year_day(end_year, 12, 31)?;
        Ok(self.filter_date(start, end))
    }

    /// Representative image
    pub fn first(&self) -> Option<&Image> {
        self.images.first()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut [Image] {
        &mut self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn year_day(year: i32, month: u32, day: u32) -> ZonalResult<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ZonalError::ConfigError(format!("Invalid year: {}", year)))
}
