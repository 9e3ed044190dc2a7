//! Run configuration
//!
//! A run is described by a TOML file with `[collection]`, `[points]`,
//! `[buffer]`, `[params]` and `[export]` sections. Every section and key
//! may be left out; command-line options are applied on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::Deserialize;

use crate::errors::{ZonalError, ZonalResult};
use crate::features::PointRecord;
use crate::zonal::AggregationParams;

/// Image collection to read
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    /// Directory holding the GeoTIFF files
    pub path: Option<PathBuf>,
    pub start_year: i32,
    pub end_year: i32,
    /// Regex with `year`, `month`, `day` (or `doy`) groups matched on file names
    pub date_pattern: Option<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        CollectionConfig {
            path: None,
            start_year: 2006,
            end_year: 2022,
            date_pattern: None,
        }
    }
}

/// One named location
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
}

impl FromStr for Location {
    type Err = ZonalError;

    /// Parses `ID=LON,LAT`, e.g. `SCH=13.75,52.96`
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || ZonalError::ConfigError(format!("Point '{}' must be given as ID=LON,LAT", text));
        let (id, coords) = text.split_once('=').ok_or_else(malformed)?;
        let (lon, lat) = coords.split_once(',').ok_or_else(malformed)?;

        let lon = lon.trim().parse::<f64>()
            .map_err(|_| ZonalError::ConfigError(format!("Invalid longitude in point '{}'", text)))?;
        let lat = lat.trim().parse::<f64>()
            .map_err(|_| ZonalError::ConfigError(format!("Invalid latitude in point '{}'", text)))?;

        Ok(Location { id: id.trim().to_string(), lon, lat })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointsConfig {
    /// Attribute receiving each location's id
    pub id_field: String,
    pub locations: Vec<Location>,
}

impl Default for PointsConfig {
    fn default() -> Self {
        PointsConfig {
            id_field: "plot_id".to_string(),
            locations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferConfig {
    /// Radius in metres
    pub radius: f64,
    /// Use the bounding box of each disc
    pub bounds: bool,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig { radius: 10_000.0, bounds: false }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Storage root directory
    pub root: PathBuf,
    pub folder: String,
    /// Table name prefix; the year range is appended
    pub prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            root: PathBuf::from("."),
            folder: "GEE".to_string(),
            prefix: "PAR".to_string(),
        }
    }
}

/// Complete description of an extraction run
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub collection: CollectionConfig,
    pub points: PointsConfig,
    pub buffer: BufferConfig,
    pub params: AggregationParams,
    pub export: ExportConfig,
}

impl RunConfig {
    /// Reads a TOML configuration file
    pub fn from_file(path: &Path) -> ZonalResult<Self> {
        debug!("Reading configuration {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| {
            ZonalError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> ZonalResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Collection directory, required for every run
    pub fn collection_path(&self) -> ZonalResult<&Path> {
        self.collection.path.as_deref().ok_or_else(|| {
            ZonalError::ConfigError("No image collection given ([collection] path or --collection)".to_string())
        })
    }

    /// Checks what an extraction needs before any file is read
    pub fn validate(&self) -> ZonalResult<()> {
        self.collection_path()?;
        if self.collection.start_year > self.collection.end_year {
            return Err(ZonalError::ConfigError(format!(
                "start_year {} is after end_year {}",
                self.collection.start_year, self.collection.end_year
            )));
        }
        if self.points.locations.is_empty() {
            return Err(ZonalError::ConfigError("No points given ([points] locations or --point)".to_string()));
        }
        if self.points.id_field.is_empty() {
            return Err(ZonalError::ConfigError("id_field must not be empty".to_string()));
        }
        self.params.validate()
    }

    /// Point records of the configured locations
    pub fn point_records(&self) -> Vec<PointRecord> {
        self.points.locations.iter()
            .map(|l| PointRecord::with_id(&self.points.id_field, &l.id, l.lon, l.lat))
            .collect()
    }

    /// Table name: `<prefix>_<start_year>_<end_year>`
    pub fn export_description(&self) -> String {
        format!("{}_{}_{}", self.export.prefix, self.collection.start_year, self.collection.end_year)
    }
}
