//! Aggregation parameters
//!
//! Every option is optional. An omitted option and an option holding a
//! falsy value (0, NaN, empty string, empty list) both take the default,
//! so `scale = 0` or `bands = []` behave like leaving them out.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;

use crate::collection::Image;
use crate::coordinate::{CoordinateSystem, CoordinateSystemFactory};
use crate::errors::{ZonalError, ZonalResult};
use crate::utils::date_format::{format_datetime, joda_to_chrono};

use super::record::{NullPolicy, TIMESTAMP_FIELD};
use super::reducer::Reducer;

/// Default name of the formatted date field
pub const DEFAULT_DATETIME_NAME: &str = "datetime";
/// Default Joda pattern of the formatted date field
pub const DEFAULT_DATETIME_FORMAT: &str = "YYYY-MM-dd HH:mm:ss";

/// Values treated as "not provided"
trait Falsy {
    fn is_falsy(&self) -> bool;
}

impl Falsy for f64 {
    fn is_falsy(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Falsy for String {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl Falsy for Vec<String> {
    fn is_falsy(&self) -> bool {
        self.is_empty()
    }
}

impl Falsy for Reducer {
    fn is_falsy(&self) -> bool {
        false
    }
}

impl Falsy for NullPolicy {
    fn is_falsy(&self) -> bool {
        false
    }
}

fn truthy<T: Falsy>(value: Option<T>) -> Option<T> {
    value.filter(|v| !v.is_falsy())
}

/// Options of a zonal statistics run as provided by the caller
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationParams {
    pub reducer: Option<Reducer>,
    /// Sampling cell size in metres
    pub scale: Option<f64>,
    /// Sampling CRS, e.g. "EPSG:5243"
    pub crs: Option<String>,
    pub bands: Option<Vec<String>>,
    #[serde(alias = "bandsRename")]
    pub bands_rename: Option<Vec<String>>,
    #[serde(alias = "imgProps")]
    pub img_props: Option<Vec<String>>,
    #[serde(alias = "imgPropsRename")]
    pub img_props_rename: Option<Vec<String>>,
    #[serde(alias = "datetimeName")]
    pub datetime_name: Option<String>,
    /// Joda-style pattern
    #[serde(alias = "datetimeFormat")]
    pub datetime_format: Option<String>,
    #[serde(alias = "nullPolicy")]
    pub null_policy: Option<NullPolicy>,
}

impl AggregationParams {
    /// Copy with every falsy option cleared
    pub fn normalized(&self) -> AggregationParams {
        AggregationParams {
            reducer: truthy(self.reducer),
            scale: truthy(self.scale),
            crs: truthy(self.crs.clone()),
            bands: truthy(self.bands.clone()),
            bands_rename: truthy(self.bands_rename.clone()),
            img_props: truthy(self.img_props.clone()),
            img_props_rename: truthy(self.img_props_rename.clone()),
            datetime_name: truthy(self.datetime_name.clone()),
            datetime_format: truthy(self.datetime_format.clone()),
            null_policy: truthy(self.null_policy),
        }
    }

    /// Options of `overrides` that are set and truthy replace ours
    pub fn overridden_by(&self, overrides: &AggregationParams) -> AggregationParams {
        let base = self.normalized();
        let top = overrides.normalized();
        AggregationParams {
            reducer: top.reducer.or(base.reducer),
            scale: top.scale.or(base.scale),
            crs: top.crs.or(base.crs),
            bands: top.bands.or(base.bands),
            bands_rename: top.bands_rename.or(base.bands_rename),
            img_props: top.img_props.or(base.img_props),
            img_props_rename: top.img_props_rename.or(base.img_props_rename),
            datetime_name: top.datetime_name.or(base.datetime_name),
            datetime_format: top.datetime_format.or(base.datetime_format),
            null_policy: top.null_policy.or(base.null_policy),
        }
    }

    /// Checks the explicitly provided options without looking at any image
    ///
    /// Rename lists are compared with their source lists when both are
    /// given; the CRS and datetime format must parse.
    pub fn validate(&self) -> ZonalResult<()> {
        let p = self.normalized();
        if let (Some(bands), Some(renamed)) = (&p.bands, &p.bands_rename) {
            check_lengths("bands", bands, renamed)?;
        }
        if let (Some(props), Some(renamed)) = (&p.img_props, &p.img_props_rename) {
            check_lengths("imgProps", props, renamed)?;
        }
        if let Some(crs) = &p.crs {
            CoordinateSystemFactory::from_string(crs)?;
        }
        joda_to_chrono(p.datetime_format.as_deref().unwrap_or(DEFAULT_DATETIME_FORMAT))?;
        Ok(())
    }

    /// Fills unset options from the representative image
    ///
    /// # Arguments
    /// * `representative` - First image of the collection
    ///
    /// # Returns
    /// Parameters with every default applied, or an error when a
    /// rename list does not match its source list
    pub fn resolve(&self, representative: &Image) -> ZonalResult<ResolvedParams> {
        self.validate()?;
        let p = self.normalized();

        let bands = p.bands.unwrap_or_else(|| representative.band_names().to_vec());
        let bands_rename = p.bands_rename.unwrap_or_else(|| bands.clone());
        let img_props = p.img_props.unwrap_or_else(|| representative.non_system_property_names());
        let img_props_rename = p.img_props_rename.unwrap_or_else(|| img_props.clone());
        check_lengths("bands", &bands, &bands_rename)?;
        check_lengths("imgProps", &img_props, &img_props_rename)?;

        let crs = p.crs.as_deref().map(CoordinateSystemFactory::from_string).transpose()?;
        let datetime_format = p.datetime_format.unwrap_or_else(|| DEFAULT_DATETIME_FORMAT.to_string());
        let chrono_format = joda_to_chrono(&datetime_format)?;

        let resolved = ResolvedParams {
            reducer: p.reducer.unwrap_or_default(),
            scale: p.scale,
            crs,
            bands,
            bands_rename,
            img_props,
            img_props_rename,
            datetime_name: p.datetime_name.unwrap_or_else(|| DEFAULT_DATETIME_NAME.to_string()),
            datetime_format,
            chrono_format,
            null_policy: p.null_policy.unwrap_or_default(),
        };
        debug!("Resolved parameters from '{}': {:?}", representative.id(), resolved);
        Ok(resolved)
    }
}

fn check_lengths(what: &'static str, sources: &[String], targets: &[String]) -> ZonalResult<()> {
    if sources.len() != targets.len() {
        return Err(ZonalError::RenameLengthMismatch {
            what,
            sources: sources.len(),
            targets: targets.len(),
        });
    }
    Ok(())
}

/// Parameters with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    pub reducer: Reducer,
    pub scale: Option<f64>,
    pub crs: Option<CoordinateSystem>,
    pub bands: Vec<String>,
    pub bands_rename: Vec<String>,
    pub img_props: Vec<String>,
    pub img_props_rename: Vec<String>,
    pub datetime_name: String,
    pub datetime_format: String,
    chrono_format: String,
    pub null_policy: NullPolicy,
}

impl ResolvedParams {
    /// Whether pixels are sampled on each image's own grid
    pub fn uses_native_grid(&self) -> bool {
        self.scale.is_none() && self.crs.is_none()
    }

    /// Formats an acquisition time with the configured pattern
    pub fn format_date(&self, date: &DateTime<Utc>) -> ZonalResult<String> {
        format_datetime(date, &self.chrono_format)
    }

    /// Columns every record gets besides the region attributes
    pub fn output_columns(&self) -> Vec<String> {
        let mut columns = self.bands_rename.clone();
        columns.extend(self.img_props_rename.iter().cloned());
        columns.push(self.datetime_name.clone());
        columns.push(TIMESTAMP_FIELD.to_string());
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{MemoryRaster, RasterMetadata};
    use crate::tiff::GeoTransform;
    use regex::Regex;

    fn representative() -> Image {
        let metadata = RasterMetadata {
            width: 1,
            height: 1,
            band_names: vec!["GMT_0000_PAR".to_string(), "GMT_0300_PAR".to_string()],
            transform: Some(GeoTransform::north_up(0.0, 1.0, 1.0, 1.0)),
            items: vec![("platform".to_string(), "Terra".to_string())],
            ..RasterMetadata::default()
        };
        let raster = MemoryRaster::new(metadata, vec![vec![0.0], vec![0.0]]).unwrap();
        let pattern = Regex::new(crate::collection::DEFAULT_DATE_PATTERN).unwrap();
        Image::from_source("MCD18C2_2006_01_01", Box::new(raster), &pattern).unwrap()
    }

    fn names(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn defaults_come_from_the_representative() {
        let resolved = AggregationParams::default().resolve(&representative()).unwrap();
        assert_eq!(resolved.reducer, Reducer::Mean);
        assert_eq!(resolved.bands, vec!["GMT_0000_PAR", "GMT_0300_PAR"]);
        assert_eq!(resolved.bands_rename, resolved.bands);
        assert_eq!(resolved.img_props, vec!["platform"]);
        assert_eq!(resolved.datetime_name, "datetime");
        assert_eq!(resolved.datetime_format, "YYYY-MM-dd HH:mm:ss");
        assert_eq!(resolved.null_policy, NullPolicy::All);
        assert!(resolved.uses_native_grid());
        assert_eq!(
            resolved.output_columns(),
            vec!["GMT_0000_PAR", "GMT_0300_PAR", "platform", "datetime", "timestamp"]
        );
    }

    #[test]
    fn falsy_values_fall_back() {
        let params = AggregationParams {
            scale: Some(0.0),
            crs: Some(String::new()),
            bands: Some(Vec::new()),
            datetime_name: Some(String::new()),
            datetime_format: Some(String::new()),
            ..AggregationParams::default()
        };
        let resolved = params.resolve(&representative()).unwrap();
        assert_eq!(resolved.scale, None);
        assert_eq!(resolved.crs, None);
        assert_eq!(resolved.bands.len(), 2);
        assert_eq!(resolved.datetime_name, DEFAULT_DATETIME_NAME);
        assert_eq!(resolved.datetime_format, DEFAULT_DATETIME_FORMAT);

        assert_eq!(AggregationParams { scale: Some(f64::NAN), ..params }.normalized().scale, None);
    }

    #[test]
    fn explicit_rename_mismatch_fails_before_resolution() {
        let params = AggregationParams {
            bands: names(&["GMT_0000_PAR", "GMT_0300_PAR"]),
            bands_rename: names(&["PAR_00"]),
            ..AggregationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ZonalError::RenameLengthMismatch { what: "bands", sources: 2, targets: 1 })
        ));
    }

    #[test]
    fn rename_checked_again_after_defaults() {
        let params = AggregationParams {
            bands_rename: names(&["PAR_00"]),
            ..AggregationParams::default()
        };
        assert!(params.validate().is_ok());
        assert!(matches!(
            params.resolve(&representative()),
            Err(ZonalError::RenameLengthMismatch { what: "bands", sources: 2, targets: 1 })
        ));

        let props = AggregationParams {
            img_props_rename: names(&["sat", "extra"]),
            ..AggregationParams::default()
        };
        assert!(matches!(
            props.resolve(&representative()),
            Err(ZonalError::RenameLengthMismatch { what: "imgProps", .. })
        ));
    }

    #[test]
    fn overrides_skip_falsy_values() {
        let config = AggregationParams {
            reducer: Some(Reducer::Median),
            scale: Some(1000.0),
            crs: Some("EPSG:5243".to_string()),
            ..AggregationParams::default()
        };
        let cli = AggregationParams {
            scale: Some(0.0),
            crs: Some("EPSG:32632".to_string()),
            ..AggregationParams::default()
        };
        let merged = config.overridden_by(&cli);
        assert_eq!(merged.reducer, Some(Reducer::Median));
        assert_eq!(merged.scale, Some(1000.0));
        assert_eq!(merged.crs.as_deref(), Some("EPSG:32632"));
    }

    #[test]
    fn bad_crs_and_format_are_rejected() {
        let crs = AggregationParams { crs: Some("EPSG:9999".to_string()), ..AggregationParams::default() };
        assert!(matches!(crs.validate(), Err(ZonalError::UnsupportedCrs(_))));
        let fmt = AggregationParams { datetime_format: Some("YYYY-QQ".to_string()), ..AggregationParams::default() };
        assert!(matches!(fmt.validate(), Err(ZonalError::ConfigError(_))));
    }

    #[test]
    fn camel_case_aliases_deserialize() {
        let params: AggregationParams = toml::from_str(
            "reducer = \"median\"\nbandsRename = [\"PAR_00\"]\nbands = [\"GMT_0000_PAR\"]\ndatetime_name = \"date\"\nnull_policy = \"any\"",
        ).unwrap();
        assert_eq!(params.reducer, Some(Reducer::Median));
        assert_eq!(params.bands_rename, names(&["PAR_00"]));
        assert_eq!(params.datetime_name.as_deref(), Some("date"));
        assert_eq!(params.null_policy, Some(NullPolicy::Any));
    }
}
