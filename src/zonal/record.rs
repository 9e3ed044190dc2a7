//! Result records and the null filter

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::collection::{Attributes, Value};
use crate::errors::ZonalError;
use crate::features::Geometry;

/// Name of the raw acquisition time field of every record
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// One (image, region) row
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Region geometry, None once stripped for export
    pub geometry: Option<Geometry>,
    pub attributes: Attributes,
}

impl ResultRecord {
    pub fn new(geometry: Geometry, attributes: Attributes) -> Self {
        ResultRecord { geometry: Some(geometry), attributes }
    }

    /// The record without its geometry
    pub fn strip_geometry(self) -> Self {
        ResultRecord { geometry: None, attributes: self.attributes }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Which records survive the band null check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Drop records whose band fields are all null
    #[default]
    All,
    /// Drop records with any null band field
    Any,
}

impl NullPolicy {
    /// Whether a record passes the filter for the given band fields
    pub fn keeps(&self, record: &ResultRecord, band_fields: &[String]) -> bool {
        let is_null = |name: &String| record.get(name).map_or(true, Value::is_null);
        match self {
            NullPolicy::All => !band_fields.iter().all(is_null),
            NullPolicy::Any => !band_fields.iter().any(is_null),
        }
    }
}

impl fmt::Display for NullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullPolicy::All => write!(f, "all"),
            NullPolicy::Any => write!(f, "any"),
        }
    }
}

impl FromStr for NullPolicy {
    type Err = ZonalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(NullPolicy::All),
            "any" => Ok(NullPolicy::Any),
            other => Err(ZonalError::ConfigError(format!("Unknown null policy '{}' (expected all or any)", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Point;

    fn record(a: Value, b: Value) -> ResultRecord {
        let mut attributes = Attributes::new();
        attributes.set("plot_id", "SCH");
        attributes.set("PAR_00", a);
        attributes.set("PAR_03", b);
        ResultRecord::new(Geometry::Point(Point::new(13.75, 52.96)), attributes)
    }

    #[test]
    fn null_policies() {
        let bands = vec!["PAR_00".to_string(), "PAR_03".to_string()];
        let partial = record(Value::Float(1.0), Value::Null);
        let empty = record(Value::Null, Value::Null);

        assert!(NullPolicy::All.keeps(&partial, &bands));
        assert!(!NullPolicy::All.keeps(&empty, &bands));
        assert!(!NullPolicy::Any.keeps(&partial, &bands));
        assert!(NullPolicy::Any.keeps(&record(Value::Float(1.0), Value::Integer(2)), &bands));
    }

    #[test]
    fn stripping_keeps_attributes() {
        let rec = record(Value::Float(1.0), Value::Null);
        let stripped = rec.clone().strip_geometry();
        assert!(stripped.geometry.is_none());
        assert_eq!(stripped.attributes, rec.attributes);
    }
}
