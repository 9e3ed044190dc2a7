//! Reducers: statistics over the pixel values of a region

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::collection::Value;
use crate::errors::ZonalError;

/// Statistic computed per band and region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Reducer {
    #[default]
    Mean,
    Median,
    Min,
    Max,
    Sum,
    Count,
    StdDev,
    Variance,
}

impl Reducer {
    pub const ALL: [Reducer; 8] = [
        Reducer::Mean,
        Reducer::Median,
        Reducer::Min,
        Reducer::Max,
        Reducer::Sum,
        Reducer::Count,
        Reducer::StdDev,
        Reducer::Variance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Reducer::Mean => "mean",
            Reducer::Median => "median",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Sum => "sum",
            Reducer::Count => "count",
            Reducer::StdDev => "stdDev",
            Reducer::Variance => "variance",
        }
    }

    /// Reduces unmasked values; Null for an empty input, except `count`
    ///
    /// The slice is reordered by `median`.
    pub fn reduce(&self, values: &mut [f64]) -> Value {
        let n = values.len();
        if n == 0 {
            return match self {
                Reducer::Count => Value::Integer(0),
                _ => Value::Null,
            };
        }

        let result = match self {
            Reducer::Count => return Value::Integer(n as i64),
            Reducer::Mean => mean(values),
            Reducer::Median => {
                values.sort_by(f64::total_cmp);
                if n % 2 == 1 {
                    values[n / 2]
                } else {
                    (values[n / 2 - 1] + values[n / 2]) / 2.0
                }
            },
            Reducer::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reducer::Sum => values.iter().sum(),
            Reducer::Variance => variance(values),
            Reducer::StdDev => variance(values).sqrt(),
        };
        Value::from_f64(result)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Reducer {
    type Err = ZonalError;

    /// Case-insensitive, `_` ignored, so `stdDev`, `std_dev` and `STDDEV` match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.trim().chars().filter(|&c| c != '_').collect::<String>().to_lowercase();
        Reducer::ALL
            .into_iter()
            .find(|r| r.name().to_lowercase() == key)
            .ok_or_else(|| ZonalError::ConfigError(format!(
                "Unknown reducer '{}' (expected one of: {})",
                s,
                Reducer::ALL.iter().map(Reducer::name).collect::<Vec<_>>().join(", ")
            )))
    }
}

impl TryFrom<String> for Reducer {
    type Error = ZonalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Reducer> for String {
    fn from(r: Reducer) -> Self {
        r.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn float(v: Value) -> f64 {
        match v {
            Value::Float(f) => f,
            other => panic!("expected a float, got {:?}", other),
        }
    }

    #[test]
    fn statistics() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(float(Reducer::Mean.reduce(&mut values.clone())), 2.5);
        assert_eq!(float(Reducer::Median.reduce(&mut values.clone())), 2.5);
        assert_eq!(float(Reducer::Median.reduce(&mut [5.0, 1.0, 3.0])), 3.0);
        assert_eq!(float(Reducer::Min.reduce(&mut values.clone())), 1.0);
        assert_eq!(float(Reducer::Max.reduce(&mut values.clone())), 4.0);
        assert_eq!(float(Reducer::Sum.reduce(&mut values.clone())), 10.0);
        assert_eq!(Reducer::Count.reduce(&mut values.clone()), Value::Integer(4));
        assert_relative_eq!(float(Reducer::Variance.reduce(&mut values.clone())), 1.25);
        assert_relative_eq!(float(Reducer::StdDev.reduce(&mut values.clone())), 1.25f64.sqrt());
    }

    #[test]
    fn empty_input_is_null_except_count() {
        for reducer in Reducer::ALL {
            let expected = if reducer == Reducer::Count { Value::Integer(0) } else { Value::Null };
            assert_eq!(reducer.reduce(&mut []), expected, "{}", reducer);
        }
    }

    #[test]
    fn parses_names_loosely() {
        assert_eq!("median".parse::<Reducer>().unwrap(), Reducer::Median);
        assert_eq!("std_dev".parse::<Reducer>().unwrap(), Reducer::StdDev);
        assert_eq!("StdDev".parse::<Reducer>().unwrap(), Reducer::StdDev);
        assert!("mode".parse::<Reducer>().is_err());
    }
}
