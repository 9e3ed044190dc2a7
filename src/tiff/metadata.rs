//! GDAL metadata parsing
//!
//! GDAL stores dataset and per-band metadata as a small XML document in
//! tag 42112 and the nodata marker as ASCII text in tag 42113:
//!
//! ```xml
//! <GDALMetadata>
//!   <Item name="system:time_start">1136073600000</Item>
//!   <Item name="DESCRIPTION" sample="0" role="description">GMT_0000_PAR</Item>
//! </GDALMetadata>
//! ```

use std::collections::BTreeMap;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{ZonalError, ZonalResult};

/// Parsed content of a GDAL_METADATA tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GdalMetadata {
    /// Dataset level items in document order
    pub dataset_items: Vec<(String, String)>,
    /// Per-sample items keyed by sample index
    pub band_items: BTreeMap<usize, Vec<(String, String)>>,
}

/// Attributes of the `<Item>` currently being read
struct OpenItem {
    name: String,
    sample: Option<usize>,
    role: Option<String>,
    text: String,
}

impl GdalMetadata {
    /// Parses the XML document of a GDAL_METADATA tag
    pub fn parse(xml: &str) -> ZonalResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut metadata = GdalMetadata::default();
        let mut current: Option<OpenItem> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"Item" => {
                    current = Some(Self::open_item(e)?);
                },
                Ok(Event::Empty(ref e)) if e.name().as_ref() == b"Item" => {
                    let item = Self::open_item(e)?;
                    metadata.push(item);
                },
                Ok(Event::Text(ref e)) => {
                    if let Some(item) = current.as_mut() {
                        let text = e.unescape()
                            .map_err(|err| ZonalError::GenericError(format!("Invalid GDAL metadata text: {}", err)))?;
                        item.text.push_str(&text);
                    }
                },
                Ok(Event::End(ref e)) if e.name().as_ref() == b"Item" => {
                    if let Some(item) = current.take() {
                        metadata.push(item);
                    }
                },
                Ok(Event::Eof) => break,
                Ok(_) => {},
                Err(e) => {
                    return Err(ZonalError::GenericError(format!(
                        "Invalid GDAL metadata at position {}: {}",
                        reader.buffer_position(), e
                    )));
                }
            }
        }

        debug!("GDAL metadata: {} dataset items, {} bands with items",
               metadata.dataset_items.len(), metadata.band_items.len());
        Ok(metadata)
    }

    fn open_item(e: &BytesStart) -> ZonalResult<OpenItem> {
        let mut item = OpenItem { name: String::new(), sample: None, role: None, text: String::new() };

        for attr in e.attributes() {
            let attr = attr.map_err(|err| ZonalError::GenericError(format!("Invalid GDAL metadata attribute: {}", err)))?;
            let value = attr.unescape_value()
                .map_err(|err| ZonalError::GenericError(format!("Invalid GDAL metadata attribute: {}", err)))?;
            match attr.key.as_ref() {
                b"name" => item.name = value.into_owned(),
                b"sample" => match value.trim().parse::<usize>() {
                    Ok(sample) => item.sample = Some(sample),
                    Err(_) => warn!("Ignoring non-numeric sample attribute '{}'", value),
                },
                b"role" => item.role = Some(value.into_owned()),
                _ => {}
            }
        }

        Ok(item)
    }

    fn push(&mut self, item: OpenItem) {
        // GDAL writes band descriptions with an empty name and role="description"
        let name = if item.name.is_empty() {
            match item.role.as_deref() {
                Some("description") => "DESCRIPTION".to_string(),
                Some(role) => role.to_string(),
                None => return,
            }
        } else {
            item.name
        };

        match item.sample {
            Some(sample) => self.band_items.entry(sample).or_default().push((name, item.text)),
            None => self.dataset_items.push((name, item.text)),
        }
    }

    /// Value of a dataset level item
    pub fn dataset_item(&self, name: &str) -> Option<&str> {
        self.dataset_items.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Description of a band, if GDAL recorded one
    pub fn band_description(&self, sample: usize) -> Option<&str> {
        self.band_items.get(&sample)?
            .iter()
            .find(|(key, value)| key == "DESCRIPTION" && !value.is_empty())
            .map(|(_, value)| value.as_str())
    }
}

/// Parses the GDAL_NODATA text, None when it is not a number
pub fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" | "-nan" => Some(f64::NAN),
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<GDALMetadata>
  <Item name="system:time_start">1136073600000</Item>
  <Item name="PRODUCT">MCD18C2 &amp; friends</Item>
  <Item name="DESCRIPTION" sample="0" role="description">GMT_0000_PAR</Item>
  <Item name="" sample="1" role="description">GMT_0300_PAR</Item>
  <Item name="scale" sample="1" role="scale">0.1</Item>
</GDALMetadata>"#;

    #[test]
    fn parses_dataset_and_band_items() {
        let metadata = GdalMetadata::parse(SAMPLE).unwrap();
        assert_eq!(metadata.dataset_item("system:time_start"), Some("1136073600000"));
        assert_eq!(metadata.dataset_item("PRODUCT"), Some("MCD18C2 & friends"));
        assert_eq!(metadata.band_description(0), Some("GMT_0000_PAR"));
        assert_eq!(metadata.band_description(1), Some("GMT_0300_PAR"));
        assert_eq!(metadata.band_description(2), None);
        assert_eq!(metadata.dataset_items.len(), 2);
    }

    #[test]
    fn nodata_text_variants() {
        assert_eq!(parse_nodata("-9999\0"), Some(-9999.0));
        assert!(parse_nodata("nan").unwrap().is_nan());
        assert_eq!(parse_nodata("none"), None);
    }
}
