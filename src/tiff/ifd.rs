//! Image File Directory (IFD) structures and methods
//!
//! IFDs hold the tag entries describing one image in a TIFF file. Entries
//! keep their raw value field so small arrays stored inline can be decoded
//! later with the file's byte order.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::tiff::constants::{field_types, tags};

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag positions for quick lookup
    tag_map: HashMap<u16, usize>,
}

/// Represents an entry in an Image File Directory (IFD)
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// First value when stored inline, otherwise the offset to the values
    pub value_offset: u64,
    /// Raw bytes of the value field (4 bytes in TIFF, 8 in BigTIFF)
    pub inline: [u8; 8],
}

impl IFDEntry {
    /// Creates an entry whose inline bytes are the little-endian encoding of `value_offset`
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        Self::with_inline(tag, field_type, count, value_offset, value_offset.to_le_bytes())
    }

    /// Creates an entry with the raw value field as read from the file
    pub fn with_inline(tag: u16, field_type: u16, count: u64, value_offset: u64, inline: [u8; 8]) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            inline,
        }
    }

    /// Size in bytes of a single value of this entry's type
    pub fn field_type_size(&self) -> u64 {
        field_type_size(self.field_type)
    }

    /// Total size in bytes of the entry's values
    /// None when the declared count overflows
    pub fn byte_len(&self) -> Option<u64> {
        self.field_type_size().checked_mul(self.count)
    }

    /// Whether the values fit in the entry's value field
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.byte_len().is_some_and(|len| len <= inline_size)
    }
}

/// Size in bytes of one value of a TIFF field type
pub fn field_type_size(field_type: u16) -> u64 {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

impl IFD {
    /// Creates a new IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry and updates the lookup cache
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding tag {} to IFD #{}", entry.tag, self.number);
        self.tag_map.insert(entry.tag, self.entries.len());
        self.entries.push(entry);
    }

    /// Gets the value/offset field of a tag
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.get_entry(tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag).and_then(|&idx| self.entries.get(idx))
    }

    /// Width and height of the image described by this IFD
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of samples per pixel (default 1 if not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether the image data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_WIDTH) && self.has_tag(tags::TILE_LENGTH)
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }
        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;
        writeln!(f, "  Entries: {}", self.entries.len())
    }
}
