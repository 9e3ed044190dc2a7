//! TIFF file reader implementation
//!
//! Reads the header and IFD chain of TIFF and BigTIFF files, using the
//! byte order strategy detected from the header for every value read.

use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::errors::{ZonalError, ZonalResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;

/// Upper bound on the IFD chain length, guards against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Current file path
    current_file: Option<PathBuf>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            current_file: None,
            is_big_tiff: false,
        }
    }

    /// Opens the file most recently passed to [`TiffReader::load`]
    pub fn create_reader(&self) -> ZonalResult<BufReader<File>> {
        match &self.current_file {
            Some(path) => Ok(BufReader::new(File::open(path)?)),
            None => Err(ZonalError::GenericError("No file path specified".to_string())),
        }
    }

    fn handler(&self) -> ZonalResult<&dyn ByteOrderHandler> {
        self.byte_order_handler
            .as_deref()
            .ok_or_else(|| ZonalError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Loads a TIFF file from the given path
    pub fn load(&mut self, path: &Path) -> ZonalResult<TIFF> {
        debug!("Loading TIFF file: {}", path.display());
        self.current_file = Some(path.to_path_buf());

        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads the header and every IFD from the given reader
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> ZonalResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        self.byte_order_handler = Some(byte_order.create_handler());

        self.is_big_tiff = self.detect_format(reader)?;

        let first_ifd_offset = self.read_offset(reader)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff, byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        debug!("Read {} IFDs", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads the version number, returning whether the file is a BigTIFF
    fn detect_format(&self, reader: &mut dyn SeekableReader) -> ZonalResult<bool> {
        let handler = self.handler()?;
        let version = handler.read_u16(reader)?;
        debug!("TIFF version: {}", version);

        match version {
            header::BIG_TIFF_VERSION => {
                validation::validate_bigtiff_header(reader, handler)?;
                Ok(true)
            },
            header::TIFF_VERSION => Ok(false),
            _ => Err(ZonalError::UnsupportedVersion(version)),
        }
    }

    /// Reads a 4 or 8 byte offset depending on the format
    fn read_offset(&self, reader: &mut dyn SeekableReader) -> ZonalResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u32(reader)? as u64)
        }
    }

    fn ifd_size(&self, entry_count: usize) -> u64 {
        if self.is_big_tiff {
            8 + 20 * entry_count as u64
        } else {
            2 + 12 * entry_count as u64
        }
    }

    /// Reads a chain of IFDs starting from the given offset
    fn read_ifd_chain(
        &self,
        reader: &mut dyn SeekableReader,
        first_ifd_offset: u64,
        file_size: u64,
    ) -> ZonalResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain", ifd_offset, file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) => {
                    // The first IFD is the image itself, later ones are optional
                    if ifds.is_empty() {
                        return Err(e);
                    }
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            reader.seek(SeekFrom::Start(ifd_offset + self.ifd_size(ifd.entries.len())))?;
            let next = match self.read_offset(reader) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };
            debug!("Next IFD offset: {}", next);

            ifds.push(ifd);
            if next != 0 && (next >= file_size || next < 8) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next);
                break;
            }
            ifd_offset = next;
        }

        Ok(ifds)
    }

    /// Reads one IFD located at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> ZonalResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;
        let handler = self.handler()?;

        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} entry count: {}", number, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            debug!("Read IFD entry: tag={}, type={}, count={}, value={}",
                   entry.tag, entry.field_type, entry.count, entry.value_offset);
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry, keeping the raw value field
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> ZonalResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_len = if self.is_big_tiff { 8 } else { 4 };
        let mut inline = [0u8; 8];
        reader.read_exact(&mut inline[..field_len])?;

        let raw = if self.is_big_tiff {
            handler.decode_u64(&inline)
        } else {
            handler.decode_u32(&inline) as u64
        };

        let mut entry = IFDEntry::with_inline(tag, field_type, count, raw, inline);
        // Scalars stored inline are decoded at their own width
        if count == 1 && entry.is_value_inline(self.is_big_tiff) {
            entry.value_offset = match field_type {
                field_types::BYTE | field_types::UNDEFINED => inline[0] as u64,
                field_types::SHORT => handler.decode_u16(&inline) as u64,
                field_types::LONG => handler.decode_u32(&inline) as u64,
                _ => raw,
            };
        }
        Ok(entry)
    }

    /// Returns the raw bytes of an entry's values, inline or at their offset
    pub fn read_raw(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> ZonalResult<Vec<u8>> {
        let len = entry.byte_len().ok_or_else(|| ZonalError::GenericError(format!(
            "Tag {} declares {} values, too many to address", entry.tag, entry.count
        )))?;
        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(entry.inline[..len as usize].to_vec());
        }

        // Values must lie inside the stream before anything is allocated
        let file_size = validation::get_file_size(reader)?;
        if entry.value_offset.checked_add(len).map_or(true, |end| end > file_size) {
            return Err(ZonalError::GenericError(format!(
                "Tag {} values ({} bytes at offset {}) extend past the end of the file ({} bytes)",
                entry.tag, len, entry.value_offset, file_size
            )));
        }
        let len = usize::try_from(len).map_err(|_| ZonalError::GenericError(format!(
            "Tag {} values of {} bytes do not fit in memory", entry.tag, len
        )))?;

        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let mut buffer = vec![0u8; len];
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads a tag's values as unsigned integers
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> ZonalResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(ZonalError::TagNotFound(tag))?;
        let raw = self.read_raw(reader, entry)?;
        let handler = self.handler()?;

        let size = entry.field_type_size() as usize;
        let values = raw.chunks_exact(size).map(|chunk| match entry.field_type {
            field_types::BYTE | field_types::UNDEFINED => Ok(chunk[0] as u64),
            field_types::SBYTE => Ok(chunk[0] as i8 as i64 as u64),
            field_types::SHORT => Ok(handler.decode_u16(chunk) as u64),
            field_types::SSHORT => Ok(handler.decode_u16(chunk) as i16 as i64 as u64),
            field_types::LONG => Ok(handler.decode_u32(chunk) as u64),
            field_types::SLONG => Ok(handler.decode_u32(chunk) as i32 as i64 as u64),
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => Ok(handler.decode_u64(chunk)),
            other => Err(ZonalError::UnsupportedFieldType(other)),
        }).collect::<ZonalResult<Vec<u64>>>()?;

        Ok(values)
    }

    /// Reads a tag's values as doubles, converting integer and rational types
    pub fn read_f64_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> ZonalResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(ZonalError::TagNotFound(tag))?;
        match entry.field_type {
            field_types::DOUBLE | field_types::FLOAT | field_types::RATIONAL | field_types::SRATIONAL => {},
            _ => {
                let ints = self.read_tag_values(reader, ifd, tag)?;
                let signed = matches!(entry.field_type,
                    field_types::SBYTE | field_types::SSHORT | field_types::SLONG | field_types::SLONG8);
                return Ok(ints.into_iter()
                    .map(|v| if signed { v as i64 as f64 } else { v as f64 })
                    .collect());
            }
        }

        let raw = self.read_raw(reader, entry)?;
        let handler = self.handler()?;
        let size = entry.field_type_size() as usize;

        Ok(raw.chunks_exact(size).map(|chunk| match entry.field_type {
            field_types::DOUBLE => f64::from_bits(handler.decode_u64(chunk)),
            field_types::FLOAT => f32::from_bits(handler.decode_u32(chunk)) as f64,
            field_types::RATIONAL => {
                let num = handler.decode_u32(&chunk[..4]) as f64;
                let den = handler.decode_u32(&chunk[4..]) as f64;
                if den == 0.0 { f64::NAN } else { num / den }
            },
            _ => {
                let num = handler.decode_u32(&chunk[..4]) as i32 as f64;
                let den = handler.decode_u32(&chunk[4..]) as i32 as f64;
                if den == 0.0 { f64::NAN } else { num / den }
            },
        }).collect())
    }

    /// Reads an ASCII tag, dropping the trailing NUL terminator(s)
    pub fn read_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> ZonalResult<String> {
        let entry = ifd.get_entry(tag).ok_or(ZonalError::TagNotFound(tag))?;
        let mut raw = self.read_raw(reader, entry)?;
        while raw.last() == Some(&0) {
            raw.pop();
        }

        String::from_utf8(raw)
            .map_err(|e| ZonalError::GenericError(format!("Invalid UTF-8 string in tag {}: {}", tag, e)))
    }
}
