//! Factory for creating compression handlers

use crate::errors::{ZonalError, ZonalResult};
use crate::tiff::constants::compression;
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::packbits::PackBitsHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given compression code
    pub fn create_handler(code: u64) -> ZonalResult<Box<dyn CompressionHandler>> {
        match code {
            compression::NONE => Ok(Box::new(UncompressedHandler)),
            compression::DEFLATE | compression::DEFLATE_OBSOLETE => Ok(Box::new(AdobeDeflateHandler)),
            compression::ZSTD => Ok(Box::new(ZstdHandler)),
            compression::PACKBITS => Ok(Box::new(PackBitsHandler)),
            _ => Err(ZonalError::UnsupportedCompression(code)),
        }
    }

    /// Human readable name of a compression code, for inspection output
    pub fn describe(code: u64) -> String {
        match Self::create_handler(code) {
            Ok(handler) => handler.name().to_string(),
            Err(_) if code == compression::LZW => "LZW (unsupported)".to_string(),
            Err(_) => format!("Unknown ({})", code),
        }
    }
}
