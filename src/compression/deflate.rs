//! Handler for Adobe Deflate compressed data

use std::io::Read;
use flate2::read::ZlibDecoder;
use crate::errors::{ZonalError, ZonalResult};
use super::handler::CompressionHandler;

/// Adobe Deflate (Zlib) compression handler (compression code 8)
pub struct AdobeDeflateHandler;

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8]) -> ZonalResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed_data = Vec::new();
        decoder.read_to_end(&mut decompressed_data).map_err(ZonalError::IoError)?;
        Ok(decompressed_data)
    }

    fn name(&self) -> &'static str {
        "Adobe Deflate"
    }

    fn code(&self) -> u64 {
        8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn inflates_zlib_stream() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[7u8; 300]).unwrap();
        let compressed = encoder.finish().unwrap();

        let out = AdobeDeflateHandler.decompress(&compressed).unwrap();
        assert_eq!(out, vec![7u8; 300]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(AdobeDeflateHandler.decompress(&[1, 2, 3, 4]).is_err());
    }
}
