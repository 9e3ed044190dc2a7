//! Handler for PackBits run-length encoded data

use log::warn;
use crate::errors::ZonalResult;
use super::handler::CompressionHandler;

/// PackBits compression handler (compression code 32773)
pub struct PackBitsHandler;

impl CompressionHandler for PackBitsHandler {
    fn decompress(&self, data: &[u8]) -> ZonalResult<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut pos = 0;

        while pos < data.len() {
            let header = data[pos] as i8;
            pos += 1;

            match header {
                // Literal run of header + 1 bytes
                0..=127 => {
                    let len = header as usize + 1;
                    let end = (pos + len).min(data.len());
                    if end - pos < len {
                        warn!("PackBits literal run truncated ({} of {} bytes)", end - pos, len);
                    }
                    out.extend_from_slice(&data[pos..end]);
                    pos = end;
                },
                // No-op
                -128 => {},
                // Next byte repeated 1 - header times
                _ => {
                    let len = 1 - header as isize;
                    if let Some(&byte) = data.get(pos) {
                        out.extend(std::iter::repeat(byte).take(len as usize));
                        pos += 1;
                    }
                },
            }
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "PackBits"
    }

    fn code(&self) -> u64 {
        32773
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_apple_sample() {
        // Example stream from the TIFF 6.0 specification
        let packed = [
            0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7, 0xAA,
        ];
        let expected = [
            0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];
        assert_eq!(PackBitsHandler.decompress(&packed).unwrap(), expected.to_vec());
    }
}
