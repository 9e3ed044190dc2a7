//! Sample decoding and predictor reversal
//!
//! Chunks arrive as raw bytes in the file's byte order. Predictors are
//! undone in place before individual samples are decoded to `f64`.

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::sample_format;

/// Interpretation of sample bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Unsigned,
    Signed,
    Float,
}

impl SampleFormat {
    /// Maps the SampleFormat tag value, None for complex types
    pub fn from_tag(value: u64) -> Option<Self> {
        match value {
            sample_format::UNSIGNED | sample_format::VOID => Some(SampleFormat::Unsigned),
            sample_format::SIGNED => Some(SampleFormat::Signed),
            sample_format::IEEEFP => Some(SampleFormat::Float),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleFormat::Unsigned => "unsigned integer",
            SampleFormat::Signed => "signed integer",
            SampleFormat::Float => "floating point",
        }
    }
}

/// Decodes one sample of `bytes.len()` bytes (1, 2, 4 or 8)
pub fn decode_sample(bytes: &[u8], format: SampleFormat, handler: &dyn ByteOrderHandler) -> f64 {
    match (format, bytes.len()) {
        (SampleFormat::Unsigned, 1) => bytes[0] as f64,
        (SampleFormat::Signed, 1) => bytes[0] as i8 as f64,
        (SampleFormat::Unsigned, 2) => handler.decode_u16(bytes) as f64,
        (SampleFormat::Signed, 2) => handler.decode_u16(bytes) as i16 as f64,
        (SampleFormat::Unsigned, 4) => handler.decode_u32(bytes) as f64,
        (SampleFormat::Signed, 4) => handler.decode_u32(bytes) as i32 as f64,
        (SampleFormat::Float, 4) => f32::from_bits(handler.decode_u32(bytes)) as f64,
        (SampleFormat::Unsigned, 8) => handler.decode_u64(bytes) as f64,
        (SampleFormat::Signed, 8) => handler.decode_u64(bytes) as i64 as f64,
        (SampleFormat::Float, 8) => f64::from_bits(handler.decode_u64(bytes)),
        _ => f64::NAN,
    }
}

/// Undoes horizontal differencing (predictor 2) row by row
///
/// Each sample was stored as the wrapping difference to the sample of the
/// same channel one pixel to the left.
pub fn undo_horizontal_predictor(
    data: &mut [u8],
    width: usize,
    samples_per_pixel: usize,
    bytes_per_sample: usize,
    handler: &dyn ByteOrderHandler,
) {
    let row_samples = width * samples_per_pixel;
    let row_bytes = row_samples * bytes_per_sample;
    if row_bytes == 0 {
        return;
    }

    for row in data.chunks_exact_mut(row_bytes) {
        for i in samples_per_pixel..row_samples {
            let cur = i * bytes_per_sample;
            let prev = (i - samples_per_pixel) * bytes_per_sample;
            match bytes_per_sample {
                1 => row[i] = row[i].wrapping_add(row[i - samples_per_pixel]),
                2 => {
                    let sum = handler.decode_u16(&row[cur..]).wrapping_add(handler.decode_u16(&row[prev..]));
                    handler.encode_u16(&mut row[cur..cur + 2], sum);
                },
                4 => {
                    let sum = handler.decode_u32(&row[cur..]).wrapping_add(handler.decode_u32(&row[prev..]));
                    handler.encode_u32(&mut row[cur..cur + 4], sum);
                },
                8 => {
                    let sum = handler.decode_u64(&row[cur..]).wrapping_add(handler.decode_u64(&row[prev..]));
                    handler.encode_u64(&mut row[cur..cur + 8], sum);
                },
                _ => return,
            }
        }
    }
}

/// Undoes the floating point predictor (predictor 3) row by row
///
/// Rows hold the byte-differenced samples split into byte planes, most
/// significant plane first. Output samples are written in `order`.
pub fn undo_floating_point_predictor(
    data: &mut [u8],
    width: usize,
    samples_per_pixel: usize,
    bytes_per_sample: usize,
    order: ByteOrder,
) {
    let samples = width * samples_per_pixel;
    let row_bytes = samples * bytes_per_sample;
    if row_bytes == 0 {
        return;
    }

    let mut planes = vec![0u8; row_bytes];
    for row in data.chunks_exact_mut(row_bytes) {
        for i in samples_per_pixel..row_bytes {
            row[i] = row[i].wrapping_add(row[i - samples_per_pixel]);
        }

        planes.copy_from_slice(row);
        for k in 0..samples {
            for b in 0..bytes_per_sample {
                let dst = match order {
                    ByteOrder::BigEndian => k * bytes_per_sample + b,
                    ByteOrder::LittleEndian => k * bytes_per_sample + (bytes_per_sample - 1 - b),
                };
                row[dst] = planes[b * samples + k];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::{BigEndianHandler, LittleEndianHandler};

    #[test]
    fn decodes_signed_and_float_samples() {
        let le = LittleEndianHandler;
        assert_eq!(decode_sample(&[0xFF], SampleFormat::Signed, &le), -1.0);
        assert_eq!(decode_sample(&[0xFF], SampleFormat::Unsigned, &le), 255.0);
        assert_eq!(decode_sample(&(-300i16).to_le_bytes(), SampleFormat::Signed, &le), -300.0);
        assert_eq!(decode_sample(&2.5f32.to_be_bytes(), SampleFormat::Float, &BigEndianHandler), 2.5);
        assert_eq!(decode_sample(&1e300f64.to_le_bytes(), SampleFormat::Float, &le), 1e300);
    }

    #[test]
    fn horizontal_predictor_16_bit_big_endian() {
        // 100, 105, 90 stored as 100, +5, -15
        let mut row = Vec::new();
        for d in [100u16, 5, 0u16.wrapping_sub(15)] {
            row.extend_from_slice(&d.to_be_bytes());
        }
        undo_horizontal_predictor(&mut row, 3, 1, 2, &BigEndianHandler);

        let values: Vec<u16> = row.chunks(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
        assert_eq!(values, vec![100, 105, 90]);
    }

    #[test]
    fn horizontal_predictor_keeps_channels_apart() {
        // Two pixels, two channels: (10, 200) and (13, 190)
        let mut row = vec![10u8, 200, 3, 0u8.wrapping_sub(10)];
        undo_horizontal_predictor(&mut row, 2, 2, 1, &LittleEndianHandler);
        assert_eq!(row, vec![10, 200, 13, 190]);
    }

    #[test]
    fn floating_point_predictor_restores_little_endian_floats() {
        let values = [1.5f32, -2.25, 3.0];
        let samples = values.len();

        // Split into most-significant-first byte planes, then difference
        let mut encoded = vec![0u8; samples * 4];
        for (k, v) in values.iter().enumerate() {
            for (b, byte) in v.to_be_bytes().iter().enumerate() {
                encoded[b * samples + k] = *byte;
            }
        }
        for i in (1..encoded.len()).rev() {
            encoded[i] = encoded[i].wrapping_sub(encoded[i - 1]);
        }

        undo_floating_point_predictor(&mut encoded, samples, 1, 4, ByteOrder::LittleEndian);
        let decoded: Vec<f32> = encoded.chunks(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(decoded, values.to_vec());
    }
}
