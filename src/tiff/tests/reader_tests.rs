//! Tests for reading headers and tag values

use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::tiff::constants::tags;
use crate::tiff::reader::TiffReader;

/// Big-endian classic TIFF with inline SHORTs, a DOUBLE array and an ASCII tag
fn big_endian_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<BigEndian>(0x4D4D).unwrap();
    buffer.write_u16::<BigEndian>(42).unwrap();
    buffer.write_u32::<BigEndian>(8).unwrap();

    // 2 + 5 * 12 + 4 bytes of IFD starting at 8
    let doubles_at = 8 + 2 + 5 * 12 + 4;
    let ascii_at = doubles_at + 24;

    buffer.write_u16::<BigEndian>(5).unwrap();

    buffer.write_u16::<BigEndian>(tags::IMAGE_WIDTH).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(1).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();

    buffer.write_u16::<BigEndian>(tags::IMAGE_LENGTH).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(1).unwrap();
    buffer.write_u16::<BigEndian>(2).unwrap();
    buffer.write_u16::<BigEndian>(0).unwrap();

    buffer.write_u16::<BigEndian>(tags::BITS_PER_SAMPLE).unwrap();
    buffer.write_u16::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(2).unwrap();
    buffer.write_u16::<BigEndian>(16).unwrap();
    buffer.write_u16::<BigEndian>(32).unwrap();

    buffer.write_u16::<BigEndian>(tags::DATE_TIME).unwrap();
    buffer.write_u16::<BigEndian>(2).unwrap();
    buffer.write_u32::<BigEndian>(20).unwrap();
    buffer.write_u32::<BigEndian>(ascii_at).unwrap();

    buffer.write_u16::<BigEndian>(tags::MODEL_PIXEL_SCALE_TAG).unwrap();
    buffer.write_u16::<BigEndian>(12).unwrap();
    buffer.write_u32::<BigEndian>(3).unwrap();
    buffer.write_u32::<BigEndian>(doubles_at).unwrap();

    buffer.write_u32::<BigEndian>(0).unwrap();

    for v in [0.05f64, 0.05, 0.0] {
        buffer.write_f64::<BigEndian>(v).unwrap();
    }
    buffer.extend_from_slice(b"2006:01:01 00:00:00\0");

    Cursor::new(buffer)
}

#[test]
fn test_big_endian_inline_values() {
    let mut cursor = big_endian_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert!(!tiff.is_big_tiff);
    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((3, 2)));

    let bits = reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap();
    assert_eq!(bits, vec![16, 32]);
}

#[test]
fn test_out_of_line_doubles_and_ascii() {
    let mut cursor = big_endian_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    let scale = reader.read_f64_values(&mut cursor, ifd, tags::MODEL_PIXEL_SCALE_TAG).unwrap();
    assert_eq!(scale, vec![0.05, 0.05, 0.0]);

    let date = reader.read_ascii(&mut cursor, ifd, tags::DATE_TIME).unwrap();
    assert_eq!(date, "2006:01:01 00:00:00");

    assert!(reader.read_tag_values(&mut cursor, ifd, tags::COMPRESSION).is_err());
}

#[test]
fn test_bigtiff_header() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(8).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    buffer.write_u64::<LittleEndian>(2).unwrap();
    for (tag, value) in [(tags::IMAGE_WIDTH, 1024u64), (tags::IMAGE_LENGTH, 768)] {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(4).unwrap();
        buffer.write_u64::<LittleEndian>(1).unwrap();
        buffer.write_u64::<LittleEndian>(value).unwrap();
    }
    buffer.write_u64::<LittleEndian>(0).unwrap();

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut Cursor::new(buffer)).unwrap();

    assert!(tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 1);
    assert_eq!(tiff.main_ifd().unwrap().get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_rejects_bad_bigtiff_offset_size() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(43).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u16::<LittleEndian>(0).unwrap();
    buffer.write_u64::<LittleEndian>(16).unwrap();

    let mut reader = TiffReader::new();
    assert!(reader.read(&mut Cursor::new(buffer)).is_err());
}

#[test]
fn test_rejects_values_past_end_of_file() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    buffer.write_u16::<LittleEndian>(1).unwrap();
    // A billion offsets claimed for a file of a few dozen bytes
    buffer.write_u16::<LittleEndian>(tags::STRIP_OFFSETS).unwrap();
    buffer.write_u16::<LittleEndian>(4).unwrap();
    buffer.write_u32::<LittleEndian>(0x4000_0000).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();
    buffer.write_u32::<LittleEndian>(0).unwrap();

    let mut cursor = Cursor::new(buffer);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    assert!(reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).is_err());
}
