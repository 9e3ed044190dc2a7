//! I/O utilities for raster file handling
//!
//! Seekable reader abstraction and byte order strategies used by the
//! TIFF parser and the raster chunk decoder.

pub mod seekable;
pub mod byte_order;
