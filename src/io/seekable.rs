//! Seekable reader trait
//!
//! Unifies readers that support both reading and seeking, so the TIFF
//! parser works the same over files and in-memory cursors.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
