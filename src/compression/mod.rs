//! Decompression of TIFF strips and tiles
//!
//! One strategy per TIFF compression code, selected through the factory.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod packbits;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use packbits::PackBitsHandler;
pub use zstd::ZstdHandler;
