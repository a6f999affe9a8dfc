//! Byte-wise compression behind a pluggable capability.
//!
//! The cache treats the compressor as an opaque, shared collaborator: it
//! calls [`Compressor::compress`] when a payload crosses the configured
//! threshold and [`Compressor::decompress`] when reading a payload stored
//! compressed. Implementations must be `Send + Sync`; the cache shares one
//! instance across every shard and never assumes statelessness beyond that.
//!
//! Three implementations ship with the crate:
//!
//! - [`NoopCompressor`]: identity passthrough (the default).
//! - [`GzipCompressor`]: gzip via `flate2`.
//! - [`ZstdCompressor`]: Zstandard via `zstd`.
//!
//! ## Example
//!
//! ```
//! use bytecache::compress::{Compressor, GzipCompressor};
//!
//! let gzip = GzipCompressor::new();
//! let data = vec![b'a'; 4096];
//! let packed = gzip.compress(&data).unwrap();
//! assert!(packed.len() < data.len());
//! assert_eq!(gzip.decompress(&packed).unwrap(), data);
//! ```

mod gzip;
mod zstd;

use std::io;
use std::sync::Arc;

pub use self::gzip::GzipCompressor;
pub use self::zstd::ZstdCompressor;

/// Two-method compression capability consumed by the cache core.
///
/// Failures are `io::Error` because that is what both shipped codecs speak
/// natively. A failing `compress` makes the cache fall back to storing the
/// original bytes; a failing `decompress` surfaces as a corrupt-entry error
/// to the reader.
pub trait Compressor: Send + Sync {
    /// Short algorithm name, e.g. `"gzip"`.
    fn name(&self) -> &'static str;

    /// Compresses `data`, returning the full compressed representation.
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>>;

    /// Reverses [`compress`](Self::compress) byte-for-byte.
    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>>;
}

/// Identity compressor: stores payloads as-is.
///
/// Because its output is never shorter than its input, entries pass through
/// the cache's shorter-than-original check and are stored uncompressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCompressor;

impl NoopCompressor {
    pub fn new() -> Self {
        Self
    }
}

impl Compressor for NoopCompressor {
    fn name(&self) -> &'static str {
        "none"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Resolves a compressor by algorithm name.
///
/// Recognizes `"gzip"`, `"zstd"`, and `"none"`; anything else resolves to
/// the no-op compressor, mirroring how unknown policy names normalize to
/// LRU.
pub fn from_name(name: &str) -> Arc<dyn Compressor> {
    match name {
        "gzip" => Arc::new(GzipCompressor::new()),
        "zstd" => Arc::new(ZstdCompressor::new()),
        _ => Arc::new(NoopCompressor::new()),
    }
}
