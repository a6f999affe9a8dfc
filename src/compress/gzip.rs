use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::Compressor;

/// Gzip compression backed by `flate2`.
///
/// A reasonable default trade of CPU for space; repetitive payloads shrink
/// substantially at the default level.
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    /// Creates a gzip compressor at the default compression level.
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// Creates a gzip compressor at an explicit level (0–9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for GzipCompressor {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
