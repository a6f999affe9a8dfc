use std::io;

use super::Compressor;

/// Default Zstandard level; matches the library's own default trade-off.
const DEFAULT_LEVEL: i32 = 3;

/// Zstandard compression backed by the `zstd` crate.
///
/// Better ratios and throughput than gzip on most cache payloads.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    /// Creates a zstd compressor at level 3.
    pub fn new() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }

    /// Creates a zstd compressor at an explicit level.
    pub fn with_level(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for ZstdCompressor {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        zstd::stream::encode_all(data, self.level)
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        zstd::stream::decode_all(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_repetitive_data() {
        let zstd = ZstdCompressor::new();
        let data = b"zstandard test payload ".repeat(200);

        let packed = zstd.compress(&data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(zstd.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn round_trips_empty_input() {
        let zstd = ZstdCompressor::new();
        let packed = zstd.compress(&[]).unwrap();
        assert!(zstd.decompress(&packed).unwrap().is_empty());
    }

    #[test]
    fn garbage_input_fails_to_decompress() {
        let zstd = ZstdCompressor::new();
        assert!(zstd.decompress(b"not a zstd frame").is_err());
    }

    #[test]
    fn custom_level_round_trips() {
        let zstd = ZstdCompressor::with_level(9);
        let data = b"level nine".repeat(50);
        let packed = zstd.compress(&data).unwrap();
        assert_eq!(zstd.decompress(&packed).unwrap(), data);
    }
}
