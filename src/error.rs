//! Error types for cache operations.
//!
//! Every fallible public operation returns [`CacheError`]; nothing in the
//! library panics or aborts on a caller-visible failure. Compression
//! failures during writes are not represented here because the cache
//! swallows them and stores the original bytes instead.

use std::fmt;

/// Error returned by cache lookups and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The key was empty. Keys must be non-empty strings.
    KeyInvalid,
    /// The key is absent, or present but past its expiration.
    KeyNotFound,
    /// The entry is marked compressed but its payload failed to decompress.
    /// Carries the decompressor's own description of the failure.
    Corrupt(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyInvalid => f.write_str("key must be a non-empty string"),
            Self::KeyNotFound => f.write_str("key not found"),
            Self::Corrupt(reason) => write!(f, "stored payload failed to decompress: {reason}"),
        }
    }
}

impl std::error::Error for CacheError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
