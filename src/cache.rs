//! The cache handle: key routing and the public operation surface.
//!
//! ## Architecture
//!
//! A [`Cache`] is an immutable array of shards plus a stateless router.
//! Every operation hashes the key with FNV-1a (32-bit) and reduces the hash
//! modulo the shard count, so the same key always lands on the same shard
//! for the lifetime of the cache. The router itself takes no lock; all
//! synchronization lives inside the shards.
//!
//! ```text
//!   set/get/delete ──► fnv1a(key) % shard_count ──► shards[i] ──► entry lock
//!   stats          ──► every shard, summed
//!   clear          ──► every shard
//! ```
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use bytecache::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new().build();
//! cache.set("greeting", b"hello", Duration::ZERO).unwrap();
//! assert_eq!(cache.get("greeting").unwrap(), b"hello");
//!
//! cache.delete("greeting");
//! assert!(cache.get("greeting").is_err());
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::builder::CacheBuilder;
use crate::error::CacheError;
use crate::policy::EvictionPolicy;
use crate::shard::Shard;
use crate::stats::CacheStats;

/// Thread-safe, sharded, byte-oriented key/value cache.
///
/// Values are opaque byte payloads; keys are non-empty strings. The cache
/// enforces a global memory budget split evenly across shards, expires
/// entries lazily by TTL, and optionally compresses payloads past a size
/// threshold. Construct one with [`CacheBuilder`].
///
/// `Cache` is `Send + Sync`; share it across threads behind an `Arc` (or
/// borrow it from scoped threads) without external locking.
pub struct Cache {
    shards: Vec<Arc<Shard>>,
    shard_count: usize,
    max_bytes: usize,
    policy: EvictionPolicy,
}

impl Cache {
    pub(crate) fn from_parts(
        shards: Vec<Arc<Shard>>,
        max_bytes: usize,
        policy: EvictionPolicy,
    ) -> Self {
        let shard_count = shards.len();
        Self {
            shards,
            shard_count,
            max_bytes,
            policy,
        }
    }

    /// Starts building a cache. Equivalent to [`CacheBuilder::new`].
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    /// Stores `value` under `key`. A zero `ttl` means the entry never
    /// expires. Fails only on an empty key; storing may evict other entries
    /// (or, if `value` alone exceeds the shard budget, the entry itself).
    pub fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        self.shard_for(key).set(key, value, ttl)
    }

    /// Fetches the value stored under `key`, decompressing if needed.
    ///
    /// Returns [`CacheError::KeyNotFound`] for absent or expired keys and
    /// [`CacheError::Corrupt`] when a compressed payload cannot be
    /// decompressed.
    pub fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        self.shard_for(key).get(key)
    }

    /// Removes `key` if present. Idempotent; never fails.
    pub fn delete(&self, key: &str) {
        self.shard_for(key).delete(key);
    }

    /// Removes every entry and zeroes all statistics counters.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
    }

    /// Aggregated statistics across all shards.
    ///
    /// Each shard is snapshotted consistently, but the aggregate is not an
    /// atomic cut: operations racing with `stats` may land in either side
    /// of the sum. Counters are monotonic per shard between `clear` calls.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            max_bytes: self.max_bytes,
            policy: self.policy,
            shard_count: self.shard_count,
            ..CacheStats::default()
        };
        for shard in &self.shards {
            let snapshot = shard.snapshot();
            stats.hits += snapshot.hits;
            stats.misses += snapshot.misses;
            stats.evictions += snapshot.evictions;
            stats.current_count += snapshot.current_count;
            stats.current_bytes += snapshot.current_bytes;
        }
        stats
    }

    /// The number of shards the key space is split into.
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    fn shard_for(&self, key: &str) -> &Arc<Shard> {
        let index = fnv1a(key) as usize % self.shard_count;
        &self.shards[index]
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        for shard in &self.shards {
            shard.debug_validate_invariants();
        }
    }
}

impl Default for Cache {
    /// A cache with all defaults: 100 MiB budget, LRU, no compression.
    fn default() -> Self {
        CacheBuilder::new().build()
    }
}

/// FNV-1a 32-bit hash over the key's bytes.
///
/// Fast, non-cryptographic, and well distributed for short string keys;
/// the offset basis and prime are the standard 32-bit FNV parameters.
pub(crate) fn fnv1a(key: &str) -> u32 {
    const OFFSET_BASIS: u32 = 2166136261;
    const PRIME: u32 = 16777619;

    let mut hash = OFFSET_BASIS;
    for byte in key.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
