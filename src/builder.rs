//! Cache construction.
//!
//! All knobs have defaults, so `CacheBuilder::new().build()` yields a
//! working cache: 100 MiB budget, LRU eviction, no compression, 1 MiB
//! compression threshold, and a shard count derived from the host's CPU
//! count.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bytecache::builder::CacheBuilder;
//! use bytecache::compress::GzipCompressor;
//! use bytecache::policy::EvictionPolicy;
//!
//! let cache = CacheBuilder::new()
//!     .max_bytes(16 * 1024 * 1024)
//!     .policy(EvictionPolicy::Lfu)
//!     .compressor(Arc::new(GzipCompressor::new()))
//!     .compress_threshold(4096)
//!     .build();
//! assert_eq!(cache.stats().policy, EvictionPolicy::Lfu);
//! ```

use std::sync::Arc;

use crate::cache::Cache;
use crate::compress::{Compressor, NoopCompressor};
use crate::policy::EvictionPolicy;
use crate::shard::Shard;
use crate::sizing;

const DEFAULT_MAX_BYTES: usize = 100 * 1024 * 1024;
const DEFAULT_COMPRESS_THRESHOLD: usize = 1024 * 1024;

/// Builder for [`Cache`] instances.
pub struct CacheBuilder {
    max_bytes: usize,
    policy: EvictionPolicy,
    compressor: Arc<dyn Compressor>,
    compress_threshold: usize,
    shard_count: Option<usize>,
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            policy: EvictionPolicy::Lru,
            compressor: Arc::new(NoopCompressor::new()),
            compress_threshold: DEFAULT_COMPRESS_THRESHOLD,
            shard_count: None,
        }
    }

    /// Global memory budget in bytes. `0` disables the bound entirely.
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Eviction policy.
    pub fn policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Eviction policy by name. Unrecognized names normalize to LRU and
    /// `stats()` reports the normalized value.
    pub fn policy_name(mut self, name: &str) -> Self {
        self.policy = EvictionPolicy::from_name(name);
        self
    }

    /// Compressor applied to payloads past the threshold. The instance is
    /// shared by every shard and must therefore tolerate concurrent use.
    pub fn compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
        self.compressor = compressor;
        self
    }

    /// Payloads strictly larger than this are offered to the compressor.
    pub fn compress_threshold(mut self, threshold: usize) -> Self {
        self.compress_threshold = threshold;
        self
    }

    /// Overrides the shard count (clamped to at least 1). Without this the
    /// count is derived from the host's logical CPUs. Mostly useful in
    /// tests, where a single shard makes eviction order fully predictable.
    pub fn shard_count(mut self, count: usize) -> Self {
        self.shard_count = Some(count.max(1));
        self
    }

    /// Builds the cache, splitting the budget evenly across shards. If the
    /// split rounds to zero while a budget is set, each shard gets a single
    /// byte so inserts can still make progress (the global bound becomes
    /// approximate at that scale).
    pub fn build(self) -> Cache {
        let shard_count = self
            .shard_count
            .unwrap_or_else(sizing::optimal_shard_count);

        let mut per_shard = self.max_bytes / shard_count;
        if per_shard == 0 && self.max_bytes > 0 {
            per_shard = 1;
        }

        let shards = (0..shard_count)
            .map(|_| {
                Arc::new(Shard::new(
                    per_shard,
                    self.policy,
                    Arc::clone(&self.compressor),
                    self.compress_threshold,
                ))
            })
            .collect();

        tracing::debug!(
            shard_count,
            max_bytes = self.max_bytes,
            per_shard_bytes = per_shard,
            policy = %self.policy,
            compressor = self.compressor.name(),
            compress_threshold = self.compress_threshold,
            "constructed cache"
        );

        Cache::from_parts(shards, self.max_bytes, self.policy)
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_match_documentation() {
        let cache = CacheBuilder::new().build();
        let stats = cache.stats();

        assert_eq!(stats.max_bytes, 100 * 1024 * 1024);
        assert_eq!(stats.policy, EvictionPolicy::Lru);
        assert!(stats.shard_count >= 4);
        assert!(stats.shard_count.is_power_of_two());
    }

    #[test]
    fn policy_name_normalizes_unknown_strings() {
        let cache = CacheBuilder::new().policy_name("SECOND-CHANCE").build();
        assert_eq!(cache.stats().policy, EvictionPolicy::Lru);

        let cache = CacheBuilder::new().policy_name("FIFO").build();
        assert_eq!(cache.stats().policy, EvictionPolicy::Fifo);
    }

    #[test]
    fn tiny_budget_still_accepts_inserts() {
        // Budget smaller than the shard count: every shard gets one byte.
        let cache = CacheBuilder::new().max_bytes(3).shard_count(8).build();
        cache.set("k", b"x", Duration::ZERO).unwrap();

        // The one-byte entry fits its shard's one-byte floor.
        assert_eq!(cache.get("k").unwrap(), b"x");
    }

    #[test]
    fn zero_budget_means_unbounded() {
        let cache = CacheBuilder::new().max_bytes(0).shard_count(2).build();
        for i in 0..64 {
            cache
                .set(&format!("k{i}"), &[0u8; 1024], Duration::ZERO)
                .unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.current_count, 64);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn shard_count_override_is_clamped() {
        let cache = CacheBuilder::new().shard_count(0).build();
        assert_eq!(cache.shard_count(), 1);
    }
}
