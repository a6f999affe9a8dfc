//! Cache statistics: per-shard counters and the aggregated snapshot.

use parking_lot::RwLock;

use crate::policy::EvictionPolicy;

/// Aggregated statistics snapshot returned by `Cache::stats`.
///
/// Counter fields are summed across shards and are monotonic between
/// `clear` calls. The snapshot is not an atomic cut across shards: each
/// shard is read consistently, but shards are visited one after another.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Successful `get` calls.
    pub hits: u64,
    /// Failed `get` calls, including expiry-induced failures.
    pub misses: u64,
    /// Entries removed by budget pressure or expiry collection.
    pub evictions: u64,
    /// Entries currently resident.
    pub current_count: usize,
    /// Bytes currently resident, as stored (after compression).
    pub current_bytes: usize,
    /// Configured global memory budget; 0 means unbounded.
    pub max_bytes: usize,
    /// The eviction policy in effect (post-normalization).
    pub policy: EvictionPolicy,
    /// Number of shards the key space is split into.
    pub shard_count: usize,
}

/// One shard's contribution to the aggregate.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ShardSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub current_count: usize,
    pub current_bytes: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Hit/miss/eviction counters behind their own lock, so a `get` that only
/// needs to record a miss never touches the shard's entry lock.
#[derive(Debug, Default)]
pub(crate) struct ShardCounters {
    inner: RwLock<Counters>,
}

impl ShardCounters {
    pub fn record_hit(&self) {
        self.inner.write().hits += 1;
    }

    pub fn record_miss(&self) {
        self.inner.write().misses += 1;
    }

    pub fn record_eviction(&self) {
        self.inner.write().evictions += 1;
    }

    pub fn reset(&self) {
        *self.inner.write() = Counters::default();
    }

    /// Returns `(hits, misses, evictions)` as one consistent read.
    pub fn snapshot(&self) -> (u64, u64, u64) {
        let counters = self.inner.read();
        (counters.hits, counters.misses, counters.evictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let counters = ShardCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();
        counters.record_eviction();

        assert_eq!(counters.snapshot(), (2, 1, 1));
    }

    #[test]
    fn reset_zeroes_all_counters() {
        let counters = ShardCounters::default();
        counters.record_hit();
        counters.record_miss();
        counters.reset();

        assert_eq!(counters.snapshot(), (0, 0, 0));
    }

    #[test]
    fn counters_are_shareable_across_threads() {
        use std::sync::Arc;

        let counters = Arc::new(ShardCounters::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counters = Arc::clone(&counters);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counters.record_hit();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters.snapshot().0, 4000);
    }

    #[test]
    fn stats_default_is_zeroed() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.current_bytes, 0);
        assert_eq!(stats.policy, EvictionPolicy::Lru);
    }
}
