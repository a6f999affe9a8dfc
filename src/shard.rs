//! Shard storage engine.
//!
//! A shard owns one slice of the key space: a hash map of entries, the
//! eviction index covering exactly the same keys, byte/count accounting,
//! and its share of the memory budget. Two locks protect it:
//!
//! - the entry lock (`RwLock<ShardInner>`) over the map, the index, and the
//!   size accounting;
//! - a separate counter lock ([`ShardCounters`]) for hits/misses/evictions,
//!   so recording a miss never waits on a writer.
//!
//! Lock nesting is one-directional: paths that hold the entry lock may bump
//! counters, but no path acquires the entry lock while holding the counter
//! lock. Snapshots read the two sequentially.
//!
//! Writes compress (when past the threshold) before taking the entry lock,
//! and enforce the budget before releasing it, so an insert and the
//! evictions it forces are one critical section. Expired entries are
//! collected lazily: the read that discovers one reports a miss and hands
//! removal to a background task that re-checks both presence and expiry
//! under the write lock, staying safe against a concurrent resurrecting
//! `set`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::compress::Compressor;
use crate::error::CacheError;
use crate::policy::{EvictionPolicy, PolicyIndex};
use crate::stats::{ShardCounters, ShardSnapshot};

/// One cached value plus the metadata eviction and expiry run on.
#[derive(Debug)]
struct Entry {
    key: Arc<str>,
    payload: Arc<[u8]>,
    size: usize,
    created_at: Instant,
    expire_at: Option<Instant>,
    accessed_at: Instant,
    access_count: u64,
    compressed: bool,
}

#[derive(Debug)]
struct ShardInner {
    entries: FxHashMap<Arc<str>, Entry>,
    index: PolicyIndex,
    current_bytes: usize,
    current_count: usize,
}

pub(crate) struct Shard {
    max_bytes: usize,
    compress_threshold: usize,
    compressor: Arc<dyn Compressor>,
    inner: RwLock<ShardInner>,
    counters: ShardCounters,
}

impl Shard {
    pub fn new(
        max_bytes: usize,
        policy: EvictionPolicy,
        compressor: Arc<dyn Compressor>,
        compress_threshold: usize,
    ) -> Self {
        Self {
            max_bytes,
            compress_threshold,
            compressor,
            inner: RwLock::new(ShardInner {
                entries: FxHashMap::default(),
                index: PolicyIndex::new(policy),
                current_bytes: 0,
                current_count: 0,
            }),
            counters: ShardCounters::default(),
        }
    }

    /// Stores `value` under `key`, evicting as needed to stay within this
    /// shard's budget. A zero `ttl` means the entry never expires.
    pub fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::KeyInvalid);
        }

        let now = Instant::now();
        let mut packed: Option<Vec<u8>> = None;
        if value.len() > self.compress_threshold {
            match self.compressor.compress(value) {
                Ok(bytes) if bytes.len() < value.len() => packed = Some(bytes),
                Ok(_) => {}
                Err(err) => {
                    // Non-fatal: store the original bytes.
                    tracing::warn!(
                        compressor = self.compressor.name(),
                        error = %err,
                        "compression failed, storing uncompressed"
                    );
                }
            }
        }
        let compressed = packed.is_some();
        let payload: Arc<[u8]> = match packed {
            Some(bytes) => bytes.into(),
            None => Arc::from(value),
        };
        let size = payload.len();

        let expire_at = if ttl.is_zero() {
            None
        } else {
            now.checked_add(ttl)
        };

        let mut guard = self.inner.write();
        let inner = &mut *guard;
        if let Some(entry) = inner.entries.get_mut(key) {
            inner.current_bytes -= entry.size;

            // Overwrite in place; created_at and access_count carry over.
            entry.payload = payload;
            entry.size = size;
            entry.expire_at = expire_at;
            entry.accessed_at = now;
            entry.compressed = compressed;

            inner.current_bytes += size;
            let key_arc = entry.key.clone();
            let access_count = entry.access_count;
            // Re-registration is policy-specific: LRU refreshes recency,
            // LFU rebuckets by the carried access count, FIFO keeps the
            // original queue position.
            inner.index.insert(key_arc, access_count, now);
        } else {
            let key_arc: Arc<str> = Arc::from(key);
            inner.entries.insert(
                key_arc.clone(),
                Entry {
                    key: key_arc.clone(),
                    payload,
                    size,
                    created_at: now,
                    expire_at,
                    accessed_at: now,
                    access_count: 0,
                    compressed,
                },
            );
            inner.current_bytes += size;
            inner.current_count += 1;
            inner.index.insert(key_arc, 0, now);
        }

        self.evict_if_needed(inner);
        Ok(())
    }

    /// Looks up `key`, returning the decompressed payload on a hit.
    ///
    /// An expired entry reports a miss and is removed by a background task
    /// rather than inline, keeping the read path short.
    pub fn get(self: &Arc<Self>, key: &str) -> Result<Vec<u8>, CacheError> {
        if key.is_empty() {
            return Err(CacheError::KeyInvalid);
        }

        let now = Instant::now();
        {
            let inner = self.inner.read();
            let Some(entry) = inner.entries.get(key) else {
                drop(inner);
                self.counters.record_miss();
                return Err(CacheError::KeyNotFound);
            };
            if entry.expire_at.is_some_and(|at| now > at) {
                let key_arc = entry.key.clone();
                drop(inner);
                self.spawn_expired_removal(key_arc);
                self.counters.record_miss();
                return Err(CacheError::KeyNotFound);
            }
        }

        // Re-acquire exclusively to update access metadata and the index.
        let (payload, compressed) = {
            let mut guard = self.inner.write();
            let inner = &mut *guard;
            let Some(entry) = inner.entries.get_mut(key) else {
                // Deleted between the two locks.
                drop(guard);
                self.counters.record_miss();
                return Err(CacheError::KeyNotFound);
            };
            entry.accessed_at = now;
            entry.access_count += 1;
            let access_count = entry.access_count;
            let payload = entry.payload.clone();
            let compressed = entry.compressed;
            inner.index.touch(key, access_count, now);
            (payload, compressed)
        };

        self.counters.record_hit();
        if compressed {
            self.compressor
                .decompress(&payload)
                .map_err(|err| CacheError::Corrupt(err.to_string()))
        } else {
            Ok(payload.to_vec())
        }
    }

    /// Removes `key` if present. Idempotent.
    pub fn delete(&self, key: &str) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        if let Some(entry) = inner.entries.remove(key) {
            inner.current_bytes -= entry.size;
            inner.current_count -= 1;
            inner.index.remove(key);
        }
    }

    /// Drops every entry and zeroes the statistics counters.
    pub fn clear(&self) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        inner.entries.clear();
        inner.index.clear();
        inner.current_bytes = 0;
        inner.current_count = 0;
        drop(guard);

        self.counters.reset();
    }

    /// This shard's contribution to the aggregate statistics. The counter
    /// lock is read first, then the entry lock; the two reads are not one
    /// atomic cut.
    pub fn snapshot(&self) -> ShardSnapshot {
        let (hits, misses, evictions) = self.counters.snapshot();
        let inner = self.inner.read();
        ShardSnapshot {
            hits,
            misses,
            evictions,
            current_count: inner.current_count,
            current_bytes: inner.current_bytes,
        }
    }

    fn evict_if_needed(&self, inner: &mut ShardInner) {
        while self.max_bytes > 0 && inner.current_bytes > self.max_bytes {
            if !self.evict_one(inner) {
                break;
            }
        }
    }

    fn evict_one(&self, inner: &mut ShardInner) -> bool {
        let Some(victim) = inner.index.pop_least() else {
            return false;
        };
        let Some(entry) = inner.entries.remove(&*victim) else {
            return false;
        };
        inner.current_bytes -= entry.size;
        inner.current_count -= 1;
        self.counters.record_eviction();
        tracing::trace!(key = %entry.key, size = entry.size, "evicted over budget");
        true
    }

    fn spawn_expired_removal(self: &Arc<Self>, key: Arc<str>) {
        let shard = Arc::clone(self);
        std::thread::spawn(move || shard.remove_expired(&key));
    }

    /// Removes `key` only if it is still present and still expired, so a
    /// concurrent `set` that resurrected the key with a fresh TTL survives.
    fn remove_expired(&self, key: &str) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let now = Instant::now();
        let still_expired = inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.expire_at.is_some_and(|at| now > at));
        if !still_expired {
            return;
        }
        if let Some(entry) = inner.entries.remove(key) {
            inner.current_bytes -= entry.size;
            inner.current_count -= 1;
            inner.index.remove(key);
            self.counters.record_eviction();
            tracing::trace!(key = %entry.key, "collected expired entry");
        }
    }

    #[cfg(test)]
    pub fn debug_validate_invariants(&self) {
        let inner = self.inner.read();
        let byte_sum: usize = inner.entries.values().map(|entry| entry.size).sum();
        assert_eq!(inner.current_bytes, byte_sum);
        assert_eq!(inner.current_count, inner.entries.len());
        assert_eq!(inner.index.len(), inner.entries.len());
        for (key, entry) in &inner.entries {
            assert_eq!(&entry.key, key);
            assert_eq!(entry.size, entry.payload.len());
        }
    }
}
