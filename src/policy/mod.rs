//! Eviction policies and the per-shard index dispatch.
//!
//! Each shard owns one [`PolicyIndex`], a priority ordering over the keys it
//! currently holds. The three variants share one operation set:
//!
//! | Operation   | LRU                    | LFU                         | FIFO            |
//! |-------------|------------------------|-----------------------------|-----------------|
//! | `insert`    | push to front          | bucket by `max(1, count)`   | append to tail  |
//! | `touch`     | move to front          | rebucket by access count    | no-op           |
//! | `pop_least` | pop the back           | oldest in the min bucket    | pop the head    |
//! | `remove`    | unlink                 | excise from its bucket      | unlink          |
//!
//! The variants are dispatched through an enum rather than a trait object:
//! the set is closed, the shard picks exactly one at construction, and the
//! calls sit on the write path.

mod fifo;
mod lfu;
mod lru;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

pub(crate) use fifo::FifoIndex;
pub(crate) use lfu::LfuIndex;
pub(crate) use lru::LruIndex;

/// Eviction policy selector.
///
/// Unrecognized policy names normalize to LRU, and the normalized value is
/// what `stats()` reports.
///
/// # Example
///
/// ```
/// use bytecache::policy::EvictionPolicy;
///
/// assert_eq!(EvictionPolicy::from_name("LFU"), EvictionPolicy::Lfu);
/// assert_eq!(EvictionPolicy::from_name("something else"), EvictionPolicy::Lru);
/// assert_eq!(EvictionPolicy::Fifo.as_str(), "FIFO");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvictionPolicy {
    /// Least Recently Used.
    #[default]
    Lru,
    /// Least Frequently Used, with LRU tie-breaking.
    Lfu,
    /// First In First Out; reads and updates do not reorder.
    Fifo,
}

impl EvictionPolicy {
    /// Parses a policy name, normalizing anything unrecognized to LRU.
    pub fn from_name(name: &str) -> Self {
        match name {
            "LRU" => Self::Lru,
            "LFU" => Self::Lfu,
            "FIFO" => Self::Fifo,
            _ => Self::Lru,
        }
    }

    /// Canonical policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lru => "LRU",
            Self::Lfu => "LFU",
            Self::Fifo => "FIFO",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The concrete eviction index held by a shard.
///
/// Not internally synchronized; the shard's write lock serializes access.
#[derive(Debug)]
pub(crate) enum PolicyIndex {
    Lru(LruIndex),
    Lfu(LfuIndex),
    Fifo(FifoIndex),
}

impl PolicyIndex {
    pub fn new(policy: EvictionPolicy) -> Self {
        match policy {
            EvictionPolicy::Lru => Self::Lru(LruIndex::new()),
            EvictionPolicy::Lfu => Self::Lfu(LfuIndex::new()),
            EvictionPolicy::Fifo => Self::Fifo(FifoIndex::new()),
        }
    }

    /// Registers a key. `access_count` seeds the LFU frequency; `now` seeds
    /// its tie-break timestamp.
    pub fn insert(&mut self, key: Arc<str>, access_count: u64, now: Instant) {
        match self {
            Self::Lru(index) => index.insert(key),
            Self::Lfu(index) => index.insert(key, access_count, now),
            Self::Fifo(index) => index.insert(key),
        }
    }

    pub fn remove(&mut self, key: &str) {
        match self {
            Self::Lru(index) => index.remove(key),
            Self::Lfu(index) => index.remove(key),
            Self::Fifo(index) => index.remove(key),
        }
    }

    /// Records a successful read of `key` with its post-read access count.
    pub fn touch(&mut self, key: &str, access_count: u64, now: Instant) {
        match self {
            Self::Lru(index) => index.touch(key),
            Self::Lfu(index) => index.touch(key, access_count, now),
            Self::Fifo(index) => index.touch(key),
        }
    }

    /// Removes and returns the least-valuable key, or `None` when empty.
    pub fn pop_least(&mut self) -> Option<Arc<str>> {
        match self {
            Self::Lru(index) => index.pop_least(),
            Self::Lfu(index) => index.pop_least(),
            Self::Fifo(index) => index.pop_least(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Lru(index) => index.clear(),
            Self::Lfu(index) => index.clear(),
            Self::Fifo(index) => index.clear(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Lru(index) => index.len(),
            Self::Lfu(index) => index.len(),
            Self::Fifo(index) => index.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_normalizes_unknown_to_lru() {
        assert_eq!(EvictionPolicy::from_name("LRU"), EvictionPolicy::Lru);
        assert_eq!(EvictionPolicy::from_name("LFU"), EvictionPolicy::Lfu);
        assert_eq!(EvictionPolicy::from_name("FIFO"), EvictionPolicy::Fifo);
        assert_eq!(EvictionPolicy::from_name(""), EvictionPolicy::Lru);
        assert_eq!(EvictionPolicy::from_name("ARC"), EvictionPolicy::Lru);
        assert_eq!(EvictionPolicy::from_name("lfu"), EvictionPolicy::Lru);
    }

    #[test]
    fn display_matches_as_str() {
        for policy in [
            EvictionPolicy::Lru,
            EvictionPolicy::Lfu,
            EvictionPolicy::Fifo,
        ] {
            assert_eq!(policy.to_string(), policy.as_str());
        }
    }

    #[test]
    fn dispatch_basic_ops_all_variants() {
        let now = Instant::now();
        for policy in [
            EvictionPolicy::Lru,
            EvictionPolicy::Lfu,
            EvictionPolicy::Fifo,
        ] {
            let mut index = PolicyIndex::new(policy);
            index.insert(Arc::from("a"), 0, now);
            index.insert(Arc::from("b"), 0, now);
            assert_eq!(index.len(), 2);

            index.touch("a", 1, now);
            index.remove("b");
            assert_eq!(index.len(), 1);

            assert_eq!(index.pop_least().as_deref(), Some("a"));
            assert_eq!(index.pop_least(), None);

            index.insert(Arc::from("c"), 0, now);
            index.clear();
            assert_eq!(index.len(), 0);
        }
    }
}
