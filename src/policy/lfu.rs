use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::ds::KeyedList;

#[derive(Debug)]
struct LfuNode {
    freq: u64,
    last_used: Instant,
}

/// Least-frequently-used ordering with LRU tie-breaking.
///
/// Keys live in per-frequency buckets; `min_freq` names the lowest non-empty
/// bucket (0 when the index is empty). Eviction scans the minimum bucket for
/// the stalest `last_used`, so `pop_least` is O(k) over that bucket while
/// every other operation stays O(1).
#[derive(Debug, Default)]
pub(crate) struct LfuIndex {
    nodes: FxHashMap<Arc<str>, LfuNode>,
    buckets: FxHashMap<u64, KeyedList>,
    min_freq: u64,
}

impl LfuIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Registers a key at `max(1, access_count)`. A key that is already
    /// tracked is rebucketed, which lets an overwrite carry its read history
    /// into the new entry's priority.
    pub fn insert(&mut self, key: Arc<str>, access_count: u64, now: Instant) {
        let freq = access_count.max(1);
        if self.nodes.contains_key(&*key) {
            self.reposition(&key, freq, now);
            return;
        }

        self.buckets.entry(freq).or_default().push_back(key.clone());
        self.nodes.insert(key, LfuNode { freq, last_used: now });
        if self.min_freq == 0 || freq < self.min_freq {
            self.min_freq = freq;
        }
    }

    pub fn remove(&mut self, key: &str) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };
        self.excise_from_bucket(key, node.freq);
    }

    /// Re-ranks a key after a successful read. An unchanged frequency only
    /// refreshes the tie-break timestamp.
    pub fn touch(&mut self, key: &str, access_count: u64, now: Instant) {
        if !self.nodes.contains_key(key) {
            return;
        }
        self.reposition(key, access_count.max(1), now);
    }

    /// Evicts from the minimum-frequency bucket, choosing the key with the
    /// oldest `last_used` among its peers.
    pub fn pop_least(&mut self) -> Option<Arc<str>> {
        if self.min_freq == 0 {
            return None;
        }
        let bucket = self.buckets.get(&self.min_freq)?;

        let mut victim: Option<(Arc<str>, Instant)> = None;
        for key in bucket.iter() {
            let node = self.nodes.get(&**key)?;
            match &victim {
                Some((_, oldest)) if node.last_used >= *oldest => {}
                _ => victim = Some((key.clone(), node.last_used)),
            }
        }

        let (key, _) = victim?;
        let node = self.nodes.remove(&*key)?;
        self.excise_from_bucket(&key, node.freq);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    fn reposition(&mut self, key: &str, new_freq: u64, now: Instant) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let old_freq = node.freq;
        node.last_used = now;
        if old_freq == new_freq {
            return;
        }
        node.freq = new_freq;

        let Some(key_arc) = self.nodes.get_key_value(key).map(|(k, _)| k.clone()) else {
            return;
        };
        if let Some(bucket) = self.buckets.get_mut(&old_freq) {
            bucket.remove(key);
            if bucket.is_empty() {
                self.buckets.remove(&old_freq);
            }
        }
        self.buckets.entry(new_freq).or_default().push_back(key_arc);

        if self.min_freq == old_freq && !self.buckets.contains_key(&old_freq) {
            self.recompute_min_freq();
        }
        if new_freq < self.min_freq {
            self.min_freq = new_freq;
        }
    }

    fn excise_from_bucket(&mut self, key: &str, freq: u64) {
        if let Some(bucket) = self.buckets.get_mut(&freq) {
            bucket.remove(key);
            if bucket.is_empty() {
                self.buckets.remove(&freq);
            }
        }
        if self.min_freq == freq && !self.buckets.contains_key(&freq) {
            self.recompute_min_freq();
        }
    }

    fn recompute_min_freq(&mut self) {
        self.min_freq = self.buckets.keys().copied().min().unwrap_or(0);
    }

    #[cfg(test)]
    pub fn debug_validate_invariants(&self) {
        let bucketed: usize = self.buckets.values().map(|b| b.len()).sum();
        assert_eq!(bucketed, self.nodes.len());

        if self.nodes.is_empty() {
            assert_eq!(self.min_freq, 0);
            return;
        }

        assert!(self.buckets.contains_key(&self.min_freq));
        for (&freq, bucket) in &self.buckets {
            assert!(freq >= self.min_freq);
            assert!(!bucket.is_empty());
            for key in bucket.iter() {
                assert_eq!(self.nodes[&**key].freq, freq);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(index: &mut LfuIndex, key: &str, count: u64) {
        index.insert(Arc::from(key), count, Instant::now());
    }

    #[test]
    fn evicts_lowest_frequency_first() {
        let mut index = LfuIndex::new();
        insert(&mut index, "cold", 0);
        insert(&mut index, "warm", 0);
        insert(&mut index, "hot", 0);

        index.touch("warm", 2, Instant::now());
        index.touch("hot", 2, Instant::now());
        index.touch("hot", 3, Instant::now());

        assert_eq!(index.pop_least().as_deref(), Some("cold"));
        assert_eq!(index.pop_least().as_deref(), Some("warm"));
        assert_eq!(index.pop_least().as_deref(), Some("hot"));
        assert_eq!(index.pop_least(), None);
        index.debug_validate_invariants();
    }

    #[test]
    fn ties_break_by_least_recent_use() {
        let mut index = LfuIndex::new();
        let t0 = Instant::now();
        index.insert(Arc::from("a"), 0, t0);
        index.insert(Arc::from("b"), 0, t0);

        // Same frequency; refresh "a" so "b" is the stalest.
        let t1 = t0 + std::time::Duration::from_millis(5);
        index.touch("a", 1, t1);

        assert_eq!(index.pop_least().as_deref(), Some("b"));
        assert_eq!(index.pop_least().as_deref(), Some("a"));
    }

    #[test]
    fn unchanged_frequency_only_refreshes_timestamp() {
        let mut index = LfuIndex::new();
        insert(&mut index, "a", 0);
        index.touch("a", 1, Instant::now());

        assert_eq!(index.min_freq, 1);
        assert_eq!(index.buckets.len(), 1);
        index.debug_validate_invariants();
    }

    #[test]
    fn insert_preserves_access_history() {
        let mut index = LfuIndex::new();
        // An overwrite re-registers the key with its accumulated count.
        insert(&mut index, "a", 5);
        insert(&mut index, "b", 0);

        assert_eq!(index.pop_least().as_deref(), Some("b"));
        assert_eq!(index.pop_least().as_deref(), Some("a"));
    }

    #[test]
    fn min_freq_recovers_after_removals() {
        let mut index = LfuIndex::new();
        insert(&mut index, "a", 1);
        insert(&mut index, "b", 3);
        insert(&mut index, "c", 7);

        index.remove("a");
        assert_eq!(index.min_freq, 3);
        index.remove("b");
        assert_eq!(index.min_freq, 7);
        index.remove("c");
        assert_eq!(index.min_freq, 0);
        assert_eq!(index.pop_least(), None);
        index.debug_validate_invariants();
    }

    #[test]
    fn remove_missing_key_is_ignored() {
        let mut index = LfuIndex::new();
        insert(&mut index, "a", 0);
        index.remove("missing");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn clear_resets_min_freq() {
        let mut index = LfuIndex::new();
        insert(&mut index, "a", 4);
        index.clear();

        assert_eq!(index.len(), 0);
        assert_eq!(index.min_freq, 0);
        assert_eq!(index.pop_least(), None);
    }
}
