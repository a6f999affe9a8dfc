use std::sync::Arc;

use crate::ds::KeyedList;

/// First-in-first-out ordering: oldest insertion at the head.
///
/// Reads never reorder, and overwriting an existing key keeps its original
/// queue position. A key only re-enters the queue after it has been removed.
#[derive(Debug, Default)]
pub(crate) struct FifoIndex {
    list: KeyedList,
}

impl FifoIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn insert(&mut self, key: Arc<str>) {
        // Re-inserting an existing key leaves its queue position alone.
        self.list.push_back(key);
    }

    pub fn remove(&mut self, key: &str) {
        self.list.remove(key);
    }

    pub fn touch(&mut self, _key: &str) {
        // FIFO ignores reads.
    }

    pub fn pop_least(&mut self) -> Option<Arc<str>> {
        self.list.pop_front()
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }
}
