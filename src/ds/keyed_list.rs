use std::sync::Arc;

use rustc_hash::FxHashMap;

#[derive(Debug)]
struct Slot {
    key: Arc<str>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked list of string keys with O(1) lookup by key.
///
/// Slots live in a slab so links are plain indexes instead of pointers;
/// freed slots are recycled through a free list. The front of the list is
/// whatever the caller decides to push there: the LRU index treats the front
/// as most-recently-used, the FIFO index pushes to the back and pops the
/// front, and each LFU frequency bucket keeps arrival order.
#[derive(Debug, Default)]
pub(crate) struct KeyedList {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    index: FxHashMap<Arc<str>, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl KeyedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Inserts `key` at the front. Returns `false` if the key is already
    /// present (the list is left unchanged).
    pub fn push_front(&mut self, key: Arc<str>) -> bool {
        if self.index.contains_key(&*key) {
            return false;
        }
        let idx = self.alloc(key.clone());
        self.index.insert(key, idx);
        self.attach_front(idx);
        true
    }

    /// Inserts `key` at the back. Returns `false` if the key is already
    /// present (the list is left unchanged).
    pub fn push_back(&mut self, key: Arc<str>) -> bool {
        if self.index.contains_key(&*key) {
            return false;
        }
        let idx = self.alloc(key.clone());
        self.index.insert(key, idx);
        self.attach_back(idx);
        true
    }

    /// Moves an existing key to the front. Returns `false` if absent.
    pub fn move_to_front(&mut self, key: &str) -> bool {
        let Some(&idx) = self.index.get(key) else {
            return false;
        };
        self.detach(idx);
        self.attach_front(idx);
        true
    }

    /// Unlinks a key from the list. Returns `false` if absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(idx) = self.index.remove(key) else {
            return false;
        };
        self.detach(idx);
        self.release(idx);
        true
    }

    pub fn pop_front(&mut self) -> Option<Arc<str>> {
        let idx = self.head?;
        self.detach(idx);
        let key = self.release(idx)?;
        self.index.remove(&*key);
        Some(key)
    }

    pub fn pop_back(&mut self) -> Option<Arc<str>> {
        let idx = self.tail?;
        self.detach(idx);
        let key = self.release(idx)?;
        self.index.remove(&*key);
        Some(key)
    }

    /// Front-to-back key iteration.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    fn alloc(&mut self, key: Arc<str>) -> usize {
        let slot = Slot {
            key,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<Arc<str>> {
        let slot = self.slots[idx].take()?;
        self.free.push(idx);
        Some(slot.key)
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = match self.slots[idx].as_ref() {
            Some(slot) => (slot.prev, slot.next),
            None => return,
        };
        match prev {
            Some(p) => {
                if let Some(slot) = self.slots[p].as_mut() {
                    slot.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(slot) = self.slots[n].as_mut() {
                    slot.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = None;
            slot.next = None;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = None;
            slot.next = old_head;
        }
        match old_head {
            Some(h) => {
                if let Some(slot) = self.slots[h].as_mut() {
                    slot.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn attach_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = old_tail;
            slot.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(slot) = self.slots[t].as_mut() {
                    slot.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    #[cfg(test)]
    pub fn debug_validate_invariants(&self) {
        if self.index.is_empty() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            return;
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(idx) = current {
            let slot = self.slots[idx].as_ref().expect("linked slot must be live");
            assert_eq!(slot.prev, prev);
            assert_eq!(self.index.get(&*slot.key), Some(&idx));
            count += 1;
            assert!(count <= self.index.len(), "cycle in list");
            prev = current;
            current = slot.next;
        }
        assert_eq!(self.tail, prev);
        assert_eq!(count, self.index.len());
    }
}

pub(crate) struct Iter<'a> {
    list: &'a KeyedList,
    next: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Arc<str>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let slot = self.list.slots[idx].as_ref()?;
        self.next = slot.next;
        Some(&slot.key)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        PushFront(u8),
        PushBack(u8),
        MoveToFront(u8),
        Remove(u8),
        PopFront,
        PopBack,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u8>().prop_map(Op::PushFront),
            any::<u8>().prop_map(Op::PushBack),
            any::<u8>().prop_map(Op::MoveToFront),
            any::<u8>().prop_map(Op::Remove),
            Just(Op::PopFront),
            Just(Op::PopBack),
        ]
    }

    proptest! {
        /// Property: the list agrees with a naive Vec model after any op mix.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut list = KeyedList::new();
            let mut model: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    Op::PushFront(n) => {
                        let k = format!("k{n}");
                        let inserted = list.push_front(Arc::from(&*k));
                        if !model.contains(&k) {
                            prop_assert!(inserted);
                            model.insert(0, k);
                        } else {
                            prop_assert!(!inserted);
                        }
                    }
                    Op::PushBack(n) => {
                        let k = format!("k{n}");
                        let inserted = list.push_back(Arc::from(&*k));
                        if !model.contains(&k) {
                            prop_assert!(inserted);
                            model.push(k);
                        } else {
                            prop_assert!(!inserted);
                        }
                    }
                    Op::MoveToFront(n) => {
                        let k = format!("k{n}");
                        let moved = list.move_to_front(&k);
                        if let Some(pos) = model.iter().position(|m| *m == k) {
                            prop_assert!(moved);
                            let k = model.remove(pos);
                            model.insert(0, k);
                        } else {
                            prop_assert!(!moved);
                        }
                    }
                    Op::Remove(n) => {
                        let k = format!("k{n}");
                        let removed = list.remove(&k);
                        if let Some(pos) = model.iter().position(|m| *m == k) {
                            prop_assert!(removed);
                            model.remove(pos);
                        } else {
                            prop_assert!(!removed);
                        }
                    }
                    Op::PopFront => {
                        let popped = list.pop_front();
                        if model.is_empty() {
                            prop_assert!(popped.is_none());
                        } else {
                            let expected = model.remove(0);
                            prop_assert_eq!(popped.as_deref(), Some(expected.as_str()));
                        }
                    }
                    Op::PopBack => {
                        let popped = list.pop_back();
                        if model.is_empty() {
                            prop_assert!(popped.is_none());
                        } else {
                            let expected = model.pop();
                            prop_assert_eq!(popped.as_deref(), expected.as_deref());
                        }
                    }
                }

                list.debug_validate_invariants();
                let observed: Vec<String> = list.iter().map(|k| k.to_string()).collect();
                prop_assert_eq!(&observed, &model);
            }
        }
    }
}
