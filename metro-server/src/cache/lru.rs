//! Fixed-capacity least-recently-used map.
//!
//! Entries live in a slab of nodes threaded onto a doubly linked recency
//! list (most recent at the head). A hash map points from key to slab
//! slot, so lookups, promotions, inserts and evictions are all O(1).

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Null link in the recency list.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Least-recently-used cache holding at most `capacity` entries.
///
/// Eviction only ever happens inside [`LruCache::put`], which hands the
/// evicted entry back so the caller can release it.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: NonZeroUsize,
    index: HashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create an empty cache.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            index: HashMap::with_capacity(capacity.get()),
            slots: Vec::with_capacity(capacity.get()),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }

    /// Look up a key, marking it most recently used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.promote(slot);
        self.slots[slot].as_ref().map(|node| &node.value)
    }

    /// Look up a key without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_ref().map(|node| &node.value)
    }

    /// Check for a key without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite a key, making it most recently used.
    ///
    /// Returns the least recently used entry if the insert pushed the
    /// cache over capacity. Overwriting an existing key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.index.get(&key) {
            if let Some(node) = self.slots[slot].as_mut() {
                node.value = value;
            }
            self.promote(slot);
            return None;
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot);
        self.push_front(slot);

        if self.index.len() > self.capacity.get() {
            self.pop_back()
        } else {
            None
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.unlink(slot);
        self.free.push(slot);
        self.slots[slot].take().map(|node| node.value)
    }

    /// Remove every entry, returning them most recently used first.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        let mut drained = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while cursor != NIL {
            match self.slots[cursor].take() {
                Some(node) => {
                    cursor = node.next;
                    drained.push((node.key, node.value));
                }
                None => break,
            }
        }

        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        drained
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.drain();
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(node) = self.slots.get(cursor).and_then(Option::as_ref) {
            keys.push(&node.key);
            cursor = node.next;
        }
        keys
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    fn links(&self, slot: usize) -> (usize, usize) {
        self.slots[slot]
            .as_ref()
            .map_or((NIL, NIL), |node| (node.prev, node.next))
    }

    fn set_prev(&mut self, slot: usize, prev: usize) {
        if let Some(node) = self.slots[slot].as_mut() {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, slot: usize, next: usize) {
        if let Some(node) = self.slots[slot].as_mut() {
            node.next = next;
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = self.links(slot);

        if prev == NIL {
            self.head = next;
        } else {
            self.set_next(prev, next);
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.set_prev(next, prev);
        }

        self.set_prev(slot, NIL);
        self.set_next(slot, NIL);
    }

    fn push_front(&mut self, slot: usize) {
        self.set_prev(slot, NIL);
        self.set_next(slot, self.head);

        if self.head != NIL {
            self.set_prev(self.head, slot);
        }
        self.head = slot;

        if self.tail == NIL {
            self.tail = slot;
        }
    }

    fn promote(&mut self, slot: usize) {
        if self.head != slot {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    fn pop_back(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }

        let slot = self.tail;
        self.unlink(slot);
        self.free.push(slot);
        let node = self.slots[slot].take()?;
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Get(u8),
        Put(u8, u32),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Get),
            (0u8..8, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
            (0u8..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        /// The cache agrees with a naive model that keeps keys in a Vec
        /// ordered from most to least recently used.
        #[test]
        fn behaves_like_model(capacity in 1usize..5, ops in proptest::collection::vec(op(), 0..64)) {
            let mut lru = LruCache::new(NonZeroUsize::new(capacity).unwrap());
            let mut model: Vec<(u8, u32)> = Vec::new();

            for op in ops {
                match op {
                    Op::Get(k) => {
                        let expected = model.iter().position(|(mk, _)| *mk == k).map(|i| {
                            let entry = model.remove(i);
                            model.insert(0, entry);
                            entry.1
                        });
                        prop_assert_eq!(lru.get(&k).copied(), expected);
                    }
                    Op::Put(k, v) => {
                        let mut expected = None;
                        if let Some(i) = model.iter().position(|(mk, _)| *mk == k) {
                            model.remove(i);
                        } else if model.len() == capacity {
                            expected = model.pop();
                        }
                        model.insert(0, (k, v));
                        prop_assert_eq!(lru.put(k, v), expected);
                    }
                    Op::Remove(k) => {
                        let expected = model
                            .iter()
                            .position(|(mk, _)| *mk == k)
                            .map(|i| model.remove(i).1);
                        prop_assert_eq!(lru.remove(&k), expected);
                    }
                }

                prop_assert!(lru.len() <= capacity);
                let keys: Vec<u8> = lru.keys().into_iter().copied().collect();
                let model_keys: Vec<u8> = model.iter().map(|(k, _)| *k).collect();
                prop_assert_eq!(keys, model_keys);
            }
        }
    }
}
