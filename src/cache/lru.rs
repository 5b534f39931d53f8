//! LRU Cache Module
//!
//! Byte-budgeted least-recently-used cache. Not synchronized: callers wrap it
//! in a lock (see [`Group`](crate::group::Group)).
//!
//! Entries live in a slot arena. Recency order is a doubly-linked list of
//! slot indices and the key index maps each key to its slot, so lookup,
//! promotion and eviction are all O(1). Freed slots are recycled.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::cache::{CacheEntry, Capacity, Value};

/// Callback fired with each entry the cache evicts.
///
/// Runs while the owner's lock is held and must not call back into the cache.
pub type OnEvict<V> = Box<dyn FnMut(&str, &V) + Send>;

// == Link ==
/// Neighbours of a slot in recency order.
#[derive(Debug, Clone, Copy, Default)]
struct Link {
    /// Towards the most recently used end
    prev: Option<usize>,
    /// Towards the least recently used end
    next: Option<usize>,
}

// == LRU Cache ==
/// Least recently used cache bounded by the bytes of its keys and values.
///
/// Order is kept as:
/// - Head = Most recently used
/// - Tail = Least recently used
pub struct LruCache<V> {
    /// Byte budget
    capacity: Capacity,
    /// Sum of `CacheEntry::size` over live entries
    used_bytes: usize,
    /// Slot arena, `None` marks a free slot
    entries: Vec<Option<CacheEntry<V>>>,
    /// Recency links, parallel to `entries`
    links: Vec<Link>,
    /// Free slot indices ready for reuse
    free: Vec<usize>,
    /// Key to slot index
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    /// Entries removed by the budget so far
    evictions: u64,
    on_evict: Option<OnEvict<V>>,
}

impl<V: Value> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            used_bytes: 0,
            entries: Vec::new(),
            links: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            evictions: 0,
            on_evict: None,
        }
    }

    /// Creates an empty cache that reports every eviction to `on_evict`.
    pub fn with_on_evict(capacity: Capacity, on_evict: OnEvict<V>) -> Self {
        let mut cache = Self::new(capacity);
        cache.on_evict = Some(on_evict);
        cache
    }

    // == Get ==
    /// Looks up a key and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.entries[idx].as_ref().map(|entry| &entry.value)
    }

    // == Peek ==
    /// Looks up a key without touching recency order.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.entries[idx].as_ref().map(|entry| &entry.value)
    }

    // == Add ==
    /// Inserts or replaces a value and marks it most recently used.
    ///
    /// Afterwards, least recently used entries are evicted until the cache
    /// fits its budget again. An entry larger than the whole budget is
    /// evicted right away, since by then it is the only entry left.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            // Overwrite: only the value size changes
            if let Some(entry) = self.entries[idx].as_mut() {
                let old_len = entry.value.byte_len();
                entry.value = value;
                self.used_bytes = self.used_bytes - old_len + entry.value.byte_len();
            }
            self.move_to_front(idx);
        } else {
            let entry = CacheEntry::new(key.clone(), value);
            self.used_bytes += entry.size();
            let idx = self.alloc(entry);
            self.push_front(idx);
            self.index.insert(key, idx);
        }

        while self.capacity.is_exceeded_by(self.used_bytes) {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry.
    ///
    /// Returns `false` when the cache is empty.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(idx) = self.tail else {
            return false;
        };
        let Some(entry) = self.release(idx) else {
            return false;
        };

        self.evictions += 1;
        debug!("Evicted {} ({} bytes)", entry.key, entry.size());

        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(&entry.key, &entry.value);
        }
        true
    }

    // == Remove ==
    /// Removes a key outright. This is not an eviction: no callback fires.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = *self.index.get(key)?;
        self.release(idx).map(|entry| entry.value)
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Number of entries evicted to respect the budget.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    // == Keys ==
    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::successors(self.head, move |&idx| self.links[idx].next)
            .filter_map(move |idx| self.entries[idx].as_ref().map(|entry| entry.key.as_str()))
    }

    // == Arena Helpers ==
    fn alloc(&mut self, entry: CacheEntry<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.entries[idx] = Some(entry);
                self.links[idx] = Link::default();
                idx
            }
            None => {
                self.entries.push(Some(entry));
                self.links.push(Link::default());
                self.entries.len() - 1
            }
        }
    }

    /// Unlinks a slot, frees it and drops its key from the index.
    fn release(&mut self, idx: usize) -> Option<CacheEntry<V>> {
        self.detach(idx);
        let entry = self.entries[idx].take()?;
        self.free.push(idx);
        self.index.remove(&entry.key);
        self.used_bytes -= entry.size();
        Some(entry)
    }

    fn detach(&mut self, idx: usize) {
        let Link { prev, next } = self.links[idx];
        match prev {
            Some(p) => self.links[p].next = next,
            None if self.head == Some(idx) => self.head = next,
            None => {}
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None if self.tail == Some(idx) => self.tail = prev,
            None => {}
        }
        self.links[idx] = Link::default();
    }

    fn push_front(&mut self, idx: usize) {
        self.links[idx] = Link {
            prev: None,
            next: self.head,
        };
        match self.head {
            Some(h) => self.links[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.detach(idx);
            self.push_front(idx);
        }
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.index.len())
            .field("evictions", &self.evictions)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
