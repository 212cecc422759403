use log::{debug, trace};

use crate::hash::BucketHash;

/// One position of the backing array
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot<K, V> {
    /// Never held an entry since the last rehash, ends a probe
    Empty,
    /// Held an entry that got erased, probes continue past it
    Deleted,
    Occupied(K, V),
}

/// Hash table resolving collisions by linear probing.
///
/// An inserted key keeps its first value, inserting it again is a no-op.
/// Erased slots are left as tombstones which are only cleaned up when the
/// table gets rehashed.
#[derive(Debug, Clone)]
pub struct OpenTable<K, V> {
    pub(crate) slots: Vec<Slot<K, V>>,
    pub(crate) items: usize,
    /// Slots that held an entry at some point since the last rehash
    pub(crate) touched: usize,
}

#[derive(Debug)]
pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Slot<K, V>>,
}

impl<K, V> Default for OpenTable<K, V> {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl<K, V> OpenTable<K, V> {
    /// Capacity used when none, or an invalid one, is asked for
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Rehash once `items / capacity` goes above this
    pub const MAX_LOAD_FACTOR: f64 = 0.75;

    /// Rehash once `touched / capacity` reaches this
    pub const MAX_TOUCHED_RATIO: f64 = 0.9;

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with `cap` slots, a `cap` of 0 falls back to
    /// [`Self::DEFAULT_CAPACITY`]
    pub fn with_capacity(cap: usize) -> Self {
        let cap = if cap == 0 { Self::DEFAULT_CAPACITY } else { cap };
        Self {
            slots: (0..cap).map(|_| Slot::Empty).collect(),
            items: 0,
            touched: 0,
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.items
    }

    /// Shorthand for `self.len() == 0`
    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Length of the backing array
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn touched(&self) -> usize {
        self.touched
    }

    pub fn load_factor(&self) -> f64 {
        self.items as f64 / self.capacity() as f64
    }

    /// Key stored at position `i` of the backing array,
    /// `None` if that slot is free or `i` is out of range
    pub fn get_key(&self, i: usize) -> Option<&K> {
        match self.slots.get(i)? {
            Slot::Occupied(k, _) => Some(k),
            _ => None,
        }
    }

    /// Drops every entry and goes back to [`Self::DEFAULT_CAPACITY`]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Live entries in backing array order
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    fn over_loaded(&self) -> bool {
        let cap = self.capacity() as f64;
        self.items as f64 / cap > Self::MAX_LOAD_FACTOR
            || self.touched as f64 / cap >= Self::MAX_TOUCHED_RATIO
    }
}

impl<K: BucketHash + Eq, V> OpenTable<K, V> {
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.slots[self.position(key)?] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let i = self.position(key)?;
        match &mut self.slots[i] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    /// Inserts `key` unless it is already present, in which case the
    /// stored value is kept and `false` is returned.
    ///
    /// May rehash the whole table, either because probing found no free
    /// slot or because the table got too dense after the write.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.contains_key(&key) {
            trace!(target: "insert", "key already present, keeping first value");
            return false;
        }

        let i = loop {
            match self.free_slot(&key) {
                Some(i) => break i,
                None => {
                    trace!(target: "insert", "no free slot among {}, growing", self.capacity());
                    self.rehash();
                }
            }
        };

        if matches!(self.slots[i], Slot::Empty) {
            self.touched += 1;
        }
        self.slots[i] = Slot::Occupied(key, value);
        self.items += 1;

        if self.over_loaded() {
            self.rehash();
        }
        true
    }

    /// Erases `key`, leaving a tombstone behind.
    /// Returns the value it held, `None` if it was not present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let i = self.position(key)?;
        match std::mem::replace(&mut self.slots[i], Slot::Deleted) {
            Slot::Occupied(_, v) => {
                self.items -= 1;
                Some(v)
            }
            // position() only returns occupied slots
            other => {
                self.slots[i] = other;
                None
            }
        }
    }

    // [private]

    fn home(&self, key: &K) -> usize {
        key.bucket_index(self.capacity()) % self.capacity()
    }

    /// Walks the probe sequence of `key` until it is found, an empty slot
    /// is hit, or every slot has been visited
    fn position(&self, key: &K) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        let cap = self.capacity();
        let start = self.home(key);
        let mut i = start;
        loop {
            match &self.slots[i] {
                Slot::Empty => return None,
                Slot::Occupied(k, _) if k == key => return Some(i),
                _ => {}
            }
            i = (i + 1) % cap;
            if i == start {
                return None;
            }
        }
    }

    /// First empty or deleted slot on the probe sequence of `key`
    fn free_slot(&self, key: &K) -> Option<usize> {
        let cap = self.capacity();
        let start = self.home(key);
        let mut i = start;
        loop {
            if !matches!(self.slots[i], Slot::Occupied(..)) {
                return Some(i);
            }
            i = (i + 1) % cap;
            if i == start {
                return None;
            }
        }
    }

    /// Doubles the backing array and reinserts every live entry,
    /// dropping all tombstones on the way
    fn rehash(&mut self) {
        let new_cap = (self.capacity() * 2).max(1);
        debug!(
            target: "rehash",
            "open table: {} -> {} slots, {} live, {} touched",
            self.capacity(),
            new_cap,
            self.items,
            self.touched
        );

        let old = std::mem::replace(&mut self.slots, (0..new_cap).map(|_| Slot::Empty).collect());
        self.items = 0;
        self.touched = 0;

        for slot in old {
            if let Slot::Occupied(k, v) = slot {
                self.insert(k, v);
            }
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(|slot| match slot {
            Slot::Occupied(k, v) => Some((k, v)),
            _ => None,
        })
    }
}

impl<'a, K, V> IntoIterator for &'a OpenTable<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
