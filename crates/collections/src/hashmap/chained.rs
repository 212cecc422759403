use log::{debug, trace};

use crate::{
    hash::BucketHash,
    linked_list::{self, List, Node},
};

/// Hash table of string pairs resolving collisions by separate chaining.
///
/// Every bucket is a singly-linked [`List`], new entries go to its tail.
/// Like [`OpenTable`](crate::OpenTable), the first value written for a key
/// is the one that stays.
#[derive(Debug)]
pub struct ChainedTable {
    pub(crate) buckets: Vec<List>,
    pub(crate) items: usize,
    /// Buckets currently holding at least one node
    pub(crate) touched: usize,
}

#[derive(Debug)]
pub struct Iter<'a> {
    buckets: std::slice::Iter<'a, List>,
    nodes: Option<linked_list::Iter<'a>>,
}

impl Default for ChainedTable {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl ChainedTable {
    /// Bucket count used when none, or an invalid one, is asked for
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Rehash before an insert once `items / buckets` reaches this
    pub const MAX_LOAD_FACTOR: f64 = 0.75;

    /// Rehash after an insert once `touched / buckets` reaches this
    pub const MAX_TOUCHED_RATIO: f64 = 0.9;

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ChainedTable` with `cap` many buckets.
    /// Less than two buckets falls back to [`Self::DEFAULT_CAPACITY`].
    pub fn with_capacity(cap: usize) -> Self {
        let cap = if cap < 2 { Self::DEFAULT_CAPACITY } else { cap };
        Self {
            buckets: (0..cap).map(|_| List::new()).collect(),
            items: 0,
            touched: 0,
        }
    }

    /// Returns the number of entries in the table
    pub fn len(&self) -> usize {
        self.items
    }

    /// Shorthand for `self.len() == 0`
    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Returns the number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn touched(&self) -> usize {
        self.touched
    }

    pub fn load_factor(&self) -> f64 {
        self.items as f64 / self.bucket_count() as f64
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.node(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.node(key).map(Node::value)
    }

    /// Adds the pair unless `key` is already present.
    /// Returns whether anything was written.
    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        if self.contains_key(key) {
            trace!(target: "insert", "key {key:?} already present");
            return false;
        }

        if self.load_factor() >= Self::MAX_LOAD_FACTOR {
            self.rehash();
        }

        let i = self.idx(key);
        let bucket = &mut self.buckets[i];
        if bucket.is_empty() {
            self.touched += 1;
        }
        bucket.push_back(key, value);
        self.items += 1;

        if self.touched as f64 / self.bucket_count() as f64 >= Self::MAX_TOUCHED_RATIO {
            self.rehash();
        }
        true
    }

    /// Unlinks `key` from its bucket, returning the value it held
    pub fn remove(&mut self, key: &str) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let i = self.idx(key);
        let bucket = &mut self.buckets[i];
        let node = bucket.remove(key)?;
        self.items -= 1;
        if bucket.is_empty() {
            trace!(target: "remove", "bucket {i} is empty again");
            self.touched -= 1;
        }

        Some(node.into_pair().1)
    }

    /// Throws everything away, going back to [`Self::DEFAULT_CAPACITY`] buckets
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // [adapters]

    /// Entries bucket by bucket, each bucket from head to tail
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets.iter(),
            nodes: None,
        }
    }

    // [private]

    fn idx(&self, key: &str) -> usize {
        key.bucket_index(self.bucket_count())
    }

    fn node(&self, key: &str) -> Option<&Node> {
        if self.is_empty() {
            return None;
        }
        self.buckets[self.idx(key)].find(key)
    }

    /// Doubles the bucket count (never below [`Self::DEFAULT_CAPACITY`])
    /// and adds every entry again
    fn rehash(&mut self) {
        let new_cap = (self.bucket_count() * 2).max(Self::DEFAULT_CAPACITY);
        debug!(
            target: "rehash",
            "chained table: {} -> {} buckets, {} live, {} touched",
            self.bucket_count(),
            new_cap,
            self.items,
            self.touched
        );

        let old = std::mem::replace(&mut self.buckets, (0..new_cap).map(|_| List::new()).collect());
        self.items = 0;
        self.touched = 0;

        for node in old.into_iter().flatten() {
            let (k, v) = node.into_pair();
            self.insert(&k, &v);
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.nodes.as_mut().and_then(|nodes| nodes.next()) {
                return Some((node.key(), node.value()));
            }
            self.nodes = Some(self.buckets.next()?.iter());
        }
    }
}

impl<'a> IntoIterator for &'a ChainedTable {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::ChainedTable;

    #[test]
    fn insert() {
        let mut t = ChainedTable::new();

        assert!(t.insert("foo", "bar"));
        assert_eq!(t.len(), 1);

        assert!(!t.insert("foo", "baz"));
        assert_eq!(t.get("foo"), Some("bar"));
        assert_eq!(t.len(), 1);

        t.insert("peti", "is a baby");
        t.insert("sina", "is a tiny baby");

        assert_eq!(t.len(), 3);
        dbg!(t);
    }

    #[test]
    fn grows_from_two_buckets() {
        let mut t = ChainedTable::with_capacity(2);
        assert_eq!(t.bucket_count(), 2);

        t.insert("1", "v1");
        t.insert("2", "v2");
        t.insert("3", "v3");

        assert!(t.bucket_count() > 2);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get("1"), Some("v1"));
        assert_eq!(t.get("2"), Some("v2"));
        assert_eq!(t.get("3"), Some("v3"));
    }

    #[test]
    fn tiny_capacity_falls_back_to_default() {
        assert_eq!(ChainedTable::with_capacity(0).bucket_count(), 10);
        assert_eq!(ChainedTable::with_capacity(1).bucket_count(), 10);
        assert_eq!(ChainedTable::with_capacity(2).bucket_count(), 2);
    }

    #[test]
    fn load_factor_checked_before_insert() {
        let mut t = ChainedTable::with_capacity(4);
        // "a" = 97: 97 % 3 + 1 = 2 -> 3, "d" = 100: 100 % 3 + 1 = 2 -> 3
        // so everything chains into bucket 3 and only the load factor grows the table
        for k in ["a", "d", "g"] {
            t.insert(k, k);
        }
        assert_eq!(t.bucket_count(), 4);
        assert_eq!(t.touched(), 1);

        // 3 / 4 >= 0.75 before this one goes in
        t.insert("j", "j");
        assert_eq!(t.bucket_count(), 10);
        assert_eq!(t.len(), 4);
        for k in ["a", "d", "g", "j"] {
            assert_eq!(t.get(k), Some(k));
        }
    }

    #[test]
    fn remove() {
        let mut t = ChainedTable::new();
        t.insert("a", "1");
        t.insert("b", "2");

        assert_eq!(t.remove("a").as_deref(), Some("1"));
        assert!(!t.contains_key("a"));
        assert_eq!(t.len(), 1);
        assert_eq!(t.touched(), 1);

        assert_eq!(t.remove("a"), None);
        assert_eq!(t.remove("zzz"), None);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("b"), Some("2"));
    }

    #[test]
    fn remove_from_shared_bucket() {
        let mut t = ChainedTable::with_capacity(4);
        t.insert("a", "1");
        t.insert("d", "2");
        t.insert("g", "3");
        assert_eq!(t.touched(), 1);

        // head, then tail, then the last one empties the bucket
        assert_eq!(t.remove("a").as_deref(), Some("1"));
        assert_eq!(t.get("d"), Some("2"));
        assert_eq!(t.remove("g").as_deref(), Some("3"));
        assert_eq!(t.touched(), 1);
        assert_eq!(t.remove("d").as_deref(), Some("2"));
        assert_eq!(t.touched(), 0);
        assert!(t.is_empty());
    }

    #[test]
    fn tabs_and_empty_strings() {
        let mut t = ChainedTable::new();
        t.insert("key\twith tab", "value\twith tab");
        t.insert("", "empty key");
        t.insert("emptyval", "");

        assert_eq!(t.get("key\twith tab"), Some("value\twith tab"));
        assert_eq!(t.get(""), Some("empty key"));
        assert_eq!(t.get("emptyval"), Some(""));
    }

    #[test]
    fn many() {
        let mut t = ChainedTable::with_capacity(2);

        let pairs: Vec<(String, String)> = (0..500)
            .map(|i| (format!("{i}"), format!("value {i}")))
            .collect();

        for (k, v) in &pairs {
            t.insert(k, v);
        }

        assert_eq!(t.len(), 500);
        assert!(t.load_factor() < 1.0);
        for (k, v) in &pairs {
            assert_eq!(t.get(k), Some(v.as_str()));
        }
        assert_eq!(t.iter().count(), 500);
    }

    #[test]
    fn iter() {
        let mut h = ChainedTable::new();
        assert_eq!(h.iter().next(), None);

        for i in 0..32 {
            h.insert(&format!("{i}"), "");
        }

        let mut keys: Vec<u32> = h.iter().map(|(k, _)| k.parse().unwrap()).collect();
        keys.sort();
        assert_eq!(keys, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn clear() {
        let mut t = ChainedTable::with_capacity(2);
        for i in 0..40 {
            t.insert(&i.to_string(), "x");
        }
        t.clear();

        assert!(t.is_empty());
        assert_eq!(t.bucket_count(), ChainedTable::DEFAULT_CAPACITY);
        assert_eq!(t.get("1"), None);
    }

    #[test]
    fn rust_doc_example() {
        let mut book_reviews = ChainedTable::new();

        // Review some books.
        book_reviews.insert("Adventures of Huckleberry Finn", "My favorite book.");
        book_reviews.insert("Grimms' Fairy Tales", "Masterpiece.");
        book_reviews.insert("Pride and Prejudice", "Very enjoyable.");
        book_reviews.insert("The Adventures of Sherlock Holmes", "Eye lyked it alot.");

        assert!(!book_reviews.contains_key("Les Misérables"));

        // oops, this review has a lot of spelling mistakes, let's delete it.
        book_reviews.remove("The Adventures of Sherlock Holmes");
        assert_eq!(book_reviews.len(), 3);

        let to_find = ["Pride and Prejudice", "Alice's Adventure in Wonderland"];
        assert_eq!(book_reviews.get(to_find[0]), Some("Very enjoyable."));
        assert_eq!(book_reviews.get(to_find[1]), None);

        for (book, review) in &book_reviews {
            println!("{book}: \"{review}\"");
        }
    }
}
