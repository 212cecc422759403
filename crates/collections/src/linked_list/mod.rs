//! Singly-linked list used as the bucket of a [`ChainedTable`](crate::ChainedTable).
//!
//! Every node owns its key and value as two separate strings, so neither
//! of them is restricted in what characters it may contain.

use crate::node;

pub struct List {
    head: Option<Box<Node>>,
    len: usize,
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl List {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// A bucket is empty iff it has no head
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Appends a new node at the tail of the list
    pub fn push_back<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.push_boxed(node!(boxed key, value));
    }

    fn push_boxed(&mut self, boxed: Box<Node>) {
        let mut tail = &mut self.head;
        while let Some(node) = tail {
            tail = &mut node.next;
        }
        *tail = Some(boxed);
        self.len += 1;
    }

    /// Removes the node at the front of the list
    #[inline]
    pub fn pop(&mut self) -> Option<Node> {
        self.head.take().map(|mut node| {
            self.head = node.next.take();
            self.len -= 1;
            *node
        })
    }

    pub fn peek(&self) -> Option<&Node> {
        self.head.as_deref()
    }

    /// Returns the first node whose key is `key`
    pub fn find(&self, key: &str) -> Option<&Node> {
        self.iter().find(|n| n.key == key)
    }

    /// Unlinks the first node whose key is `key` and hands it back.
    /// If it was the head, the head moves on to its successor.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let mut cur = &mut self.head;
        while cur.as_ref().is_some_and(|n| n.key != key) {
            cur = &mut cur.as_mut()?.next;
        }

        let mut removed = cur.take()?;
        *cur = removed.next.take();
        self.len -= 1;
        Some(*removed)
    }

    // [adapters]

    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }
}

impl Drop for List {
    fn drop(&mut self) {
        let mut curr = self.head.take();
        while let Some(mut node) = curr {
            curr = node.next.take();
        }
    }
}

impl std::fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl IntoIterator for List {
    type Item = <IterOwn as Iterator>::Item;
    type IntoIter = IterOwn;

    fn into_iter(self) -> Self::IntoIter {
        IterOwn(self)
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Node;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Node {
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) next: Option<Box<Node>>,
}

impl Node {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Splits the node into its key and value, dropping the link
    pub fn into_pair(self) -> (String, String) {
        (self.key, self.value)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}
impl Eq for Node {}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{:?}, {:?}>", self.key, self.value)
    }
}

// [iterators]

#[derive(Debug)]
pub struct Iter<'a> {
    current: Option<&'a Node>,
    left: usize,
}

impl<'a> Iter<'a> {
    fn new(list: &'a List) -> Self {
        Self {
            current: list.head.as_deref(),
            left: list.len,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current.take()?;
        self.current = node.next.as_deref();
        self.left = self.left.saturating_sub(1);
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

pub struct IterOwn(List);

impl Iterator for IterOwn {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}
