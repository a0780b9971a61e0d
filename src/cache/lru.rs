//! LRU List Module
//!
//! Recency ordering for cache eviction, stored as an index-linked list in a
//! growable arena.

use std::mem;

/// Arena slot of the head sentinel (most recently used side).
const HEAD: usize = 0;
/// Arena slot of the tail sentinel (least recently used side).
const TAIL: usize = 1;

#[derive(Debug)]
struct Node<V> {
    key: String,
    /// `None` for sentinels and free slots
    value: Option<V>,
    prev: usize,
    next: usize,
}

impl<V> Node<V> {
    fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            key: String::new(),
            value: None,
            prev,
            next,
        }
    }
}

// == LRU List ==
/// Doubly linked list of `(key, value)` nodes ordered by recency.
///
/// Nodes live in a `Vec` and link to each other by index. Two sentinel
/// nodes bound the list:
/// - `HEAD.next` = Most recently used
/// - `TAIL.prev` = Least recently used
///
/// Removed slots go on a free list and are reused by later inserts, so the
/// handle returned by [`LruList::push_front`] stays valid until that node
/// is removed.
#[derive(Debug)]
pub struct LruList<V> {
    nodes: Vec<Node<V>>,
    free: Vec<usize>,
    len: usize,
}

impl<V> Default for LruList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LruList<V> {
    // == Constructor ==
    /// Creates an empty list containing only the sentinels.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel(HEAD, TAIL), Node::sentinel(HEAD, TAIL)],
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a node at the most-recently-used position and returns its handle.
    pub fn push_front(&mut self, key: String, value: V) -> usize {
        let node = Node {
            key,
            value: Some(value),
            prev: HEAD,
            next: HEAD,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks a node as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if !self.is_live(idx) || self.nodes[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks a node and returns its key and value.
    ///
    /// Returns None for sentinels and already-freed handles.
    pub fn remove(&mut self, idx: usize) -> Option<(String, V)> {
        if !self.is_live(idx) {
            return None;
        }

        self.unlink(idx);
        let node = &mut self.nodes[idx];
        let value = node.value.take()?;
        let key = mem::take(&mut node.key);

        self.free.push(idx);
        self.len -= 1;
        Some((key, value))
    }

    // == Back ==
    /// Handle of the least recently used node, None if the list is empty.
    pub fn back(&self) -> Option<usize> {
        let idx = self.nodes[TAIL].prev;
        (idx != HEAD).then_some(idx)
    }

    /// Handle of the most recently used node, None if the list is empty.
    pub fn front(&self) -> Option<usize> {
        let idx = self.nodes[HEAD].next;
        (idx != TAIL).then_some(idx)
    }

    pub fn get(&self, idx: usize) -> Option<&V> {
        self.nodes.get(idx).and_then(|n| n.value.as_ref())
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut V> {
        self.nodes.get_mut(idx).and_then(|n| n.value.as_mut())
    }

    pub fn key(&self, idx: usize) -> Option<&str> {
        self.get(idx)?;
        Some(self.nodes[idx].key.as_str())
    }

    /// Walks the list from most to least recently used.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            nodes: &self.nodes,
            current: self.nodes[HEAD].next,
            remaining: self.len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every node and resets the sentinels to an empty list.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[HEAD].prev = HEAD;
        self.nodes[TAIL].prev = HEAD;
        self.nodes[TAIL].next = TAIL;
        self.free.clear();
        self.len = 0;
    }

    // --- Internal link surgery ---

    fn is_live(&self, idx: usize) -> bool {
        idx > TAIL && self.nodes.get(idx).is_some_and(|n| n.value.is_some())
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = idx;
        self.nodes[idx].next = idx;
    }
}

// == Iterator ==
/// Iterator from most recently used to least recently used.
pub struct Iter<'a, V> {
    nodes: &'a [Node<V>],
    current: usize,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == TAIL || self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.current];
        self.current = node.next;
        self.remaining -= 1;
        node.value.as_ref().map(|v| (node.key.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
