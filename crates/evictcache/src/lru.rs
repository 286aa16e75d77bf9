//! LRU (Least Recently Used) eviction policy
//!
//! Keys live in an arena-backed doubly-linked list, most recent at the head.
//! The index map gives O(1) access to any node, so touch, insert and evict
//! are all O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;

use crate::policy::{EvictionPolicy, PolicyKind, SlotId};

/// Node in the LRU doubly-linked list
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Recency ordering over tracked keys
pub struct LruPolicy<K> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
}

impl<K> LruPolicy<K>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty LRU policy
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty LRU policy with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
        }
    }

    /// Tracked keys, most recently used first
    pub fn keys_by_recency(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.map.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            match &self.nodes[idx] {
                Some(node) => {
                    keys.push(node.key.clone());
                    cursor = node.next;
                }
                None => break,
            }
        }
        keys
    }

    fn push_front(&mut self, idx: usize) {
        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = self.head;
        }

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);
        self.push_front(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    /// Unlink and release a slot, returning its key.
    ///
    /// The node must be unlinked while still present so its neighbours
    /// can be relinked.
    fn release(&mut self, idx: usize) -> Option<K> {
        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.free_list.push(idx);
        Some(node.key)
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }
}

impl<K> Default for LruPolicy<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Hash + Eq + Clone,
{
    fn insert(&mut self, key: K) -> SlotId {
        assert!(
            !self.map.contains_key(&key),
            "LRU policy: insert of an already tracked key"
        );

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            prev: None,
            next: None,
        });
        self.push_front(idx);
        self.map.insert(key, idx);
        SlotId(idx)
    }

    fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get(key) {
            Some(&idx) => {
                self.move_to_front(idx);
                true
            }
            None => false,
        }
    }

    fn evict(&mut self) -> Option<K> {
        let tail_idx = self.tail?;
        let key = self.release(tail_idx)?;
        self.map.remove(&key);
        Some(key)
    }

    fn peek_victim(&self) -> Option<&K> {
        let tail_idx = self.tail?;
        self.nodes[tail_idx].as_ref().map(|node| &node.key)
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.remove(key) {
            Some(idx) => self.release(idx).is_some(),
            None => false,
        }
    }

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    fn slot<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).copied().map(SlotId)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Lru
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[u32]) -> LruPolicy<u32> {
        let mut policy = LruPolicy::new();
        for &k in keys {
            policy.insert(k);
        }
        policy
    }

    #[test]
    fn test_lru_evicts_oldest_insert() {
        let mut policy = filled(&[1, 2, 3]);

        assert_eq!(policy.evict(), Some(1));
        assert_eq!(policy.evict(), Some(2));
        assert_eq!(policy.evict(), Some(3));
        assert_eq!(policy.evict(), None);
        assert!(policy.is_empty());
    }

    #[test]
    fn test_lru_touch_moves_to_front() {
        let mut policy = filled(&[1, 2, 3]);

        assert!(policy.touch(&1));
        assert_eq!(policy.keys_by_recency(), vec![1, 3, 2]);
        assert_eq!(policy.peek_victim(), Some(&2));
    }

    #[test]
    fn test_lru_touch_head_is_noop() {
        let mut policy = filled(&[1, 2]);

        assert!(policy.touch(&2));
        assert_eq!(policy.keys_by_recency(), vec![2, 1]);
    }

    #[test]
    fn test_lru_touch_untracked() {
        let mut policy = filled(&[1]);
        assert!(!policy.touch(&9));
    }

    #[test]
    #[should_panic(expected = "already tracked")]
    fn test_lru_double_insert_panics() {
        let mut policy = filled(&[1]);
        policy.insert(1);
    }

    #[test]
    fn test_lru_evict_relinks_tail() {
        let mut policy = filled(&[1, 2, 3]);

        assert_eq!(policy.evict(), Some(1));
        // The new tail must be 2 and its back link cleared
        assert_eq!(policy.peek_victim(), Some(&2));
        policy.insert(4);
        assert_eq!(policy.keys_by_recency(), vec![4, 3, 2]);
    }

    #[test]
    fn test_lru_remove_middle_relinks_both_sides() {
        let mut policy = filled(&[1, 2, 3]);

        assert!(policy.remove(&2));
        assert!(!policy.remove(&2));
        assert_eq!(policy.keys_by_recency(), vec![3, 1]);
        assert_eq!(policy.evict(), Some(1));
        assert_eq!(policy.evict(), Some(3));
        assert_eq!(policy.evict(), None);
    }

    #[test]
    fn test_lru_remove_only_key() {
        let mut policy = filled(&[1]);

        assert!(policy.remove(&1));
        assert_eq!(policy.peek_victim(), None);
        policy.insert(2);
        assert_eq!(policy.keys_by_recency(), vec![2]);
    }

    #[test]
    fn test_lru_slots_are_recycled() {
        let mut policy = LruPolicy::new();
        let a = policy.insert("a");
        policy.evict();
        let b = policy.insert("b");

        assert_eq!(a, b);
        assert_eq!(policy.nodes.len(), 1);
    }

    #[test]
    fn test_lru_clear() {
        let mut policy = filled(&[1, 2, 3]);
        policy.clear();

        assert_eq!(policy.len(), 0);
        assert!(policy.keys_by_recency().is_empty());
        policy.insert(7);
        assert_eq!(policy.peek_victim(), Some(&7));
    }
}
