//! LFU (Least Frequently Used) eviction policy
//!
//! Keys are ranked by `(frequency, sequence)` in an indexed min-heap.
//! `sequence` is assigned once, at first insertion, so keys with equal
//! frequency leave in insertion order.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use tracing::trace;

use crate::heap::FrequencyHeap;
use crate::policy::{EvictionPolicy, PolicyKind, SlotId};

/// Frequency ordering over tracked keys
pub struct LfuPolicy<K> {
    index: HashMap<K, usize, RandomState>,
    heap: FrequencyHeap<K>,
    next_sequence: u64,
}

impl<K> LfuPolicy<K>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty LFU policy
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty LFU policy with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            heap: FrequencyHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    /// Access count of a tracked key (1 after insertion)
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &slot = self.index.get(key)?;
        self.heap.frequency(slot)
    }
}

impl<K> Default for LfuPolicy<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K>
where
    K: Hash + Eq + Clone,
{
    fn insert(&mut self, key: K) -> SlotId {
        assert!(
            !self.index.contains_key(&key),
            "LFU policy: insert of an already tracked key"
        );

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let slot = self.heap.push(key.clone(), 1, sequence);
        self.index.insert(key, slot);
        SlotId(slot)
    }

    fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.get(key) {
            Some(&slot) => self.heap.increment(slot).is_some(),
            None => false,
        }
    }

    fn evict(&mut self) -> Option<K> {
        let popped = self.heap.pop()?;
        self.index.remove(&popped.key);
        trace!(
            frequency = popped.frequency,
            sequence = popped.sequence,
            "LFU victim selected"
        );
        Some(popped.key)
    }

    fn peek_victim(&self) -> Option<&K> {
        self.heap.peek()
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.index.remove(key) {
            Some(slot) => self.heap.remove(slot).is_some(),
            None => false,
        }
    }

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    fn slot<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).copied().map(SlotId)
    }

    fn len(&self) -> usize {
        debug_assert_eq!(self.index.len(), self.heap.len());
        self.index.len()
    }

    /// Forget every key. The sequence counter keeps counting so tie-break
    /// order stays monotonic across clears.
    fn clear(&mut self) {
        self.index.clear();
        self.heap.clear();
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Lfu
    }
}
