//! Capacity-bounded cache with a pluggable eviction policy

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::entry::Entry;
use crate::policy::{EvictionPolicy, Policy, PolicyKind};
use crate::stats::CacheStats;

/// Table and policy, always locked together
struct Inner<K, V, P> {
    table: HashMap<K, Entry<K, V>, RandomState>,
    policy: P,
}

impl<K, V, P> Inner<K, V, P>
where
    K: Hash + Eq + Clone,
    P: EvictionPolicy<K>,
{
    fn debug_check(&self, capacity: usize) {
        debug_assert_eq!(
            self.table.len(),
            self.policy.len(),
            "cache table and eviction policy disagree on key count"
        );
        debug_assert!(self.table.len() <= capacity, "cache exceeded its capacity");
    }
}

/// Thread-safe key/value cache holding at most `capacity` entries.
///
/// Every operation, including [`get`](Cache::get), runs under one exclusive
/// lock because a hit reorders the eviction policy. Share between threads
/// with `Arc<Cache<..>>`.
pub struct Cache<K, V, P = Policy<K>> {
    inner: Mutex<Inner<K, V, P>>,
    stats: CacheStats,
    capacity: usize,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache using one of the built-in policies
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries; 0 disables the cache
    /// * `policy` - `Policy::lru()` or `Policy::lfu()`
    pub fn new(capacity: usize, policy: Policy<K>) -> Self {
        Self::with_policy(capacity, policy)
    }

    /// Create a cache from a [`CacheConfig`]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, Policy::from_kind(config.policy))
    }
}

impl<K, V, P> Cache<K, V, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: EvictionPolicy<K>,
{
    /// Create a cache driven by any [`EvictionPolicy`] implementation.
    ///
    /// # Panics
    /// Panics if `policy` already tracks keys.
    pub fn with_policy(capacity: usize, policy: P) -> Self {
        assert!(policy.is_empty(), "eviction policy must start empty");
        debug!(capacity, policy = %policy.kind(), "Created cache");

        Self {
            inner: Mutex::new(Inner {
                table: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
                policy,
            }),
            stats: CacheStats::new(),
            capacity,
        }
    }

    /// Look up a value, counting the lookup as a use of the key
    ///
    /// # Returns
    /// * `Some(value)` on a hit, `None` on a miss (always on a zero-capacity cache)
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.capacity == 0 {
            self.stats.record_miss();
            return None;
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.table.get(key) {
            Some(entry) => {
                let tracked = inner.policy.touch(key);
                debug_assert!(tracked, "cached key missing from eviction policy");
                debug_assert_eq!(inner.policy.slot(key), Some(entry.handle));
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Insert or overwrite a value, evicting one entry first if the cache is full
    ///
    /// Overwriting counts as a use of the key. On a zero-capacity cache this
    /// does nothing.
    pub fn put(&self, key: K, value: V) {
        if self.capacity == 0 {
            trace!("Dropped put on zero-capacity cache");
            return;
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(entry) = inner.table.get_mut(&key) {
            entry.replace(value);
            let tracked = inner.policy.touch(&key);
            debug_assert!(tracked, "cached key missing from eviction policy");
            self.stats.record_update();
            return;
        }

        if inner.table.len() >= self.capacity {
            self.evict_one(inner);
        }

        let handle = inner.policy.insert(key.clone());
        inner.table.insert(key.clone(), Entry::new(key, value, handle));
        self.stats.record_insert();
        inner.debug_check(self.capacity);
    }

    /// Remove an entry without involving eviction
    ///
    /// # Returns
    /// * The removed value, or `None` if the key was absent
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let entry = inner.table.remove(key)?;
        let tracked = inner.policy.remove(key);
        debug_assert!(tracked, "cached key missing from eviction policy");
        self.stats.record_removal();
        inner.debug_check(self.capacity);
        Some(entry.value)
    }

    /// Look up a value without counting it as a use
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner
            .lock()
            .table
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Whether `key` is cached. Does not count as a use.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().table.contains_key(key)
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        guard.table.clear();
        guard.policy.clear();
        self.stats.reset();
        debug!(capacity = self.capacity, "Cleared cache");
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().table.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Which eviction strategy the cache runs
    pub fn policy_kind(&self) -> PolicyKind {
        self.inner.lock().policy.kind()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn evict_one(&self, inner: &mut Inner<K, V, P>) {
        let Some(victim) = inner.policy.evict() else {
            unreachable!("eviction policy is empty while the cache is full");
        };

        let removed = inner.table.remove(&victim);
        debug_assert!(
            matches!(&removed, Some(entry) if entry.key == victim),
            "evicted key missing from cache table"
        );
        self.stats.record_eviction();
        trace!(
            policy = %inner.policy.kind(),
            len = inner.table.len(),
            "Evicted entry"
        );
    }
}

impl<K, V, P> fmt::Debug for Cache<K, V, P>
where
    K: Hash + Eq + Clone,
    P: EvictionPolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Cache")
            .field("capacity", &self.capacity)
            .field("len", &inner.table.len())
            .field("policy", &inner.policy.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lfu::LfuPolicy;
    use crate::lru::LruPolicy;

    fn lru(capacity: usize) -> Cache<String, String> {
        Cache::new(capacity, Policy::lru())
    }

    fn lfu(capacity: usize) -> Cache<String, String> {
        Cache::new(capacity, Policy::lfu())
    }

    fn put(cache: &Cache<String, String>, k: &str, v: &str) {
        cache.put(k.to_string(), v.to_string());
    }

    #[test]
    fn test_cache_basic() {
        let cache = lru(10);
        put(&cache, "a", "1");

        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
    }

    #[test]
    fn test_lru_scenario() {
        let cache = lru(2);
        put(&cache, "a", "1");
        put(&cache, "b", "2");
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        put(&cache, "c", "3");

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
        assert_eq!(cache.stats().evictions(), 1);
    }

    #[test]
    fn test_lfu_scenario() {
        let cache = lfu(2);
        put(&cache, "a", "1");
        put(&cache, "b", "2");
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        put(&cache, "c", "3");

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn test_overwrite_keeps_count() {
        for cache in [lru(2), lfu(2)] {
            put(&cache, "k", "v1");
            put(&cache, "k", "v2");

            assert_eq!(cache.len(), 1);
            assert_eq!(cache.get("k").as_deref(), Some("v2"));
            assert_eq!(cache.stats().updates(), 1);
        }
    }

    #[test]
    fn test_overwrite_counts_as_use() {
        let cache = lru(2);
        put(&cache, "a", "1");
        put(&cache, "b", "2");
        put(&cache, "a", "1'");
        put(&cache, "c", "3");

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));

        let cache = lfu(2);
        put(&cache, "a", "1");
        put(&cache, "b", "2");
        put(&cache, "a", "1'");
        put(&cache, "c", "3");

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_zero_capacity_is_noop() {
        for cache in [lru(0), lfu(0)] {
            put(&cache, "a", "1");

            assert_eq!(cache.len(), 0);
            assert_eq!(cache.get("a"), None);
            assert_eq!(cache.stats().inserts(), 0);
        }
    }

    #[test]
    fn test_peek_does_not_touch() {
        let cache = lru(2);
        put(&cache, "a", "1");
        put(&cache, "b", "2");
        assert_eq!(cache.peek("a").as_deref(), Some("1"));
        put(&cache, "c", "3");

        // a was only peeked, so it stayed least recent
        assert!(!cache.contains("a"));
        assert_eq!(cache.stats().hits(), 0);
    }

    #[test]
    fn test_remove() {
        let cache = lfu(3);
        put(&cache, "a", "1");
        put(&cache, "b", "2");

        assert_eq!(cache.remove("a").as_deref(), Some("1"));
        assert_eq!(cache.remove("a"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().removals(), 1);

        // Freed room is reused without eviction
        put(&cache, "c", "3");
        put(&cache, "d", "4");
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().evictions(), 0);
    }

    #[test]
    fn test_clear() {
        let cache = lru(3);
        put(&cache, "a", "1");
        put(&cache, "b", "2");
        cache.get("a");
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits(), 0);
        put(&cache, "c", "3");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_with_concrete_policy() {
        let cache: Cache<u32, &str, LfuPolicy<u32>> = Cache::with_policy(2, LfuPolicy::new());
        cache.put(1, "one");
        cache.put(2, "two");
        cache.get(&2);
        cache.put(3, "three");

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.policy_kind(), PolicyKind::Lfu);
    }

    #[test]
    #[should_panic(expected = "must start empty")]
    fn test_with_non_empty_policy_panics() {
        let mut policy = LruPolicy::new();
        policy.insert(1u32);
        let _cache: Cache<u32, u32, _> = Cache::with_policy(1, policy);
    }

    #[test]
    fn test_from_config() {
        let config = CacheConfig {
            capacity: 4,
            policy: PolicyKind::Lfu,
        };
        let cache: Cache<String, String> = Cache::from_config(&config);

        assert_eq!(cache.capacity(), 4);
        assert_eq!(cache.policy_kind(), PolicyKind::Lfu);
    }

    #[test]
    fn test_debug_format() {
        let cache = lru(2);
        put(&cache, "a", "1");

        let out = format!("{:?}", cache);
        assert!(out.contains("capacity: 2"));
        assert!(out.contains("len: 1"));
        assert!(out.contains("Lru"));
    }
}
