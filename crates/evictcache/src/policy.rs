//! Eviction policy abstraction
//!
//! A policy tracks the set of keys held by a [`Cache`](crate::Cache) and
//! decides which one leaves when the cache is full. It never sees values
//! or the cache capacity.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::lfu::LfuPolicy;
use crate::lru::LruPolicy;

/// Opaque handle to a policy's private record for one key.
///
/// Stable while the key is tracked; recycled after it leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

/// Eviction strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used, ties broken by insertion order
    Lfu,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Lru => write!(f, "lru"),
            PolicyKind::Lfu => write!(f, "lfu"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            _ => Err(Error::UnknownPolicy(s.to_string())),
        }
    }
}

/// Capability every eviction strategy provides to the cache.
///
/// All methods are called with the cache lock held, so implementors only
/// need `&mut self` and never synchronize internally.
pub trait EvictionPolicy<K: Hash + Eq + Clone> {
    /// Start tracking a new key at its initial priority.
    ///
    /// # Panics
    /// Panics if `key` is already tracked.
    fn insert(&mut self, key: K) -> SlotId;

    /// Record a use of a tracked key. Returns `false` if the key is untracked.
    fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Remove and return the key this policy would discard next.
    fn evict(&mut self) -> Option<K>;

    /// The key [`evict`](Self::evict) would return, without removing it.
    fn peek_victim(&self) -> Option<&K>;

    /// Stop tracking `key`. Returns `false` if it was not tracked.
    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Whether `key` is tracked
    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Handle returned when `key` was inserted
    fn slot<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Number of tracked keys
    fn len(&self) -> usize;

    /// Whether no keys are tracked
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every tracked key
    fn clear(&mut self);

    /// Which strategy this is
    fn kind(&self) -> PolicyKind;
}

/// The built-in strategies, selected at construction.
pub enum Policy<K> {
    /// See [`LruPolicy`]
    Lru(LruPolicy<K>),
    /// See [`LfuPolicy`]
    Lfu(LfuPolicy<K>),
}

impl<K: Hash + Eq + Clone> Policy<K> {
    /// Empty LRU policy
    pub fn lru() -> Self {
        Policy::Lru(LruPolicy::new())
    }

    /// Empty LFU policy
    pub fn lfu() -> Self {
        Policy::Lfu(LfuPolicy::new())
    }

    /// Empty policy of the given kind
    pub fn from_kind(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Lru => Self::lru(),
            PolicyKind::Lfu => Self::lfu(),
        }
    }
}

impl<K: Hash + Eq + Clone> fmt::Debug for Policy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .finish()
    }
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Policy::Lru($p) => $body,
            Policy::Lfu($p) => $body,
        }
    };
}

impl<K: Hash + Eq + Clone> EvictionPolicy<K> for Policy<K> {
    fn insert(&mut self, key: K) -> SlotId {
        dispatch!(self, p => p.insert(key))
    }

    fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        dispatch!(self, p => p.touch(key))
    }

    fn evict(&mut self) -> Option<K> {
        dispatch!(self, p => p.evict())
    }

    fn peek_victim(&self) -> Option<&K> {
        dispatch!(self, p => p.peek_victim())
    }

    fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        dispatch!(self, p => p.remove(key))
    }

    fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        dispatch!(self, p => p.contains(key))
    }

    fn slot<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        dispatch!(self, p => p.slot(key))
    }

    fn len(&self) -> usize {
        dispatch!(self, p => EvictionPolicy::len(p))
    }

    fn clear(&mut self) {
        dispatch!(self, p => p.clear())
    }

    fn kind(&self) -> PolicyKind {
        match self {
            Policy::Lru(_) => PolicyKind::Lru,
            Policy::Lfu(_) => PolicyKind::Lfu,
        }
    }
}
