//! # evictcache
//!
//! Capacity-bounded, thread-safe key/value cache with pluggable eviction.
//!
//! ## Architecture
//! - **Table**: AHash map from key to entry (O(1))
//! - **LRU**: arena-backed doubly-linked list, O(1) touch and evict
//! - **LFU**: indexed binary min-heap over `(frequency, sequence)`, O(log n)
//! - **Locking**: one `parking_lot::Mutex` guards table and policy together
//!
//! ## Example
//!
//! ```
//! use evictcache::{Cache, Policy};
//!
//! let cache: Cache<String, String> = Cache::new(2, Policy::lfu());
//! cache.put("a".to_string(), "1".to_string());
//! cache.put("b".to_string(), "2".to_string());
//! cache.get("a");
//! cache.put("c".to_string(), "3".to_string()); // evicts "b"
//!
//! assert_eq!(cache.get("b"), None);
//! assert_eq!(cache.get("a").as_deref(), Some("1"));
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod entry;
mod error;
mod heap;
mod lfu;
mod lru;
mod policy;
mod stats;

pub use cache::Cache;
pub use config::{CacheConfig, DEFAULT_CAPACITY};
pub use error::{Error, Result};
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use policy::{EvictionPolicy, Policy, PolicyKind, SlotId};
pub use stats::{CacheStats, StatsSnapshot};
