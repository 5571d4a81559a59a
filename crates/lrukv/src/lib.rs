//! # lrukv
//!
//! Fixed-capacity in-memory key-value cache with least-recently-used eviction.
//!
//! ## Architecture
//! - **Index**: AHash map from key to an arena handle (O(1) lookup)
//! - **Recency list**: arena-backed doubly-linked list, most recently used
//!   at the head (O(1) promote, O(1) evict)
//! - **LruCache**: single-owner façade keeping both in step
//! - **SharedCache**: one `parking_lot` mutex around an `LruCache`, plus
//!   hit/miss statistics
//!
//! ```
//! use lrukv::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3); // evicts "b"
//!
//! assert!(cache.get(&"b").is_none());
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod lru;
mod recency;
mod stats;

pub use cache::SharedCache;
pub use error::{Error, Result};
pub use lru::{Iter, LruCache, Put};
pub use stats::{CacheStats, StatsSnapshot};
