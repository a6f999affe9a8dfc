//! bytecache: a thread-safe, sharded, in-memory byte cache.
//!
//! Keys are non-empty strings; values are opaque byte payloads. The cache
//! enforces a global memory budget with pluggable eviction (LRU, LFU, or
//! FIFO), expires entries lazily by TTL, and can transparently compress
//! payloads past a size threshold.
//!
//! ```
//! use std::time::Duration;
//! use bytecache::prelude::*;
//!
//! let cache = CacheBuilder::new()
//!     .max_bytes(64 * 1024 * 1024)
//!     .policy(EvictionPolicy::Lru)
//!     .build();
//!
//! cache.set("user:42", b"profile bytes", Duration::from_secs(30)).unwrap();
//! assert_eq!(cache.get("user:42").unwrap(), b"profile bytes");
//!
//! let stats = cache.stats();
//! assert_eq!(stats.hits, 1);
//! ```

pub mod builder;
pub mod cache;
pub mod compress;
mod ds;
pub mod error;
pub mod policy;
mod shard;
mod sizing;
pub mod stats;

pub mod prelude;
