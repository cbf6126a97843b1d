//! In-memory response caching for GET requests.
//!
//! This module provides the `ResponseCache` that backs `ApiClient`, along
//! with the key derivation used to index it. Entries live only as long as
//! the cache instance and are considered stale once their expiry passes
//! (60 seconds by default).

pub mod key;
pub mod store;

pub use key::cache_key;
pub use store::{CacheEntry, Clock, ManualClock, ResponseCache, SystemClock, DEFAULT_CACHE_TTL};
