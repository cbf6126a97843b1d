use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Default time-to-live for cached GET responses.
/// One minute keeps page-load fetches cheap without serving data that is
/// noticeably out of date.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(60_000);

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Useful for exercising expiry
/// without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = expiry_after(*now, by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub expiry: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry > now
    }
}

/// `now + ttl`, saturating at the largest representable time.
fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Milliseconds in `ttl`, saturating at `u64::MAX`.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

/// Process-local table of GET responses keyed by [`cache_key`](super::cache_key).
///
/// Entries are never removed on read; a stale entry simply stops being
/// returned and is overwritten by the next successful fetch. The lock is
/// held for a single lookup or write at a time and never across an await.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry,
        // so the map is still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached payload for `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.now();
        let entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_fresh_at(now) => Some(entry.data.clone()),
            Some(_) => {
                debug!(key = key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Return the raw entry for `key`, fresh or not.
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries().get(key).cloned()
    }

    /// Store `data` under `key`, overwriting any previous entry. Returns the
    /// expiry that was recorded.
    pub fn insert(&self, key: &str, data: Value, ttl: Option<Duration>) -> DateTime<Utc> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expiry = expiry_after(self.now(), ttl);
        self.entries()
            .insert(key.to_string(), CacheEntry { data, expiry });
        debug!(key = key, ttl_ms = ttl_millis(ttl), "Cached response");
        expiry
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drop every entry whose expiry has passed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh_at(now));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache_at_epoch() -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(DateTime::<Utc>::UNIX_EPOCH));
        let cache = ResponseCache::new().with_clock(clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_get_returns_fresh_entry() {
        let (cache, _clock) = cache_at_epoch();
        cache.insert("GET:/bus/schedule?", json!({"data": []}), None);
        assert_eq!(cache.get("GET:/bus/schedule?"), Some(json!({"data": []})));
    }

    #[test]
    fn test_get_missing_key() {
        let (cache, _clock) = cache_at_epoch();
        assert_eq!(cache.get("GET:/nothing?"), None);
    }

    #[test]
    fn test_default_expiry_is_one_minute() {
        let (cache, _clock) = cache_at_epoch();
        let expiry = cache.insert("k", json!(1), None);
        assert_eq!(expiry, DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::milliseconds(60_000));
    }

    #[test]
    fn test_entry_expires_at_ttl_boundary() {
        let (cache, clock) = cache_at_epoch();
        cache.insert("k", json!(1), Some(Duration::from_millis(500)));

        clock.advance(Duration::from_millis(499));
        assert_eq!(cache.get("k"), Some(json!(1)));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("k"), None);
        // Stale entries stay until overwritten or purged
        assert_eq!(cache.len(), 1);
        assert!(cache.entry("k").is_some());
    }

    #[test]
    fn test_insert_overwrites_and_extends_expiry() {
        let (cache, clock) = cache_at_epoch();
        cache.insert("k", json!("old"), None);
        clock.advance(Duration::from_secs(59));
        let expiry = cache.insert("k", json!("new"), None);

        clock.advance(Duration::from_secs(30));
        assert_eq!(cache.get("k"), Some(json!("new")));
        assert_eq!(cache.entry("k").map(|e| e.expiry), Some(expiry));
    }

    #[test]
    fn test_purge_expired() {
        let (cache, clock) = cache_at_epoch();
        cache.insert("short", json!(1), Some(Duration::from_secs(1)));
        cache.insert("long", json!(2), Some(Duration::from_secs(120)));

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("long"), Some(json!(2)));
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = cache_at_epoch();
        cache.insert("a", json!(1), None);
        cache.insert("b", json!(2), None);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let (cache, _clock) = cache_at_epoch();
        let expiry = cache.insert("k", json!(1), Some(Duration::MAX));
        assert_eq!(expiry, DateTime::<Utc>::MAX_UTC);
        assert_eq!(cache.get("k"), Some(json!(1)));
    }

    #[test]
    fn test_ttl_millis_saturates() {
        assert_eq!(ttl_millis(Duration::from_millis(60_000)), 60_000);
        assert_eq!(ttl_millis(Duration::from_secs(u64::MAX)), u64::MAX);
        assert_eq!(ttl_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_custom_default_ttl() {
        let cache = ResponseCache::with_ttl(Duration::from_secs(5));
        assert_eq!(cache.default_ttl(), Duration::from_secs(5));
    }
}
