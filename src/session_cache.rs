//! Session Cache
//!
//! Explicit TTL'd cache for per-session gating flags (search/autocomplete
//! capability lookups). Callers hold and pass the cache; nothing here is
//! ambient or global, and entries can be invalidated directly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct SessionCache {
    entries: Mutex<HashMap<String, (Instant, bool)>>,
    ttl: Duration,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a flag, treating expired entries as absent.
    pub fn get(&self, key: &str) -> Option<bool> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(*value),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: impl Into<String>, value: bool) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.into(), (Instant::now(), value));
    }

    /// Drop one entry immediately.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Drop everything, e.g. on resource-type change.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Cached lookup: compute and store the flag on a miss.
    pub fn get_or_insert_with(&self, key: &str, compute: impl FnOnce() -> bool) -> bool {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.put(key, value);
        value
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        // Session-scoped flags change rarely; five minutes keeps lookups warm
        // without pinning a stale capability for a whole session.
        Self::new(Duration::from_secs(300))
    }
}
