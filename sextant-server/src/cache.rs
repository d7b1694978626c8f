//! Bounded TTL cache for serialized analysis responses.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::clock::{Clock, SystemClock};

/// Compute the cache key for an endpoint/payload pair.
pub fn cache_key(endpoint: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(b"\0");
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug)]
struct CacheEntry {
    key: String,
    body: String,
    stored_at: Instant,
}

/// Bounded in-memory response cache.
///
/// Entries expire after the configured TTL and are evicted on access; when
/// the cache is full the oldest entry makes room. A poisoned lock degrades to
/// cache misses rather than failing the request.
#[derive(Debug)]
pub struct ResponseCache<C: Clock = SystemClock> {
    clock: C,
    capacity: usize,
    ttl: Duration,
    entries: Mutex<Vec<CacheEntry>>,
}

impl ResponseCache<SystemClock> {
    /// Create a cache with the given capacity and TTL on the system clock.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(SystemClock::new(), capacity, ttl)
    }
}

impl<C: Clock> ResponseCache<C> {
    /// Create a cache driven by a custom clock.
    pub fn with_clock(clock: C, capacity: usize, ttl: Duration) -> Self {
        Self {
            clock,
            capacity,
            ttl,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Look up a cached body, evicting expired entries first.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        entries.retain(|entry| now.duration_since(entry.stored_at) < self.ttl);
        entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.body.clone())
    }

    /// Store a body under a key, displacing the oldest entry when full.
    pub fn insert(&self, key: String, body: String) {
        let now = self.clock.now();
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        entries.retain(|entry| now.duration_since(entry.stored_at) < self.ttl);
        if let Some(existing) = entries.iter_mut().find(|entry| entry.key == key) {
            existing.body = body;
            existing.stored_at = now;
            return;
        }
        if entries.len() >= self.capacity && !entries.is_empty() {
            entries.remove(0);
        }
        entries.push(CacheEntry {
            key,
            body,
            stored_at: now,
        });
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let Ok(mut entries) = self.entries.lock() else {
            return 0;
        };
        let cleared = entries.len();
        entries.clear();
        cleared
    }
}
