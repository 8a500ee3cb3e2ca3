use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::record::ProxyRecord;

pub const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Time source for cache freshness checks. Production uses the system
/// clock; tests drive a fake.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    fetched_at: Instant,
    records: Vec<ProxyRecord>,
}

/// Memoizes normalized source results until a fixed TTL elapses. Entries
/// are immutable snapshots; concurrent writers to the same key are
/// last-writer-wins. Memory-resident only, reset on process restart.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A fresh copy of the entry, or None once `ttl` has elapsed.
    pub fn get(&self, key: &str, now: Instant) -> Option<Vec<ProxyRecord>> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.fetched_at) >= self.ttl {
            return None;
        }
        Some(entry.records.clone())
    }

    pub fn put(&self, key: &str, records: Vec<ProxyRecord>, now: Instant) {
        self.entries.lock().insert(
            key.to_string(),
            CacheEntry {
                fetched_at: now,
                records,
            },
        );
    }
}
