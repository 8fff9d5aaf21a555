use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;

use crate::playlist::PlaylistResult;

/// Default retention window for cached playlist results.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// A cached playlist result together with its creation timestamp.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: PlaylistResult,
    pub created_at: SystemTime,
}

impl CacheEntry {
    pub fn new(data: PlaylistResult) -> Self {
        Self {
            data,
            created_at: SystemTime::now(),
        }
    }

    /// Entry with an explicit creation time, for tests that simulate the
    /// passage of time instead of sleeping through the retention window.
    pub fn created_at(data: PlaylistResult, created_at: SystemTime) -> Self {
        Self { data, created_at }
    }

    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.created_at).unwrap_or_default()
    }
}

/// Per-key cache state as a pure function of `(entry, now, ttl)`, so expiry
/// logic is testable independent of real time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Absent,
}

impl Freshness {
    pub fn of(entry: Option<&CacheEntry>, now: SystemTime, ttl: Duration) -> Self {
        match entry {
            None => Freshness::Absent,
            Some(entry) if entry.age(now) < ttl => Freshness::Fresh,
            Some(_) => Freshness::Stale,
        }
    }
}

/// Cache statistics for monitoring and tests.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }
}

/// Storage seam for resolved playlists. Keys are the verbatim playlist URL
/// string; no normalization is applied, so URLs differing only in formatting
/// are distinct entries. Lookups are synchronous and never block on IO.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;

    fn put(&self, key: String, entry: CacheEntry);

    fn remove(&self, key: &str) -> Option<CacheEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide in-memory store. Grows until process restart except for
/// overwrites; stale entries are detected lazily by the resolver and
/// replaced on the next successful fetch.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();

        entries.clear();
        stats.total_entries = 0;
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read();
        let mut stats = self.stats.write();

        match entries.get(key) {
            Some(entry) => {
                stats.record_hit();
                Some(entry.clone())
            }
            None => {
                stats.record_miss();
                None
            }
        }
    }

    fn put(&self, key: String, entry: CacheEntry) {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();

        entries.insert(key, entry);
        stats.total_entries = entries.len();
    }

    fn remove(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();

        let removed = entries.remove(key);
        stats.total_entries = entries.len();
        removed
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
