pub mod cache;

pub use cache::{
    CacheEntry, CacheStats, CacheStore, Freshness, MemoryStore, DEFAULT_RETENTION,
};
