//! Key/value store with per-entry time-to-live.
//!
//! [`TransientStore`] is the seam between the result cache and whatever
//! holds the bytes. [`MemoryStore`] is the in-process moka implementation.
//! A shared backend (redis, a database options table) only needs the three
//! trait methods; store errors are absorbed by
//! [`ResultCache`](super::ResultCache) and read as misses.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use crate::Result;
use crate::types::ImageRecord;

/// Key of a stored transient.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the result cache keeps in the store.
#[derive(Debug, Clone)]
pub enum CachedValue {
    /// Recommendations for one text.
    Records(Arc<Vec<ImageRecord>>),
    /// Post id → key of that post's most recent records entry.
    KeyIndex(HashMap<u64, CacheKey>),
}

/// A store of expiring values.
#[async_trait]
pub trait TransientStore: Send + Sync {
    /// `None` when absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>>;

    /// Insert or overwrite. The TTL restarts on every write.
    async fn set(&self, key: &CacheKey, value: CachedValue, ttl: Duration) -> Result<()>;

    /// Remove `key`; absent keys are not an error.
    async fn delete(&self, key: &CacheKey) -> Result<()>;
}

#[derive(Clone)]
struct Transient {
    value: CachedValue,
    ttl: Duration,
}

/// Expire each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<CacheKey, Transient> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Transient,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Transient,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory transient store.
///
/// Bounded LRU (moka) with a per-entry TTL. Owned per service instance; not
/// shared across processes.
pub struct MemoryStore {
    cache: Cache<CacheKey, Transient>,
}

impl MemoryStore {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Approximate number of live entries.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl TransientStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<CachedValue>> {
        Ok(self.cache.get(key).await.map(|t| t.value))
    }

    async fn set(&self, key: &CacheKey, value: CachedValue, ttl: Duration) -> Result<()> {
        self.cache.insert(key.clone(), Transient { value, ttl }).await;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}
