//! Per-text cache of recommendation results, with a post-id key index.
//!
//! Entries are keyed by a SHA-256 of the analysed text, so unchanged text
//! hits across requests, posts and process restarts (given a persistent
//! store). The key index maps each post to the key of its latest entry and
//! outlives the entries it names; it is the only way entries are deleted
//! before they expire. An entry whose post was re-indexed to a newer key is
//! orphaned and simply runs out its TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::store::{CacheKey, CachedValue, MemoryStore, TransientStore};
use crate::telemetry;
use crate::types::ImageRecord;
use crate::{KapowError, Result};

/// Prefix for every key this cache writes.
pub const KEY_PREFIX: &str = "KAPOW";

/// Store key of the post-id index.
pub const INDEX_KEY: &str = "KAPOW_KEYCACHE_KEY";

/// Configuration for the result cache.
///
/// ```rust
/// # use kapow::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(5_000)
///     .ttl(Duration::from_secs(600))
///     .index_ttl(Duration::from_secs(1800));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of stored entries (in-memory store only). Default: 10,000.
    pub max_entries: u64,
    /// Lifetime of a results entry. Default: 1 hour.
    pub ttl: Duration,
    /// Lifetime of the key index, refreshed on each write. Default: 3 hours.
    pub index_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
            index_ttl: Duration::from_secs(3 * 3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn index_ttl(mut self, ttl: Duration) -> Self {
        self.index_ttl = ttl;
        self
    }

    /// The index must outlive the entries it names.
    pub fn validate(&self) -> Result<()> {
        if self.index_ttl <= self.ttl {
            return Err(KapowError::Configuration(format!(
                "cache index_ttl ({:?}) must be longer than ttl ({:?})",
                self.index_ttl, self.ttl
            )));
        }
        if self.ttl.is_zero() {
            return Err(KapowError::Configuration(
                "cache ttl must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deterministic cache key for `text`: `KAPOW_<hex sha256>`.
pub fn cache_key_for(text: &str) -> CacheKey {
    let digest = Sha256::digest(text.as_bytes());
    CacheKey::new(format!("{KEY_PREFIX}_{}", hex::encode(digest)))
}

/// Result cache over a [`TransientStore`].
///
/// Store failures never propagate: reads degrade to misses and writes are
/// logged and dropped.
pub struct ResultCache {
    store: Arc<dyn TransientStore>,
    ttl: Duration,
    index_ttl: Duration,
    // Serializes read-modify-write of the index.
    index_lock: Mutex<()>,
}

impl ResultCache {
    /// Cache backed by a fresh [`MemoryStore`].
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new(config.max_entries));
        Self::with_store(store, config)
    }

    pub fn with_store(store: Arc<dyn TransientStore>, config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            ttl: config.ttl,
            index_ttl: config.index_ttl,
            index_lock: Mutex::new(()),
        })
    }

    /// Look up records cached for `text`.
    ///
    /// Returns `None` on miss. Emits cache hit/miss metrics.
    pub async fn get(&self, text: &str) -> Option<Arc<Vec<ImageRecord>>> {
        let key = cache_key_for(text);
        let found = match self.store.get(&key).await {
            Ok(Some(CachedValue::Records(records))) => Some(records),
            Ok(Some(CachedValue::KeyIndex(_))) => {
                warn!(%key, "results key holds an index value");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%key, error = %e, "cache store read failed, treating as miss");
                None
            }
        };

        if found.is_some() {
            debug!(%key, "cache hit");
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
        } else {
            debug!(%key, "cache miss");
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        }
        found
    }

    /// Cache `records` for `text` and point `post_id` at the entry.
    ///
    /// Empty record lists are never cached, so a transient remote failure
    /// is retried on the next request.
    pub async fn put(&self, post_id: u64, text: &str, records: Arc<Vec<ImageRecord>>) {
        if records.is_empty() {
            return;
        }

        let key = cache_key_for(text);
        if let Err(e) = self
            .store
            .set(&key, CachedValue::Records(records), self.ttl)
            .await
        {
            warn!(%key, error = %e, "cache store write failed");
            return;
        }

        let _guard = self.index_lock.lock().await;
        match self.read_index().await {
            Ok(mut index) => {
                index.insert(post_id, key);
                self.write_index(index).await;
            }
            Err(e) => {
                // Every live entry must be reachable from the index.
                warn!(%key, error = %e, "key index unreadable, dropping new entry");
                self.delete_entry(&key).await;
            }
        }
    }

    /// Key currently indexed for `post_id`.
    pub async fn indexed_key(&self, post_id: u64) -> Option<CacheKey> {
        self.read_index().await.ok()?.remove(&post_id)
    }

    /// Drop the entry indexed for `post_id`. Returns whether one was indexed.
    pub async fn invalidate(&self, post_id: u64) -> bool {
        let key = {
            let _guard = self.index_lock.lock().await;
            let mut index = match self.read_index().await {
                Ok(index) => index,
                Err(e) => {
                    warn!(post_id, error = %e, "key index unreadable, nothing invalidated");
                    return false;
                }
            };
            let Some(key) = index.remove(&post_id) else {
                return false;
            };
            self.write_index(index).await;
            key
        };

        self.delete_entry(&key).await;
        metrics::counter!(telemetry::INVALIDATIONS_TOTAL, "scope" => "post").increment(1);
        info!(post_id, %key, "invalidated cached recommendations");
        true
    }

    /// Drop the index and every entry it names. Returns the number of
    /// entries removed.
    pub async fn invalidate_all(&self) -> usize {
        let keys: Vec<CacheKey> = {
            let _guard = self.index_lock.lock().await;
            let index = match self.read_index().await {
                Ok(index) => index,
                Err(e) => {
                    warn!(error = %e, "key index unreadable, nothing invalidated");
                    return 0;
                }
            };
            if index.is_empty() {
                return 0;
            }
            if let Err(e) = self.store.delete(&CacheKey::new(INDEX_KEY)).await {
                warn!(error = %e, "failed to delete key index");
            }
            index.into_values().collect()
        };

        for key in &keys {
            self.delete_entry(key).await;
        }

        metrics::counter!(telemetry::INVALIDATIONS_TOTAL, "scope" => "all")
            .increment(keys.len() as u64);
        info!(count = keys.len(), "invalidated all cached recommendations");
        keys.len()
    }

    /// The current index. An absent index is empty; a store failure is an
    /// error so callers never overwrite an index they could not see.
    async fn read_index(&self) -> Result<HashMap<u64, CacheKey>> {
        match self.store.get(&CacheKey::new(INDEX_KEY)).await? {
            Some(CachedValue::KeyIndex(index)) => Ok(index),
            Some(CachedValue::Records(_)) => {
                warn!("index key holds a records value, starting a new index");
                Ok(HashMap::new())
            }
            None => Ok(HashMap::new()),
        }
    }

    async fn write_index(&self, index: HashMap<u64, CacheKey>) {
        let key = CacheKey::new(INDEX_KEY);
        if let Err(e) = self
            .store
            .set(&key, CachedValue::KeyIndex(index), self.index_ttl)
            .await
        {
            warn!(error = %e, "failed to write key index");
        }
    }

    async fn delete_entry(&self, key: &CacheKey) {
        if let Err(e) = self.store.delete(key).await {
            warn!(%key, error = %e, "failed to delete cache entry");
        }
    }
}
