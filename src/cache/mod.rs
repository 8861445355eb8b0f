//! Caching subsystem.
//!
//! - [`ResultCache`]: recommendation lists keyed by a hash of the analysed
//!   text, plus a post-id index for targeted and bulk invalidation.
//! - [`TransientStore`]: the expiring key/value seam underneath it, with
//!   [`MemoryStore`] (moka) as the default backend.

pub mod result;
pub mod store;

pub use result::{CacheConfig, INDEX_KEY, KEY_PREFIX, ResultCache, cache_key_for};
pub use store::{CacheKey, CachedValue, MemoryStore, TransientStore};
