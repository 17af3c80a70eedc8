//! Path -> resolved icon cache

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{IconResolverError, Result};
use crate::types::IconReference;
use crate::utils::path::is_same_or_descendant;

/// Memoized resolution results keyed by host path.
///
/// Entries have no expiry; they stay until invalidated or cleared. A cache is
/// only obtainable from a [`CacheOwner`], which hands out exactly one at a
/// time. The owner can issue again only once this cache has been dropped.
pub struct IconCache {
    /// Path -> shared resolution result
    cache: DashMap<Box<str>, Arc<IconReference>, ahash::RandomState>,

    /// Issued flag of the owner, reset on drop
    issued: Arc<AtomicBool>,
}

impl IconCache {
    fn new(issued: Arc<AtomicBool>) -> Self {
        Self {
            cache: DashMap::with_hasher(ahash::RandomState::new()),
            issued,
        }
    }

    /// Insert or overwrite the entry for `path`
    pub fn set(&self, path: &str, reference: impl Into<Arc<IconReference>>) {
        self.cache.insert(path.into(), reference.into());
    }

    /// Cached result for `path`; never triggers resolution
    pub fn get(&self, path: &str) -> Option<Arc<IconReference>> {
        self.cache.get(path).map(|entry| Arc::clone(entry.value()))
    }

    pub fn does_record_exist(&self, path: &str) -> bool {
        self.cache.contains_key(path)
    }

    /// Remove the entry for exactly `path`
    pub fn invalidate(&self, path: &str) -> bool {
        self.cache.remove(path).is_some()
    }

    /// Remove `root` and every cached path beneath it
    pub fn invalidate_tree(&self, root: &str) -> usize {
        let before = self.cache.len();
        self.cache.retain(|path, _| !is_same_or_descendant(path, root));
        before.saturating_sub(self.cache.len())
    }

    /// Remove every entry and give back the map's storage
    pub fn clear(&self) -> usize {
        let removed = self.cache.len();
        self.cache.clear();
        self.cache.shrink_to_fit();
        removed
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Snapshot of all cached paths
    pub fn paths(&self) -> Vec<String> {
        self.cache.iter().map(|entry| entry.key().to_string()).collect()
    }
}

impl Drop for IconCache {
    fn drop(&mut self) {
        self.issued.store(false, Ordering::Release);
        log::debug!("Icon cache dropped");
    }
}

impl std::fmt::Debug for IconCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconCache").field("entries", &self.cache.len()).finish()
    }
}

/// Issues the single [`IconCache`] of a plugin instance
#[derive(Debug, Default)]
pub struct CacheOwner {
    issued: Arc<AtomicBool>,
}

impl CacheOwner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct the cache. Fails while a cache issued by this owner is alive.
    pub fn create_cache(&self) -> Result<Arc<IconCache>> {
        if self.issued.swap(true, Ordering::AcqRel) {
            log::error!("Refusing to construct a second icon cache");
            return Err(IconResolverError::CacheAlreadyConstructed);
        }
        Ok(Arc::new(IconCache::new(Arc::clone(&self.issued))))
    }

    /// Whether a cache from this owner is still alive
    pub fn has_issued(&self) -> bool {
        self.issued.load(Ordering::Acquire)
    }
}
