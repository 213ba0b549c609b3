//! Time-expiring cache of resolved props, keyed by spread location
//!
//! Entries are never invalidated on edit. An edit that moves a spread changes
//! its key; an edit that does not shows the previous result until it expires.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::model::PropsMap;

/// Absolute file path plus byte offset of the spread node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub offset: usize,
}

impl CacheKey {
    pub fn new(path: impl AsRef<Path>, offset: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            offset,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    props: Arc<PropsMap>,
    computed_at: Instant,
}

/// Concurrent props cache; safe to share across redraw passes.
#[derive(Debug)]
pub struct PropsCache {
    entries: DashMap<CacheKey, CacheEntry>,
    expiration: Duration,
    max_entries: usize,
}

impl Default for PropsCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl PropsCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            expiration: config.expiration(),
            max_entries: config.max_entries.max(1),
        }
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Fresh entry for `key`; stale entries are dropped on the way.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<PropsMap>> {
        let fresh = {
            let entry = self.entries.get(key)?;
            (entry.computed_at.elapsed() <= self.expiration).then(|| Arc::clone(&entry.props))
        };
        if fresh.is_none() {
            self.entries
                .remove_if(key, |_, entry| entry.computed_at.elapsed() > self.expiration);
        }
        fresh
    }

    /// Store `props` for `key`, evicting when the cache is full.
    pub fn put(&self, key: CacheKey, props: Arc<PropsMap>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict();
        }
        self.entries.insert(
            key,
            CacheEntry {
                props,
                computed_at: Instant::now(),
            },
        );
    }

    /// Drop every entry for `path`.
    pub fn invalidate_file(&self, path: &Path) {
        self.entries.retain(|key, _| key.path != path);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expired entries first; if none expired, the oldest one.
    fn evict(&self) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.computed_at.elapsed() <= self.expiration);
        if self.entries.len() < before {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.computed_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
