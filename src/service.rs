//! Per-project props service
//!
//! Owns the parsed-file store, the import resolver and the result cache for
//! one open project. Hosts build one at project open and drop it at close.

use std::sync::Arc;
use tree_sitter::Node;

use crate::cache::{CacheKey, PropsCache};
use crate::config::Settings;
use crate::error::Cancelled;
use crate::guard::{cancellation_safe, ResolveContext};
use crate::model::PropsMap;
use crate::parsing::{FileSystem, SourceFile, SourceStore};
use crate::project_resolver::ImportResolver;
use crate::resolution::PropsResolver;

#[derive(Debug)]
pub struct PropsService {
    settings: Arc<Settings>,
    store: SourceStore,
    imports: ImportResolver,
    cache: PropsCache,
}

impl PropsService {
    pub fn new(settings: Arc<Settings>, fs: Arc<dyn FileSystem>) -> Self {
        let imports = ImportResolver::new(
            Arc::clone(&fs),
            settings.project_root(),
            settings.resolution.clone(),
        );
        Self {
            store: SourceStore::new(fs),
            cache: PropsCache::new(&settings.cache),
            imports,
            settings,
        }
    }

    /// Service over the real file system
    pub fn on_disk(settings: Arc<Settings>) -> Self {
        Self::new(settings, Arc::new(crate::parsing::DiskFileSystem))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SourceStore {
        &self.store
    }

    pub fn imports(&self) -> &ImportResolver {
        &self.imports
    }

    pub fn cache(&self) -> &PropsCache {
        &self.cache
    }

    /// Props merged in by `spread`, served from the cache when fresh.
    ///
    /// Any failure yields an empty map; only cancellation is reported.
    pub fn resolve_spread_props(
        &self,
        file: &Arc<SourceFile>,
        spread: Node<'_>,
        ctx: &ResolveContext,
    ) -> Result<Arc<PropsMap>, Cancelled> {
        let key = CacheKey::new(file.path(), spread.start_byte());
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("cache hit for {}:{}", key.path.display(), key.offset);
            return Ok(cached);
        }

        let props = cancellation_safe(PropsMap::new(), || {
            PropsResolver::new(&self.store, &self.imports, ctx).resolve_merged_props(file, spread)
        })?;
        if !props.is_empty() {
            tracing::debug!("resolved {} props at {}:{}", props.len(), key.path.display(), key.offset);
        }

        let props = Arc::new(props);
        self.cache.put(key, Arc::clone(&props));
        Ok(props)
    }

    /// Props of an object literal written directly as the `props` value.
    /// Not cached: no file has to be crossed.
    pub fn resolve_direct_props(
        &self,
        file: &Arc<SourceFile>,
        object: Node<'_>,
        ctx: &ResolveContext,
    ) -> Result<PropsMap, Cancelled> {
        cancellation_safe(PropsMap::new(), || {
            PropsResolver::new(&self.store, &self.imports, ctx).resolve_direct_props(file, object)
        })
    }
}
