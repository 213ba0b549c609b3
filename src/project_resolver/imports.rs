//! Import path to file resolution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::tsconfig::tsconfig_alias_roots;
use super::webpack::webpack_alias_root;
use super::AliasRootSet;
use crate::config::ResolutionConfig;
use crate::parsing::store::{FileSystem, normalize_path};

/// Resolves import path literals to files for one project.
pub struct ImportResolver {
    fs: Arc<dyn FileSystem>,
    project_root: PathBuf,
    config: ResolutionConfig,
}

impl std::fmt::Debug for ImportResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("project_root", &self.project_root)
            .finish()
    }
}

impl ImportResolver {
    pub fn new(fs: Arc<dyn FileSystem>, project_root: impl Into<PathBuf>, config: ResolutionConfig) -> Self {
        Self {
            fs,
            project_root: normalize_path(&project_root.into()),
            config,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// File that `raw` (as written in an import in `context_file`) refers to.
    ///
    /// `None` is the normal answer for packages and anything else that is not
    /// a project source file.
    pub fn resolve_import_to_file(&self, context_file: &Path, raw: &str) -> Option<PathBuf> {
        let path = raw
            .trim_matches(|c| c == '\'' || c == '"' || c == '`')
            .trim();
        if path.is_empty() {
            return None;
        }

        if path.starts_with('.') || path.starts_with('/') {
            if let Some(dir) = context_file.parent() {
                if let Some(found) = self.resolve_against(dir, path) {
                    return Some(found);
                }
            }
        }

        if let Some(found) = self.resolve_alias_path(path) {
            return Some(found);
        }

        tracing::debug!("cannot resolve import path {path} from {}", context_file.display());
        None
    }

    /// First existing file among `path`, `path.<ext>` and `path/index.<ext>`
    /// under `base`. Extensions are only appended when the last segment has none.
    pub fn resolve_against(&self, base: &Path, path: &str) -> Option<PathBuf> {
        let mut candidates = vec![path.to_string()];

        let last_segment = path.rsplit('/').next().unwrap_or(path);
        if !last_segment.contains('.') {
            let extensions = &self.config.extensions;
            candidates.extend(extensions.iter().map(|ext| format!("{path}{ext}")));
            candidates.extend(extensions.iter().map(|ext| format!("{path}/index{ext}")));
        }

        candidates
            .iter()
            .map(|candidate| normalize_path(&base.join(candidate)))
            .find(|candidate| self.fs.is_file(candidate))
    }

    /// Path with the alias marker removed, or `None` when `path` is not aliased
    fn strip_alias<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.config.alias_marker)?;
        Some(rest.strip_prefix('/').unwrap_or(rest))
    }

    fn resolve_alias_path(&self, path: &str) -> Option<PathBuf> {
        let sub = self.strip_alias(path)?;
        let roots = self.alias_roots();

        roots
            .roots
            .iter()
            .map(|root| normalize_path(&self.project_root.join(root)))
            .filter(|base| self.fs.is_dir(base))
            .find_map(|base| self.resolve_against(&base, sub))
    }

    /// Roots for the alias marker: path mappings, then webpack, else fallbacks.
    pub fn alias_roots(&self) -> AliasRootSet {
        let marker = self.config.alias_marker;
        let mut roots = tsconfig_alias_roots(self.fs.as_ref(), &self.project_root, &format!("{marker}/*"));
        if let Some(root) = webpack_alias_root(self.fs.as_ref(), &self.project_root, &marker.to_string()) {
            roots.push(root);
        }

        if roots.is_empty() {
            AliasRootSet::fallback(&self.config.fallback_roots)
        } else {
            AliasRootSet::configured(roots)
        }
    }
}
