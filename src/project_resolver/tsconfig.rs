//! tsconfig.json / jsconfig.json path mappings
//!
//! Structured JSONC parsing with `extends` chain resolution is tried first.
//! When the file cannot be parsed that way (templated configs, unusual
//! syntax) the alias entry is scraped out of the raw text instead.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::{ProjectConfigError, ProjectConfigResult};
use crate::parsing::store::{FileSystem, normalize_path};

/// Config files consulted, in order; the first one present wins.
pub const CONFIG_FILES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// Dependency directory whose mappings never point at project sources
const DEPENDENCY_DIR: &str = "node_modules";

static BASE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""baseUrl"\s*:\s*"([^"]+)""#).expect("valid baseUrl regex")
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted string regex"));

/// TypeScript compiler options subset for path resolution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Base URL for module resolution
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,

    /// Path mapping for module resolution, in file order
    #[serde(default)]
    pub paths: IndexMap<String, Vec<String>>,
}

/// Minimal tsconfig.json representation for path resolution
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TsConfig {
    /// Extends another configuration file
    pub extends: Option<String>,

    #[serde(default, rename = "compilerOptions")]
    pub compiler_options: CompilerOptions,
}

/// JSONC parsing helper using json5 for comment and trailing comma support
pub fn parse_jsonc_tsconfig(content: &str) -> ProjectConfigResult<TsConfig> {
    json5::from_str(content).map_err(|e| {
        ProjectConfigError::invalid(format!("Failed to parse tsconfig: {e}"))
    })
}

/// Read and parse a tsconfig file with JSONC support
pub fn read_tsconfig(fs: &dyn FileSystem, path: &Path) -> ProjectConfigResult<TsConfig> {
    let content = fs
        .read_to_string(path)
        .map_err(|e| ProjectConfigError::io(path.to_path_buf(), e))?;

    parse_jsonc_tsconfig(&content)
}

/// Resolve extends chain and merge configurations
///
/// 1. Relative paths are resolved relative to the extending config, bare
///    package names under `node_modules` next to it
/// 2. Configurations are merged with child overriding parent
/// 3. Cycle detection prevents infinite recursion
///
/// A parent that does not exist is skipped; the child still applies.
pub fn resolve_extends_chain(
    fs: &dyn FileSystem,
    path: &Path,
    visited: &mut HashSet<PathBuf>,
) -> ProjectConfigResult<TsConfig> {
    let path = normalize_path(path);

    if !visited.insert(path.clone()) {
        return Err(ProjectConfigError::invalid(format!(
            "Circular extends chain detected: {}",
            path.display()
        )));
    }

    let mut config = read_tsconfig(fs, &path)?;

    if let Some(extends) = config.extends.clone() {
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let parent_path = extends_target(dir, &extends);

        if fs.is_file(&parent_path) {
            let parent = resolve_extends_chain(fs, &parent_path, visited)?;
            config = merge_tsconfig(parent, config);
        } else {
            tracing::debug!(
                "tsconfig {} extends missing {}",
                path.display(),
                parent_path.display()
            );
        }
    }

    visited.remove(&path);
    Ok(config)
}

fn extends_target(dir: &Path, extends: &str) -> PathBuf {
    let target = if extends.starts_with('.') || Path::new(extends).is_absolute() {
        dir.join(extends)
    } else {
        dir.join(DEPENDENCY_DIR).join(extends)
    };

    // Add .json extension if not present
    if target.extension().is_none() {
        target.with_extension("json")
    } else {
        target
    }
}

/// Merge two tsconfig objects, with child overriding parent
fn merge_tsconfig(parent: TsConfig, child: TsConfig) -> TsConfig {
    TsConfig {
        extends: child.extends,
        compiler_options: CompilerOptions {
            base_url: child
                .compiler_options
                .base_url
                .or(parent.compiler_options.base_url),
            paths: {
                let mut merged = parent.compiler_options.paths;
                merged.extend(child.compiler_options.paths);
                merged
            },
        },
    }
}

/// Alias roots for `alias_key` (e.g. `@/*`) from a parsed config
pub fn alias_roots(config: &TsConfig, alias_key: &str) -> Vec<String> {
    let Some(targets) = config.compiler_options.paths.get(alias_key) else {
        return Vec::new();
    };
    normalize_targets(
        targets.iter().map(String::as_str),
        config.compiler_options.base_url.as_deref(),
    )
}

/// Alias roots for `alias_key` scraped from raw config text
pub fn scrape_alias_roots(text: &str, alias_key: &str) -> Vec<String> {
    let base_url = BASE_URL
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.trim().is_empty());

    let pattern = format!(r#"(?s)"{}"\s*:\s*\[(.*?)\]"#, regex::escape(alias_key));
    let Ok(mapping) = Regex::new(&pattern) else {
        return Vec::new();
    };
    let Some(entries) = mapping.captures(text).and_then(|c| c.get(1)) else {
        return Vec::new();
    };

    let targets: Vec<&str> = QUOTED
        .captures_iter(entries.as_str())
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    normalize_targets(targets.into_iter(), base_url)
}

/// Strip `/*` and `./`, drop dependency-dir targets, prefix `baseUrl`, dedupe.
fn normalize_targets<'a>(
    targets: impl Iterator<Item = &'a str>,
    base_url: Option<&str>,
) -> Vec<String> {
    let mut roots: Vec<String> = Vec::new();
    for raw in targets {
        let mut target = raw.strip_suffix("/*").unwrap_or(raw);
        target = target.strip_prefix("./").unwrap_or(target);
        if target.starts_with(DEPENDENCY_DIR) {
            continue;
        }
        let root = match base_url {
            Some(base) if !target.starts_with('/') => format!("{base}/{target}"),
            _ => target.to_string(),
        };
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

/// Alias roots from the first config file found in `project_root`.
pub fn tsconfig_alias_roots(fs: &dyn FileSystem, project_root: &Path, alias_key: &str) -> Vec<String> {
    let Some(path) = CONFIG_FILES
        .iter()
        .map(|name| project_root.join(name))
        .find(|candidate| fs.is_file(candidate))
    else {
        return Vec::new();
    };

    match resolve_extends_chain(fs, &path, &mut HashSet::new()) {
        Ok(config) => alias_roots(&config, alias_key),
        Err(e) => {
            tracing::warn!(
                "{} ({}), scraping {} instead",
                e,
                e.status_code(),
                path.display()
            );
            fs.read_to_string(&path)
                .map(|text| scrape_alias_roots(&text, alias_key))
                .unwrap_or_default()
        }
    }
}
