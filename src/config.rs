//! Configuration module for props resolution.
//!
//! Settings are layered:
//! - Default values
//! - TOML configuration file (`.propslens/settings.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PL_` and use double underscores
//! to separate nested levels:
//! - `PL_HINTS__MAX_PROPS_TO_SHOW=10` sets `hints.max_props_to_show`
//! - `PL_CACHE__EXPIRATION_MS=2000` sets `cache.expiration_ms`
//! - `PL_DEBUG=true` sets `debug`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Directory holding the settings file, searched upward from the current directory
pub const CONFIG_DIR: &str = ".propslens";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Project root used for alias resolution and config file lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,

    /// Global debug mode (raises the default log level)
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Inline hint rendering
    #[serde(default)]
    pub hints: HintsConfig,

    /// Result cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Import and alias resolution
    #[serde(default)]
    pub resolution: ResolutionConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HintsConfig {
    /// Maximum number of props rendered per annotated spread
    #[serde(default = "default_max_props_to_show")]
    pub max_props_to_show: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Entries older than this are treated as absent
    #[serde(default = "default_expiration_ms")]
    pub expiration_ms: u64,

    /// Upper bound on cached spread nodes
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ResolutionConfig {
    /// Leading character marking an alias-prefixed import path
    #[serde(default = "default_alias_marker")]
    pub alias_marker: char,

    /// Roots tried when neither tsconfig nor webpack config defines the alias
    #[serde(default = "default_fallback_roots")]
    pub fallback_roots: Vec<String>,

    /// Extensions appended to extension-less import paths, in order
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Maximum number of reference/import hops followed for one spread
    #[serde(default = "default_max_resolution_depth")]
    pub max_resolution_depth: usize,
}

fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_max_props_to_show() -> usize {
    20
}
fn default_expiration_ms() -> u64 {
    5000
}
fn default_max_entries() -> usize {
    4096
}
fn default_alias_marker() -> char {
    '@'
}
fn default_fallback_roots() -> Vec<String> {
    [
        "src",
        "app/javascript/src",
        "app/javascript",
        "frontend/src",
        "resources/js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_extensions() -> Vec<String> {
    [".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".vue"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_max_resolution_depth() -> usize {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            project_root: None,
            debug: false,
            hints: HintsConfig::default(),
            cache: CacheConfig::default(),
            resolution: ResolutionConfig::default(),
        }
    }
}

impl Default for HintsConfig {
    fn default() -> Self {
        Self {
            max_props_to_show: default_max_props_to_show(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expiration_ms: default_expiration_ms(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            alias_marker: default_alias_marker(),
            fallback_roots: default_fallback_roots(),
            extensions: default_extensions(),
            max_resolution_depth: default_max_resolution_depth(),
        }
    }
}

impl CacheConfig {
    pub fn expiration(&self) -> Duration {
        Duration::from_millis(self.expiration_ms)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(&config_path)
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
            .map(|mut settings: Settings| {
                if settings.project_root.is_none() {
                    settings.project_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file (plus environment overrides)
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::figment(path.as_ref())
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscores stay
            .merge(Env::prefixed("PL_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the settings file by looking for the config directory upward
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Directory containing the config directory, searched from the current directory up
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Project root for alias resolution, defaulting to the current directory
    pub fn project_root(&self) -> PathBuf {
        self.project_root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
