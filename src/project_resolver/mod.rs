//! Project configuration resolver
//!
//! Turns import path literals into files on the virtual filesystem. Relative
//! and absolute paths are resolved against the importing file; alias-prefixed
//! paths (`@/shared/props`) are resolved against roots derived from the
//! project's `tsconfig.json`/`jsconfig.json` path mappings or its
//! `webpack.config.js`, falling back to conventional source roots.
//!
//! This is distinct from `parsing::scope` which handles names inside one file.
//! - project_resolver: "Which file does `@/shared/props` mean?"
//! - parsing::scope: "What does the identifier `shared` refer to here?"

pub mod imports;
pub mod tsconfig;
pub mod webpack;

pub use imports::ImportResolver;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProjectConfigError {
    /// Error reading a configuration file
    #[error("config io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Configuration text could not be understood
    #[error("invalid project config: {details}")]
    Invalid { details: String },
}

impl ProjectConfigError {
    pub fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }
    pub fn invalid(details: impl Into<String>) -> Self {
        Self::Invalid {
            details: details.into(),
        }
    }
    pub fn suggestion(&self) -> &'static str {
        match self {
            ProjectConfigError::Io { .. } => "Check that the file exists and is readable.",
            ProjectConfigError::Invalid { .. } => {
                "Check JSON syntax and that extends chains do not loop."
            }
        }
    }
    /// Stable code for programmatic handling
    pub fn status_code(&self) -> String {
        match self {
            ProjectConfigError::Io { .. } => "PROJECT_CONFIG_IO",
            ProjectConfigError::Invalid { .. } => "PROJECT_CONFIG_INVALID",
        }
        .to_string()
    }
}

pub type ProjectConfigResult<T> = Result<T, ProjectConfigError>;

/// Where a set of alias roots came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasOrigin {
    /// `compilerOptions.paths` and/or a webpack `resolve.alias`
    Configured,
    /// No configuration mentioned the alias
    Fallback,
}

/// Candidate directories, relative to the project root unless absolute, that
/// an alias-prefixed import path is resolved against in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRootSet {
    pub roots: Vec<String>,
    pub origin: AliasOrigin,
}

impl AliasRootSet {
    pub fn configured(roots: Vec<String>) -> Self {
        Self {
            roots,
            origin: AliasOrigin::Configured,
        }
    }

    pub fn fallback(roots: &[String]) -> Self {
        Self {
            roots: roots.to_vec(),
            origin: AliasOrigin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == AliasOrigin::Fallback
    }
}
