//! Error types for props resolution
//!
//! Resolution distinguishes two kinds of failure. A host-issued cancellation must
//! always reach the caller untouched, while every other failure degrades to an
//! empty result. Misses (unresolvable references, missing files, unsupported
//! shapes) are not errors at all and are expressed as `None` or empty maps.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Marker for a cooperative cancellation raised by the host.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("resolution cancelled by host")]
pub struct Cancelled;

/// Outcome of any step of props resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Host asked to stop. Never logged, never mapped to a default value.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// Unexpected failure while resolving
    #[error("resolution failed: {reason}")]
    Failed {
        reason: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync + 'static>>,
        /// Errors raised while handling this one (cleanup, fallbacks)
        suppressed: Vec<ResolveError>,
    },
}

impl ResolveError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            source: None,
            suppressed: Vec::new(),
        }
    }

    pub fn failed_with(
        reason: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            reason: reason.into(),
            source: Some(Box::new(source)),
            suppressed: Vec::new(),
        }
    }

    /// Attach an error that occurred while this one was being handled.
    pub fn with_suppressed(mut self, error: ResolveError) -> Self {
        if let Self::Failed { suppressed, .. } = &mut self {
            suppressed.push(error);
        }
        self
    }

    /// True when a cancellation appears anywhere in this error: the error
    /// itself, its `source()` chain, or its suppressed list.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled(_) => true,
            Self::Failed {
                source, suppressed, ..
            } => {
                source
                    .as_deref()
                    .is_some_and(|s| chain_contains_cancellation(s as &(dyn StdError + 'static)))
                    || suppressed.iter().any(ResolveError::is_cancelled)
            }
        }
    }

    /// Collapse into the cancellation marker when one is present.
    pub fn into_cancelled(self) -> Result<Cancelled, ResolveError> {
        if self.is_cancelled() {
            Ok(Cancelled)
        } else {
            Err(self)
        }
    }

    pub fn status_code(&self) -> String {
        match self {
            Self::Cancelled(_) => "RESOLUTION_CANCELLED",
            Self::Failed { .. } => "RESOLUTION_FAILED",
        }
        .to_string()
    }
}

fn chain_contains_cancellation(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if err.is::<Cancelled>() {
            return true;
        }
        if let Some(resolve) = err.downcast_ref::<ResolveError>() {
            if resolve.is_cancelled() {
                return true;
            }
        }
        current = err.source();
    }
    false
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors raised while building a syntax tree for a source file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("Parser produced no tree for '{path}'")]
    NoTree { path: PathBuf },

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ParseError {
    pub fn status_code(&self) -> String {
        match self {
            Self::ParserInit { .. } => "PARSER_INIT_ERROR",
            Self::NoTree { .. } => "PARSE_ERROR",
            Self::FileRead { .. } => "FILE_READ_ERROR",
        }
        .to_string()
    }
}

impl From<ParseError> for ResolveError {
    fn from(err: ParseError) -> Self {
        ResolveError::failed_with("could not build syntax tree", err)
    }
}

/// Errors raised while loading or saving settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("Failed to write settings to '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub fn status_code(&self) -> String {
        match self {
            Self::Invalid(_) => "CONFIG_ERROR",
            Self::Write { .. } => "FILE_WRITE_ERROR",
            Self::Serialize(_) => "CONFIG_SERIALIZE_ERROR",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("wrapper: {inner}")]
    struct Wrapper {
        inner: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    }

    #[test]
    fn direct_cancellation_is_detected() {
        assert!(ResolveError::from(Cancelled).is_cancelled());
    }

    #[test]
    fn cancellation_in_source_chain_is_detected() {
        let middle = Wrapper {
            inner: "middle".into(),
            source: Box::new(Cancelled),
        };
        let outer = ResolveError::failed_with("outer", middle);
        assert!(outer.is_cancelled());
    }

    #[test]
    fn cancellation_in_nested_resolve_error_is_detected() {
        let inner = ResolveError::from(Cancelled);
        let outer = ResolveError::failed_with("outer", inner);
        assert!(outer.is_cancelled());
    }

    #[test]
    fn cancellation_in_suppressed_is_detected() {
        let err = ResolveError::failed("main").with_suppressed(ResolveError::from(Cancelled));
        assert!(err.is_cancelled());
        assert_eq!(err.into_cancelled().unwrap(), Cancelled);
    }

    #[test]
    fn plain_failures_are_not_cancellation() {
        let io = std::io::Error::other("inner");
        let err = ResolveError::failed_with("outer", io);
        assert!(!err.is_cancelled());
        assert!(!ResolveError::failed("regular").is_cancelled());
        assert_eq!(
            ResolveError::failed("x").with_suppressed(ResolveError::failed("y")).status_code(),
            "RESOLUTION_FAILED"
        );
    }
}
