/// The main library module for propslens
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod guard;
pub mod hints;
pub mod logging;
pub mod model;
pub mod parsing;
pub mod project_resolver;
pub mod resolution;
pub mod service;

// Explicit exports for better API clarity
pub use cache::{CacheKey, PropsCache};
pub use config::Settings;
pub use error::{Cancelled, ConfigError, ParseError, ResolveError, ResolveResult};
pub use guard::{ResolveContext, cancellation_safe, recover};
pub use hints::{PropHint, PropsMarker, collect_hints, collect_markers};
pub use model::{PropInfo, PropsMap};
pub use parsing::{DiskFileSystem, FileSystem, MemoryFileSystem, SourceFile, SourceStore};
pub use project_resolver::ImportResolver;
pub use service::PropsService;
pub use tokio_util::sync::CancellationToken;
