//! Syntax layer: parsed files, node roles, in-file name resolution and the
//! file store shared by everything above it.

pub mod node;
pub mod scope;
pub mod source;
pub mod store;

pub use node::NodeRole;
pub use scope::{Declaration, ImportBinding, ImportKind, find_local_variable, resolve_reference};
pub use source::{FileKind, SourceFile};
pub use store::{DiskFileSystem, FileSystem, MemoryFileSystem, SourceStore, normalize_path};
