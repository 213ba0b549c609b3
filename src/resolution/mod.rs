//! Props resolution: locating the object literal behind a spread and
//! extracting prop descriptions from it.

pub mod engine;
pub mod exports;

pub use engine::{LiteralRef, PropsResolver, ResolutionTarget};
pub use exports::{ExportTarget, find_default_export, find_named_export, import_source};
