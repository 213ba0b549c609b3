//! File access and parsed-file store
//!
//! Resolution never touches `std::fs` directly. Reads go through a
//! [`FileSystem`] so hosts can serve unsaved editor buffers and tests can run
//! against an in-memory tree. [`SourceStore`] keeps one parsed [`SourceFile`]
//! per path and hands out shared handles.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::source::SourceFile;
use crate::error::ParseError;

/// Read-only view of the project files
pub trait FileSystem: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Files held in memory. Directories exist implicitly as prefixes of file paths.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .write()
            .insert(normalize_path(path.as_ref()), content.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .write()
            .remove(&normalize_path(path.as_ref()))
            .is_some()
    }
}

impl FileSystem for MemoryFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.files.read().contains_key(&normalize_path(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let dir = normalize_path(path);
        self.files
            .read()
            .keys()
            .any(|file| file != &dir && file.starts_with(&dir))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .read()
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}

/// Lexically resolve `.` and `..` without touching the disk.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Where the stored text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Host-provided buffer; authoritative until closed
    Editor,
    /// Read through the file system; re-read on every load
    Disk,
}

#[derive(Debug)]
struct StoredFile {
    file: Arc<SourceFile>,
    origin: Origin,
}

/// Parsed files keyed by normalized path
pub struct SourceStore {
    fs: Arc<dyn FileSystem>,
    files: DashMap<PathBuf, StoredFile>,
}

impl std::fmt::Debug for SourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceStore")
            .field("files", &self.files.len())
            .finish()
    }
}

impl SourceStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            files: DashMap::new(),
        }
    }

    /// Store backed by the real file system
    pub fn on_disk() -> Self {
        Self::new(Arc::new(DiskFileSystem))
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Register in-editor content for `path`, replacing what was stored.
    /// Loads return this text until the path is closed.
    pub fn open(
        &self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Result<Arc<SourceFile>, ParseError> {
        let path = normalize_path(path.as_ref());
        let file = Arc::new(SourceFile::parse(path.clone(), text)?);
        self.files.insert(
            path,
            StoredFile {
                file: Arc::clone(&file),
                origin: Origin::Editor,
            },
        );
        Ok(file)
    }

    /// Same as [`SourceStore::open`]; reads better at edit sites.
    pub fn update(
        &self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Result<Arc<SourceFile>, ParseError> {
        self.open(path, text)
    }

    /// Parsed file for `path`.
    ///
    /// Editor buffers are returned as stored. Anything else is read through
    /// the file system each time and re-parsed only when its text changed.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<SourceFile>, ParseError> {
        let path = normalize_path(path.as_ref());
        if let Some(stored) = self.files.get(&path) {
            if stored.origin == Origin::Editor {
                return Ok(Arc::clone(&stored.file));
            }
        }

        let text = match self.fs.read_to_string(&path) {
            Ok(text) => text,
            Err(source) => {
                self.files
                    .remove_if(&path, |_, stored| stored.origin == Origin::Disk);
                return Err(ParseError::FileRead { path, source });
            }
        };

        if let Some(stored) = self.files.get(&path) {
            if stored.origin == Origin::Editor || stored.file.text() == text {
                return Ok(Arc::clone(&stored.file));
            }
        }

        tracing::trace!("parsing {}", path.display());
        let file = Arc::new(SourceFile::parse(path.clone(), text)?);

        // An editor buffer opened meanwhile wins over what was read.
        match self.files.entry(path) {
            Entry::Occupied(mut slot) => {
                if slot.get().origin == Origin::Disk {
                    slot.insert(StoredFile {
                        file,
                        origin: Origin::Disk,
                    });
                }
                Ok(Arc::clone(&slot.get().file))
            }
            Entry::Vacant(slot) => Ok(Arc::clone(
                &slot
                    .insert(StoredFile {
                        file,
                        origin: Origin::Disk,
                    })
                    .file,
            )),
        }
    }

    /// Forget `path`; the next load reads it again.
    pub fn close(&self, path: impl AsRef<Path>) {
        self.files.remove(&normalize_path(path.as_ref()));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Test file system that cancels `token` when `trigger` is read
#[cfg(test)]
pub(crate) struct CancelOnRead {
    inner: MemoryFileSystem,
    trigger: PathBuf,
    token: tokio_util::sync::CancellationToken,
}

#[cfg(test)]
impl CancelOnRead {
    pub(crate) fn new(
        inner: MemoryFileSystem,
        trigger: impl AsRef<Path>,
        token: tokio_util::sync::CancellationToken,
    ) -> Self {
        Self {
            inner,
            trigger: normalize_path(trigger.as_ref()),
            token,
        }
    }
}

#[cfg(test)]
impl FileSystem for CancelOnRead {
    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if normalize_path(path) == self.trigger {
            self.token.cancel();
        }
        self.inner.read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dots() {
        assert_eq!(
            normalize_path(Path::new("/p/src/components/../shared/./props.js")),
            PathBuf::from("/p/src/shared/props.js")
        );
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn memory_file_system_dirs_are_prefixes() {
        let fs = MemoryFileSystem::new();
        fs.insert("/p/src/shared/props.js", "export default {}");
        assert!(fs.is_file(Path::new("/p/src/shared/props.js")));
        assert!(fs.is_dir(Path::new("/p/src")));
        assert!(fs.is_dir(Path::new("/p/src/shared")));
        assert!(!fs.is_dir(Path::new("/p/src/shared/props.js")));
        assert!(!fs.is_dir(Path::new("/p/lib")));
        assert!(fs.read_to_string(Path::new("/p/lib/x.js")).is_err());
        assert!(fs.remove("/p/src/shared/props.js"));
        assert!(!fs.is_dir(Path::new("/p/src")));
    }

    #[test]
    fn load_caches_parsed_file() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/p/a.js", "export default { a: String }");
        let store = SourceStore::new(fs.clone());

        let first = store.load("/p/./a.js").unwrap();
        let second = store.load("/p/a.js").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);

        store.close("/p/a.js");
        let third = store.load("/p/a.js").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn open_overrides_disk_content() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/p/a.js", "const a = 1");
        let store = SourceStore::new(fs);

        store.open("/p/a.js", "const b = 2").unwrap();
        assert_eq!(store.load("/p/a.js").unwrap().text(), "const b = 2");
        store.update("/p/a.js", "const c = 3").unwrap();
        assert_eq!(store.load("/p/a.js").unwrap().text(), "const c = 3");
    }

    #[test]
    fn load_reparses_changed_disk_content() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/p/a.js", "export default { a: String }");
        let store = SourceStore::new(fs.clone());
        let first = store.load("/p/a.js").unwrap();

        fs.insert("/p/a.js", "export default { b: Number }");
        let second = store.load("/p/a.js").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.text(), "export default { b: Number }");
        assert!(Arc::ptr_eq(&second, &store.load("/p/a.js").unwrap()));
    }

    #[test]
    fn editor_buffer_is_not_replaced_by_disk() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/p/a.js", "const a = 1");
        let store = SourceStore::new(fs.clone());

        store.open("/p/a.js", "const b = 2").unwrap();
        fs.insert("/p/a.js", "const c = 3");
        assert_eq!(store.load("/p/a.js").unwrap().text(), "const b = 2");

        store.close("/p/a.js");
        assert_eq!(store.load("/p/a.js").unwrap().text(), "const c = 3");
    }

    #[test]
    fn deleted_file_is_dropped() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.insert("/p/a.js", "const a = 1");
        let store = SourceStore::new(fs.clone());
        store.load("/p/a.js").unwrap();
        assert_eq!(store.len(), 1);

        fs.remove("/p/a.js");
        assert!(store.load("/p/a.js").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn missing_file_is_read_error() {
        let store = SourceStore::new(Arc::new(MemoryFileSystem::new()));
        let err = store.load("/p/missing.js").unwrap_err();
        assert_eq!(err.status_code(), "FILE_READ_ERROR");
    }
}
