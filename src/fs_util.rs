//! Read-only filesystem access for validation.
//!
//! The validator never touches `std::fs` directly. It reads through a
//! [`FileSystem`] rooted at the repository being checked, so every path it
//! handles is relative to that root. [`OsFileSystem`] reads the real disk;
//! [`MemoryFileSystem`] holds an in-memory tree for tests.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::Result;

/// Kind of an existing filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file, or a symlink resolving to one.
    File,
    /// A directory.
    Dir,
}

/// Outcome of a recursive walk that kept going past unreadable entries.
#[derive(Debug, Default)]
pub struct Walk {
    /// Regular files found, sorted by path.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read, with the error for each.
    pub failures: Vec<(PathBuf, io::Error)>,
}

/// Read-only view of a repository tree. Paths are relative to the tree root.
pub trait FileSystem {
    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Kind of the entry at `path`, or `None` if nothing exists there.
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;

    /// Recursively list every regular file beneath `dir`, sorted by path.
    ///
    /// Symlinks are not followed and not listed. An entry that cannot be read
    /// is recorded in [`Walk::failures`] and the walk continues; only a `dir`
    /// that is not a listable directory fails the whole call.
    fn walk_files(&self, dir: &Path) -> Result<Walk>;

    /// Returns `true` if a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool {
        self.entry_kind(path).is_some()
    }

    /// Returns `true` if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool {
        self.entry_kind(path) == Some(EntryKind::Dir)
    }
}

/// Filesystem backed by the real disk, rooted at a repository directory.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    /// Create a filesystem rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory all paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(path))
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let meta = std::fs::metadata(self.resolve(path)).ok()?;
        Some(if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        })
    }

    fn walk_files(&self, dir: &Path) -> Result<Walk> {
        if !self.is_dir(dir) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", dir.display()),
            )
            .into());
        }
        let mut walk = Walk::default();
        let walker = WalkDir::new(self.resolve(dir))
            .follow_links(false)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map_or_else(|| dir.to_path_buf(), |p| self.relative(p));
                    walk.failures.push((path, io::Error::from(err)));
                    continue;
                }
            };
            if entry.file_type().is_file() {
                walk.files.push(self.relative(entry.path()));
            }
        }
        Ok(walk)
    }
}

/// In-memory tree of text files. Directories are implied by file paths and
/// may also be added explicitly. A directory can be marked unreadable, in
/// which case walks report it as a failure and skip its contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = normalize(path.as_ref());
        self.add_ancestors(&path);
        self.files.insert(path, content.into());
    }

    /// Add an (empty) directory and its parents.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        self.add_ancestors(&path);
        self.dirs.insert(path);
    }

    /// Add a directory that exists but cannot be listed.
    pub fn add_unreadable_dir(&mut self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        self.add_dir(&path);
        self.unreadable.insert(path);
    }

    /// Builder form of [`MemoryFileSystem::add_file`].
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.add_file(path, content);
        self
    }

    /// Builder form of [`MemoryFileSystem::add_dir`].
    #[must_use]
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path);
        self
    }

    /// Builder form of [`MemoryFileSystem::add_unreadable_dir`].
    #[must_use]
    pub fn with_unreadable_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_unreadable_dir(path);
        self
    }

    fn is_unreadable(&self, path: &Path) -> bool {
        path.ancestors().any(|a| self.unreadable.contains(a))
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                self.dirs.insert(ancestor.to_path_buf());
            }
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let path = normalize(path);
        if self.files.contains_key(&path) {
            Some(EntryKind::File)
        } else if path.as_os_str().is_empty() || self.dirs.contains(&path) {
            Some(EntryKind::Dir)
        } else {
            None
        }
    }

    fn walk_files(&self, dir: &Path) -> Result<Walk> {
        let dir = normalize(dir);
        if !self.is_dir(&dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            )
            .into());
        }
        if self.is_unreadable(&dir) {
            return Err(permission_denied(&dir).into());
        }

        let mut walk = Walk::default();
        for locked in self.unreadable.iter().filter(|d| d.starts_with(&dir)) {
            // Only the outermost unreadable directory is reachable.
            if locked.parent().is_some_and(|p| !self.is_unreadable(p)) {
                walk.failures.push((locked.clone(), permission_denied(locked)));
            }
        }
        walk.files = self
            .files
            .keys()
            .filter(|path| path.starts_with(&dir) && **path != dir)
            .filter(|path| !self.is_unreadable(path))
            .cloned()
            .collect();
        Ok(walk)
    }
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("permission denied: {}", path.display()),
    )
}

/// Lexically drop `.` segments and fold `..` segments.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
