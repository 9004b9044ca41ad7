//! Filesystem access used by the collector.
//!
//! [`LocalFileSystem`] talks to the real disk; [`MemoryFileSystem`] is a
//! fixture with explicit ownership, modes and failure injection.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Regular,
    Directory,
    Symlink,
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::Regular
        } else {
            EntryKind::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Regular => "regular file",
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "symlink",
            EntryKind::Other => "special file",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub uid: u32,
    pub gid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: EntryKind,
    /// Raw `st_mode`: file type bits and permission bits.
    pub mode: u32,
    /// `None` where the platform has no POSIX ownership.
    pub ownership: Option<Ownership>,
}

pub trait FileSystem {
    /// Absolute path with `.`/`..` removed and parent directories resolved.
    /// The final component is not followed if it is a symlink.
    fn resolve(&self, path: &Path) -> io::Result<PathBuf>;
    /// `lstat` of an already resolved path.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Lexically drop `.` and fold `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn empty_path_error() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "empty path")
}

pub struct LocalFileSystem {
    base_dir: PathBuf,
}

impl LocalFileSystem {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(empty_path_error());
        }
        let absolute = normalize(&self.base_dir.join(path));
        match (absolute.parent(), absolute.file_name()) {
            (Some(parent), Some(name)) => Ok(fs::canonicalize(parent)?.join(name)),
            _ => Ok(absolute),
        }
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::symlink_metadata(path)?;
        Ok(stat_from_metadata(&metadata))
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

#[cfg(unix)]
fn stat_from_metadata(metadata: &fs::Metadata) -> FileStat {
    use std::os::unix::fs::MetadataExt;

    FileStat {
        kind: EntryKind::from_file_type(metadata.file_type()),
        mode: metadata.mode(),
        ownership: Some(Ownership {
            uid: metadata.uid(),
            gid: metadata.gid(),
        }),
    }
}

#[cfg(not(unix))]
fn stat_from_metadata(metadata: &fs::Metadata) -> FileStat {
    FileStat {
        kind: EntryKind::from_file_type(metadata.file_type()),
        mode: 0,
        ownership: None,
    }
}

pub const S_IFREG: u32 = 0o100000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFCHR: u32 = 0o020000;

const FIXTURE_OWNER: Ownership = Ownership {
    uid: 1000,
    gid: 1000,
};

#[derive(Debug, Clone)]
enum MemoryEntry {
    File {
        stat: FileStat,
        content: Vec<u8>,
        readable: bool,
    },
    Directory,
    Symlink,
    Device,
}

impl MemoryEntry {
    fn stat(&self) -> FileStat {
        match self {
            MemoryEntry::File { stat, .. } => *stat,
            MemoryEntry::Directory => FileStat {
                kind: EntryKind::Directory,
                mode: S_IFDIR | 0o755,
                ownership: Some(FIXTURE_OWNER),
            },
            MemoryEntry::Symlink => FileStat {
                kind: EntryKind::Symlink,
                mode: S_IFLNK | 0o777,
                ownership: Some(FIXTURE_OWNER),
            },
            MemoryEntry::Device => FileStat {
                kind: EntryKind::Other,
                mode: S_IFCHR | 0o666,
                ownership: Some(Ownership { uid: 0, gid: 0 }),
            },
        }
    }
}

/// In-memory filesystem rooted at `base_dir`.
///
/// Directories exist implicitly for every ancestor of an added entry. Files
/// default to mode `0644` owned by `1000:1000`.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    base_dir: PathBuf,
    entries: BTreeMap<PathBuf, MemoryEntry>,
}

impl MemoryFileSystem {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: normalize(base_dir.as_ref()),
            entries: BTreeMap::new(),
        }
    }

    fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize(&self.base_dir.join(path))
    }

    pub fn file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.file_with(path, content, S_IFREG | 0o644, Some(FIXTURE_OWNER))
    }

    pub fn file_with(
        mut self,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
        mode: u32,
        ownership: Option<Ownership>,
    ) -> Self {
        let stat = FileStat {
            kind: EntryKind::Regular,
            mode,
            ownership,
        };
        let entry = MemoryEntry::File {
            stat,
            content: content.into(),
            readable: true,
        };
        let key = self.absolute(path);
        self.entries.insert(key, entry);
        self
    }

    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        let key = self.absolute(path);
        self.entries.insert(key, MemoryEntry::Directory);
        self
    }

    pub fn symlink(mut self, path: impl AsRef<Path>) -> Self {
        let key = self.absolute(path);
        self.entries.insert(key, MemoryEntry::Symlink);
        self
    }

    /// Character device, reported as a special file.
    pub fn device(mut self, path: impl AsRef<Path>) -> Self {
        let key = self.absolute(path);
        self.entries.insert(key, MemoryEntry::Device);
        self
    }

    /// Make reads of an existing file fail with `PermissionDenied`.
    pub fn unreadable(mut self, path: impl AsRef<Path>) -> Self {
        let key = self.absolute(path);
        if let Some(MemoryEntry::File { readable, .. }) = self.entries.get_mut(&key) {
            *readable = false;
        }
        self
    }

    fn is_directory(&self, path: &Path) -> bool {
        if path.parent().is_none() {
            return true;
        }
        match self.entries.get(path) {
            Some(MemoryEntry::Directory) => true,
            Some(_) => false,
            None => self
                .entries
                .keys()
                .any(|key| key != path && key.starts_with(path)),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

impl FileSystem for MemoryFileSystem {
    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(empty_path_error());
        }
        let absolute = self.absolute(path);
        if let Some(parent) = absolute.parent()
            && !self.is_directory(parent)
        {
            return Err(not_found(parent));
        }
        Ok(absolute)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        if let Some(entry) = self.entries.get(path) {
            return Ok(entry.stat());
        }
        if self.is_directory(path) {
            return Ok(MemoryEntry::Directory.stat());
        }
        Err(not_found(path))
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.entries.get(path) {
            Some(MemoryEntry::File {
                content,
                readable: true,
                ..
            }) => Ok(content.clone()),
            Some(MemoryEntry::File { .. }) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            )),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }
}
