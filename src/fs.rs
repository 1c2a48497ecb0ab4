//! File system access used to read source material and manifests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// FileInfo is the subset of file metadata the generators need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub is_dir: bool,
}

/// FileSystem is the capability used to read and write files.
pub trait FileSystem {
    /// Returns metadata for `path`, or [`Error::NotFound`].
    fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Reads the whole file, or fails with [`Error::NotFound`].
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Writes `contents` to `path`, replacing anything already there.
    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

/// RealFs reads and writes the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let meta = std::fs::metadata(path).map_err(|e| Error::io(path, e))?;
        Ok(FileInfo {
            size: meta.len(),
            is_dir: meta.is_dir(),
        })
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::io(path, e))
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        std::fs::write(path, contents).map_err(|e| Error::io(path, e))
    }
}

/// MemFs is an in-memory file system for tests and dry runs.
///
/// It counts reads so callers can assert that validation happens before any
/// file is touched.
#[derive(Debug, Default)]
pub struct MemFs {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    reads: Cell<usize>,
}

impl MemFs {
    /// Creates an empty MemFs.
    pub fn new() -> Self {
        MemFs::default()
    }

    /// Adds a file, returning `self` for chaining.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> Self {
        self.files
            .borrow_mut()
            .insert(path.into(), contents.as_ref().to_vec());
        self
    }

    /// Returns how many times [`FileSystem::read_file`] was called.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl FileSystem for MemFs {
    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let files = self.files.borrow();
        if let Some(contents) = files.get(path) {
            return Ok(FileInfo {
                size: contents.len() as u64,
                is_dir: false,
            });
        }
        if files.keys().any(|p| p.starts_with(path)) {
            return Ok(FileInfo { size: 0, is_dir: true });
        }
        Err(Error::NotFound(path.to_path_buf()))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.reads.set(self.reads.get() + 1);
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))
    }

    fn write_file(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
