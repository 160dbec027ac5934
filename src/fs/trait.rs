//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Directory names never descended into while walking a project.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "venv",
    ".venv",
    "vendor",
    "build",
    "dist",
    "target",
    "__pycache__",
];

/// Metadata about a file
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub file_type: FileType,
}

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

impl FileMetadata {
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Bounds for [`FileSystem::walk_files`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    pub max_depth: usize,
    pub max_files: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: 12,
            max_files: 5000,
        }
    }
}

/// Files found by [`FileSystem::walk_files`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListing {
    /// Paths relative to the walked root, sorted
    pub files: Vec<PathBuf>,
    /// The walk stopped at a depth or file-count bound before seeing everything
    pub truncated: bool,
}

pub(crate) fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

/// Read-only abstraction over file system operations for testability
pub trait FileSystem: Send + Sync {
    /// Check if a path exists (follows symlinks)
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory (follows symlinks)
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file (follows symlinks)
    fn is_file(&self, path: &Path) -> bool;

    /// Get file/directory metadata
    fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Read first N bytes of file
    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>>;

    /// Names of the entries directly under a directory, sorted
    fn list_dir(&self, path: &Path) -> Result<Vec<String>>;

    /// Canonicalize a path, resolving symlinks
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Regular files under `root`, relative to it and sorted.
    ///
    /// Symlinks are not followed and [`EXCLUDED_DIRS`] are skipped. Ignore
    /// files are not consulted, so the listing depends on nothing outside
    /// `root`.
    fn walk_files(&self, root: &Path, options: WalkOptions) -> Result<FileListing>;
}
