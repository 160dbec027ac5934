use super::r#trait::is_excluded_dir;
use super::{FileListing, FileMetadata, FileSystem, FileType, WalkOptions};
use anyhow::{anyhow, Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let meta = fs::metadata(path).context(format!("Failed to get metadata for {:?}", path))?;

        let file_type = if meta.is_file() {
            FileType::File
        } else if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::Symlink
        };

        Ok(FileMetadata {
            size: meta.len(),
            file_type,
        })
    }

    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        let file = fs::File::open(path).context(format!("Failed to open file {:?}", path))?;
        let mut buffer = Vec::new();
        file.take(max_bytes as u64)
            .read_to_end(&mut buffer)
            .context(format!("Failed to read bytes from {:?}", path))?;
        Ok(buffer)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = fs::read_dir(path)
            .context(format!("Failed to read directory {:?}", path))?
            .map(|entry| {
                entry
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .context("Failed to read directory entry")
            })
            .collect::<Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .context(format!("Failed to canonicalize path {:?}", path))
    }

    fn walk_files(&self, root: &Path, options: WalkOptions) -> Result<FileListing> {
        if !root.is_dir() {
            return Err(anyhow!("Not a directory: {:?}", root));
        }

        let mut files = Vec::new();
        let mut truncated = false;

        // standard_filters(false) drops hidden-file, .ignore and every
        // gitignore source, including ones in directories above `root`.
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .max_depth(Some(options.max_depth))
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| {
                let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
                entry.depth() == 0
                    || !is_dir
                    || !entry.file_name().to_str().map(is_excluded_dir).unwrap_or(false)
            })
            .build();

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                if entry.depth() == options.max_depth && has_entries(entry.path()) {
                    trace!(dir = %entry.path().display(), "Directory below depth limit not walked");
                    truncated = true;
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            if files.len() >= options.max_files {
                warn!(
                    max_files = options.max_files,
                    root = %root.display(),
                    "Reached file limit, stopping walk"
                );
                truncated = true;
                break;
            }

            if let Ok(rel) = entry.path().strip_prefix(root) {
                files.push(rel.to_path_buf());
            }
        }

        files.sort();
        trace!(count = files.len(), truncated, root = %root.display(), "Walked project files");
        Ok(FileListing { files, truncated })
    }
}

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
