use super::r#trait::is_excluded_dir;
use super::{FileListing, FileMetadata, FileSystem, FileType, WalkOptions};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
    pub link_target: Option<PathBuf>,
}

impl MockEntry {
    fn dir() -> Self {
        Self {
            content: None,
            file_type: FileType::Directory,
            link_target: None,
        }
    }
}

/// In-memory file system keyed by absolute path
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            files: RwLock::new(BTreeMap::new()),
            root,
        };
        let root = fs.root.clone();
        fs.add_dir(root);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.insert(
            path.as_ref(),
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
                link_target: None,
            },
        );
    }

    /// A file that exists but fails every read
    pub fn add_unreadable_file(&self, path: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            MockEntry {
                content: None,
                file_type: FileType::File,
                link_target: None,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::dir());
    }

    /// A symlink at `path` resolving to the absolute `target`
    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        self.insert(
            path.as_ref(),
            MockEntry {
                content: None,
                file_type: FileType::Symlink,
                link_target: Some(self.normalize_path(target.as_ref())),
            },
        );
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let path = self.normalize_path(path);
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }
        files.insert(path, entry);
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let mut normalized = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::ParentDir => {
                    normalized.pop();
                }
                Component::CurDir => {}
                other => normalized.push(other),
            }
        }
        normalized
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert_with(MockEntry::dir);
        }
    }

    /// Follow symlinks to the final entry, giving up after a few hops
    fn resolve(&self, path: &Path) -> Option<(PathBuf, MockEntry)> {
        let files = self.files.read().unwrap();
        let mut current = self.normalize_path(path);

        for _ in 0..8 {
            let entry = files.get(&current)?;
            match &entry.link_target {
                Some(target) => current = target.clone(),
                None => return Some((current, entry.clone())),
            }
        }
        None
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path)
            .map(|(_, e)| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve(path)
            .map(|(_, e)| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let (_, entry) = self
            .resolve(path)
            .ok_or_else(|| anyhow!("Path not found: {:?}", path))?;

        Ok(FileMetadata {
            size: entry.content.as_ref().map(|c| c.len() as u64).unwrap_or(0),
            file_type: entry.file_type,
        })
    }

    fn read_bytes(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        let (_, entry) = self
            .resolve(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        let content = entry
            .content
            .ok_or_else(|| anyhow!("Cannot read file: {:?}", path))?;
        let bytes = content.as_bytes();
        Ok(bytes[..bytes.len().min(max_bytes)].to_vec())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        let (dir, entry) = self
            .resolve(path)
            .ok_or_else(|| anyhow!("Directory not found: {:?}", path))?;
        if entry.file_type != FileType::Directory {
            return Err(anyhow!("Not a directory: {:?}", dir));
        }

        let files = self.files.read().unwrap();
        Ok(files
            .keys()
            .filter(|p| p.parent() == Some(dir.as_path()))
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.resolve(path)
            .map(|(p, _)| p)
            .ok_or_else(|| anyhow!("Path not found: {:?}", path))
    }

    fn walk_files(&self, root: &Path, options: WalkOptions) -> Result<FileListing> {
        let root = self.normalize_path(root);
        if !self.is_dir(&root) {
            return Err(anyhow!("Not a directory: {:?}", root));
        }

        let files = self.files.read().unwrap();
        let mut listing = FileListing::default();

        for (path, entry) in files.iter() {
            if entry.file_type != FileType::File {
                continue;
            }
            let Ok(rel) = path.strip_prefix(&root) else {
                continue;
            };

            let components: Vec<&str> = rel
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect();
            let dirs = &components[..components.len().saturating_sub(1)];
            if dirs.iter().any(|d| is_excluded_dir(d)) {
                continue;
            }
            if components.len() > options.max_depth {
                listing.truncated = true;
                continue;
            }

            if listing.files.len() >= options.max_files {
                listing.truncated = true;
                break;
            }
            listing.files.push(rel.to_path_buf());
        }

        listing.files.sort();
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", "hello");

        assert!(fs.exists(Path::new("/mock/test.txt")));
        assert!(fs.is_file(Path::new("/mock/test.txt")));
    }

    #[test]
    fn test_parent_directories_created() {
        let fs = MockFileSystem::new();
        fs.add_file("a/b/c/file.txt", "content");

        assert!(fs.is_dir(Path::new("/mock/a")));
        assert!(fs.is_dir(Path::new("/mock/a/b/c")));
        assert!(fs.is_file(Path::new("/mock/a/b/c/file.txt")));
    }

    #[test]
    fn test_read_bytes() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", "hello world");

        let bytes = fs.read_bytes(Path::new("/mock/test.txt"), 5).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_unreadable_file() {
        let fs = MockFileSystem::new();
        fs.add_unreadable_file("secret.txt");

        assert!(fs.is_file(Path::new("/mock/secret.txt")));
        assert!(fs.read_bytes(Path::new("/mock/secret.txt"), 16).is_err());
    }

    #[test]
    fn test_symlink_resolution() {
        let fs = MockFileSystem::new();
        fs.add_file("/etc/passwd", "root:x:0:0");
        fs.add_symlink("link", "/etc/passwd");

        assert!(fs.is_file(Path::new("/mock/link")));
        assert_eq!(
            fs.canonicalize(Path::new("/mock/link")).unwrap(),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn test_list_dir() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", "content");
        fs.add_file("subdir/nested.txt", "nested");

        assert_eq!(fs.list_dir(Path::new("/mock")).unwrap(), vec!["subdir", "test.txt"]);
        assert!(fs.list_dir(Path::new("/mock/test.txt")).is_err());
    }

    #[test]
    fn test_walk_files() {
        let fs = MockFileSystem::new();
        fs.add_file("src/app.py", "");
        fs.add_file("README.md", "");
        fs.add_file("node_modules/x/index.js", "");
        fs.add_symlink("linked.py", "/elsewhere/file.py");

        let listing = fs.walk_files(Path::new("/mock"), WalkOptions::default()).unwrap();
        assert_eq!(
            listing.files,
            vec![PathBuf::from("README.md"), PathBuf::from("src/app.py")]
        );
        assert!(!listing.truncated);
    }

    #[test]
    fn test_walk_files_reports_truncation() {
        let fs = MockFileSystem::new();
        fs.add_file("a.py", "");
        fs.add_file("b.py", "");
        fs.add_file("pkg/deep/c.py", "");

        let capped = WalkOptions {
            max_depth: 12,
            max_files: 2,
        };
        let listing = fs.walk_files(Path::new("/mock"), capped).unwrap();
        assert_eq!(listing.files, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
        assert!(listing.truncated);

        let shallow = WalkOptions {
            max_depth: 2,
            max_files: 100,
        };
        let listing = fs.walk_files(Path::new("/mock"), shallow).unwrap();
        assert_eq!(listing.files.len(), 2);
        assert!(listing.truncated);
    }

    #[test]
    fn test_with_root() {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_file("src/main.rs", "fn main() {}");

        assert!(fs.is_dir(Path::new("/repo")));
        let content = fs.read_bytes(Path::new("/repo/src/main.rs"), 1024).unwrap();
        assert_eq!(content, b"fn main() {}");
    }
}
