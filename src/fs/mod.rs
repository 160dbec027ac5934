//! FileSystem abstraction for testable, read-only file operations

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{FileListing, FileMetadata, FileSystem, FileType, WalkOptions, EXCLUDED_DIRS};
pub use real::RealFileSystem;
