//! Error types for catalog loading and classification runs
//!
//! Only two kinds of failure ever reach a caller: a catalog that fails
//! validation, and a project root that cannot be scanned at all. Per-file
//! problems during a scan are recorded as evidence instead.

use crate::catalog::Axis;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog ({format}): {message}")]
    Parse { format: String, message: String },

    #[error("Unsupported catalog file extension: {0:?} (expected .yaml, .yml, .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("Duplicate category id: {0}")]
    DuplicateCategory(String),

    #[error("Duplicate signal id: {0}")]
    DuplicateSignal(String),

    #[error("Signal {signal} has non-positive weight {weight}")]
    NonPositiveWeight { signal: String, weight: f64 },

    #[error("Signal {signal} has an invalid target: {reason}")]
    InvalidTarget { signal: String, reason: String },

    #[error("Category {category} has an invalid version extractor: {reason}")]
    InvalidVersionExtractor { category: String, reason: String },

    #[error("Category {0} declares no signals")]
    EmptyCategory(String),

    #[error("Category {category} has minimum confidence {value}, expected 0-100")]
    InvalidMinimumConfidence { category: String, value: u32 },

    #[error("Catalog declares no categories")]
    Empty,

    #[error("Catalog declares axis {found}, expected {expected}")]
    AxisMismatch { expected: Axis, found: Axis },

    #[error("Invalid id {0:?}: ids must be non-empty and contain no whitespace")]
    InvalidId(String),
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Project root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Project root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("Project root cannot be listed: {path}: {message}")]
    RootUnreadable { path: PathBuf, message: String },

    #[error("Classification timed out after {0} seconds")]
    Timeout(u64),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
