//! stackprobe - signal-based classification of software projects
//!
//! A project directory is classified along independent axes: its technology
//! stack (framework), its development phase, its primary language and its
//! monorepo workspace manager. Each axis is described by a [`Catalog`] of
//! categories and weighted signals. The [`Classifier`] evaluates every signal
//! against the project, turns the fired weight of each category into a 0-100
//! confidence, and ranks the categories into a [`DetectionReport`] carrying
//! the best answer, the alternates and the full evidence trail.
//!
//! # Example
//!
//! ```no_run
//! use stackprobe::{Catalog, Classifier};
//! use std::path::Path;
//!
//! let classifier = Classifier::real();
//! let stack = classifier.classify(&Catalog::builtin_stack()?, Path::new("."))?;
//! let phase = classifier.classify(&Catalog::builtin_phase()?, Path::new("."))?;
//!
//! match stack.best() {
//!     Some(best) => println!("{} ({}%)", best.display_name, best.confidence),
//!     None => println!("unknown stack"),
//! }
//! println!("phase: {:?}", phase.best().map(|b| &b.id));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Project Structure
//!
//! - [`catalog`]: catalog model, file schema and bundled catalogs
//! - [`detection`]: signal probe, scoring engine, classifier and report
//! - [`manifest`]: dependency manifest parsing
//! - [`fs`]: file system abstraction with real and in-memory implementations
//! - [`cli`]: command-line front end

pub mod catalog;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod util;

pub use catalog::{Axis, Catalog, Category, Signal, SignalKind, VersionExtractor};
pub use config::{ConfigError, ProbeLimits, StackprobeConfig};
pub use detection::{
    Artifact, BestCategory, CategoryScore, Classifier, DetectionReport, Evidence, RankedCategory,
    ScoringEngine, SignalProbe,
};
pub use error::{CatalogError, DetectError};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
