//! Signal catalogs
//!
//! A catalog is the static, data-driven registry of categories for one
//! classification axis and the weighted signals supporting each category.
//! Catalogs are validated completely when loaded and are read-only afterwards;
//! see [`schema`] for the on-disk format.

mod builtin;
mod glob;
pub mod schema;

pub use glob::GlobPattern;

use crate::error::{CatalogError, CatalogResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Classification axis; every category in a catalog shares it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Framework,
    Phase,
    Language,
    Workspace,
}

impl Axis {
    /// Every axis, in report order
    pub const ALL: [Axis; 4] = [Axis::Framework, Axis::Phase, Axis::Language, Axis::Workspace];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Framework => write!(f, "framework"),
            Axis::Phase => write!(f, "phase"),
            Axis::Language => write!(f, "language"),
            Axis::Workspace => write!(f, "workspace"),
        }
    }
}

/// The kind of primitive check a signal performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKindTag {
    FileExists,
    PathGlobMatches,
    FileContentMatchesPattern,
    ManifestDeclaresDependency,
    DirectoryExists,
}

impl fmt::Display for SignalKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKindTag::FileExists => "file-exists",
            SignalKindTag::PathGlobMatches => "path-glob-matches",
            SignalKindTag::FileContentMatchesPattern => "file-content-matches-pattern",
            SignalKindTag::ManifestDeclaresDependency => "manifest-declares-dependency",
            SignalKindTag::DirectoryExists => "directory-exists",
        };
        write!(f, "{}", s)
    }
}

/// A validated signal target
#[derive(Debug, Clone)]
pub enum SignalKind {
    FileExists {
        path: PathBuf,
    },
    DirectoryExists {
        path: PathBuf,
    },
    PathGlobMatches {
        glob: GlobPattern,
        min_matches: usize,
    },
    FileContentMatchesPattern {
        files: GlobPattern,
        pattern: Regex,
        min_matches: usize,
    },
    ManifestDeclaresDependency {
        manifests: Vec<PathBuf>,
        dependency: String,
    },
}

impl SignalKind {
    pub fn tag(&self) -> SignalKindTag {
        match self {
            SignalKind::FileExists { .. } => SignalKindTag::FileExists,
            SignalKind::DirectoryExists { .. } => SignalKindTag::DirectoryExists,
            SignalKind::PathGlobMatches { .. } => SignalKindTag::PathGlobMatches,
            SignalKind::FileContentMatchesPattern { .. } => {
                SignalKindTag::FileContentMatchesPattern
            }
            SignalKind::ManifestDeclaresDependency { .. } => {
                SignalKindTag::ManifestDeclaresDependency
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Signal {
    pub id: String,
    pub kind: SignalKind,
    pub weight: f64,
    pub category_id: String,
}

/// How to read a version string once a category has been chosen
#[derive(Debug, Clone)]
pub enum VersionExtractor {
    /// Declared version of a dependency in the first manifest listing it
    Dependency {
        manifests: Vec<PathBuf>,
        dependency: String,
    },
    /// First capture group of a regex applied to a file
    Pattern { file: PathBuf, pattern: Regex },
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub display_name: String,
    pub category_type: Axis,
    pub minimum_confidence: u8,
    pub description: Option<String>,
    pub version: Option<VersionExtractor>,
    max_possible_weight: f64,
}

impl Category {
    /// Sum of the weights of every signal defined for this category
    pub fn max_possible_weight(&self) -> f64 {
        self.max_possible_weight
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    axis: Axis,
    categories: Vec<Category>,
    signals: Vec<Signal>,
}

impl Catalog {
    /// Assemble a catalog from already-validated parts.
    ///
    /// Computes each category's normalisation denominator. Callers outside
    /// this module go through [`schema::CatalogFile::into_catalog`].
    pub(crate) fn assemble(axis: Axis, mut categories: Vec<Category>, signals: Vec<Signal>) -> Self {
        for category in &mut categories {
            category.max_possible_weight = signals
                .iter()
                .filter(|s| s.category_id == category.id)
                .map(|s| s.weight)
                .sum();
        }

        debug!(
            axis = %axis,
            categories = categories.len(),
            signals = signals.len(),
            "Catalog assembled"
        );

        Self {
            axis,
            categories,
            signals,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn signals_for<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a Signal> + 'a {
        self.signals.iter().filter(move |s| s.category_id == category_id)
    }

    pub fn from_yaml_str(content: &str) -> CatalogResult<Self> {
        let file: schema::CatalogFile =
            serde_yaml::from_str(content).map_err(|e| CatalogError::Parse {
                format: "yaml".to_string(),
                message: e.to_string(),
            })?;
        file.into_catalog()
    }

    pub fn from_json_str(content: &str) -> CatalogResult<Self> {
        let file: schema::CatalogFile =
            serde_json::from_str(content).map_err(|e| CatalogError::Parse {
                format: "json".to_string(),
                message: e.to_string(),
            })?;
        file.into_catalog()
    }

    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let file: schema::CatalogFile =
            toml::from_str(content).map_err(|e| CatalogError::Parse {
                format: "toml".to_string(),
                message: e.to_string(),
            })?;
        file.into_catalog()
    }

    /// Load a catalog file, choosing the format by extension
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// The bundled stack/framework catalog
    pub fn builtin_stack() -> CatalogResult<Self> {
        Self::from_yaml_str(builtin::STACK_CATALOG)
    }

    /// The bundled development-phase catalog
    pub fn builtin_phase() -> CatalogResult<Self> {
        Self::from_yaml_str(builtin::PHASE_CATALOG)
    }

    /// The bundled primary-language catalog
    pub fn builtin_language() -> CatalogResult<Self> {
        Self::from_yaml_str(builtin::LANGUAGE_CATALOG)
    }

    /// The bundled monorepo workspace catalog
    pub fn builtin_workspace() -> CatalogResult<Self> {
        Self::from_yaml_str(builtin::WORKSPACE_CATALOG)
    }

    pub fn builtin(axis: Axis) -> CatalogResult<Self> {
        match axis {
            Axis::Framework => Self::builtin_stack(),
            Axis::Phase => Self::builtin_phase(),
            Axis::Language => Self::builtin_language(),
            Axis::Workspace => Self::builtin_workspace(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogs_load() {
        let stack = Catalog::builtin_stack().unwrap();
        assert_eq!(stack.axis(), Axis::Framework);
        assert!(stack.category("nextjs").is_some());
        assert!(stack.category("fastapi").is_some());

        let phase = Catalog::builtin_phase().unwrap();
        assert_eq!(phase.axis(), Axis::Phase);
        let ids: Vec<&str> = phase.categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["prototype", "mvp", "production"]);

        let language = Catalog::builtin_language().unwrap();
        assert_eq!(language.axis(), Axis::Language);
        assert!(language.category("typescript").is_some());

        let workspace = Catalog::builtin_workspace().unwrap();
        assert_eq!(workspace.axis(), Axis::Workspace);
        assert!(workspace.category("pnpm").is_some());
    }

    #[test]
    fn test_builtin_matches_axis() {
        for axis in Axis::ALL {
            assert_eq!(Catalog::builtin(axis).unwrap().axis(), axis);
        }
    }

    #[test]
    fn test_nextjs_outweighs_react_on_shared_evidence() {
        let stack = Catalog::builtin_stack().unwrap();
        let weight = |id: &str| stack.signals().iter().find(|s| s.id == id).unwrap().weight;
        let share = |signal: &str, category: &str| {
            weight(signal) / stack.category(category).unwrap().max_possible_weight()
        };

        // Next.js apps always declare react and carry .tsx components; the
        // next dependency alone has to beat everything react gets from them.
        assert!(
            share("nextjs-dependency", "nextjs")
                > share("react-dependency", "react") + share("react-components", "react")
        );
    }

    #[test]
    fn test_max_possible_weight_is_sum_of_signals() {
        let stack = Catalog::builtin_stack().unwrap();
        for category in stack.categories() {
            let sum: f64 = stack.signals_for(&category.id).map(|s| s.weight).sum();
            assert!((category.max_possible_weight() - sum).abs() < 1e-9);
            assert!(category.max_possible_weight() > 0.0);
        }
    }

    #[test]
    fn test_every_category_shares_axis() {
        for catalog in [Catalog::builtin_stack().unwrap(), Catalog::builtin_phase().unwrap()] {
            assert!(catalog
                .categories()
                .iter()
                .all(|c| c.category_type == catalog.axis()));
        }
    }

    #[test]
    fn test_signal_kind_tag_display() {
        assert_eq!(
            SignalKindTag::ManifestDeclaresDependency.to_string(),
            "manifest-declares-dependency"
        );
        let json = serde_json::to_string(&SignalKindTag::PathGlobMatches).unwrap();
        assert_eq!(json, "\"path-glob-matches\"");
    }
}
