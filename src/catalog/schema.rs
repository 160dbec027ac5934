//! On-disk catalog format
//!
//! ```yaml
//! axis: framework
//! categories:
//!   - id: nextjs
//!     display_name: Next.js
//!     minimum_confidence: 50
//!     version: { from: dependency, manifests: [package.json], dependency: next }
//!     signals:
//!       - id: nextjs-dependency
//!         kind: manifest-declares-dependency
//!         manifests: [package.json]
//!         dependency: next
//!         weight: 60
//! ```
//!
//! Signals are declared under their category, so a signal can never belong to
//! more than one. Each `kind` accepts exactly its own target fields:
//!
//! | kind | fields |
//! |---|---|
//! | `file-exists` | `path` |
//! | `directory-exists` | `path` |
//! | `path-glob-matches` | `glob`, optional `min_matches` |
//! | `file-content-matches-pattern` | `files` (glob), `pattern` (regex), optional `min_matches` |
//! | `manifest-declares-dependency` | `manifests`, `dependency` |
//!
//! The same structure is accepted as JSON or TOML.

use super::{Axis, Catalog, Category, GlobPattern, Signal, SignalKind, SignalKindTag, VersionExtractor};
use crate::error::{CatalogError, CatalogResult};
use crate::manifest::ManifestFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub axis: Axis,
    pub categories: Vec<CategoryFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryFile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub minimum_confidence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionFile>,
    #[serde(default)]
    pub signals: Vec<SignalFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalFile {
    pub id: String,
    pub kind: SignalKindTag,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_matches: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    Dependency,
    Pattern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionFile {
    pub from: VersionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl CatalogFile {
    /// Validate every entry and build the read-only catalog.
    ///
    /// The first problem found rejects the whole catalog.
    pub fn into_catalog(self) -> CatalogResult<Catalog> {
        if self.categories.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut category_ids = HashSet::new();
        let mut signal_ids = HashSet::new();
        let mut categories = Vec::with_capacity(self.categories.len());
        let mut signals = Vec::new();

        for raw in self.categories {
            validate_id(&raw.id)?;
            if !category_ids.insert(raw.id.clone()) {
                return Err(CatalogError::DuplicateCategory(raw.id));
            }
            if raw.minimum_confidence > 100 {
                return Err(CatalogError::InvalidMinimumConfidence {
                    category: raw.id,
                    value: raw.minimum_confidence,
                });
            }
            if raw.signals.is_empty() {
                return Err(CatalogError::EmptyCategory(raw.id));
            }

            for raw_signal in raw.signals {
                validate_id(&raw_signal.id)?;
                if !signal_ids.insert(raw_signal.id.clone()) {
                    return Err(CatalogError::DuplicateSignal(raw_signal.id));
                }
                signals.push(raw_signal.into_signal(&raw.id)?);
            }

            let version = raw
                .version
                .map(|v| v.into_extractor())
                .transpose()
                .map_err(|reason| CatalogError::InvalidVersionExtractor {
                    category: raw.id.clone(),
                    reason,
                })?;

            categories.push(Category {
                id: raw.id,
                display_name: raw.display_name,
                category_type: self.axis,
                minimum_confidence: raw.minimum_confidence as u8,
                description: raw.description,
                version,
                max_possible_weight: 0.0,
            });
        }

        Ok(Catalog::assemble(self.axis, categories, signals))
    }
}

impl SignalFile {
    fn into_signal(self, category_id: &str) -> CatalogResult<Signal> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(CatalogError::NonPositiveWeight {
                signal: self.id,
                weight: self.weight,
            });
        }

        let invalid = |reason: String| CatalogError::InvalidTarget {
            signal: self.id.clone(),
            reason,
        };

        let allowed: &[&str] = match self.kind {
            SignalKindTag::FileExists | SignalKindTag::DirectoryExists => &["path"],
            SignalKindTag::PathGlobMatches => &["glob", "min_matches"],
            SignalKindTag::FileContentMatchesPattern => &["files", "pattern", "min_matches"],
            SignalKindTag::ManifestDeclaresDependency => &["manifests", "dependency"],
        };
        for field in self.present_fields() {
            if !allowed.contains(&field) {
                return Err(invalid(format!(
                    "field `{}` does not apply to kind {}",
                    field, self.kind
                )));
            }
        }

        let require = |value: &Option<String>, field: &str| -> CatalogResult<String> {
            value
                .clone()
                .ok_or_else(|| invalid(format!("kind {} requires `{}`", self.kind, field)))
        };

        let min_matches = self.min_matches.unwrap_or(1);
        if min_matches == 0 {
            return Err(invalid("`min_matches` must be at least 1".to_string()));
        }

        let kind = match self.kind {
            SignalKindTag::FileExists => SignalKind::FileExists {
                path: relative_path(&require(&self.path, "path")?).map_err(&invalid)?,
            },
            SignalKindTag::DirectoryExists => SignalKind::DirectoryExists {
                path: relative_path(&require(&self.path, "path")?).map_err(&invalid)?,
            },
            SignalKindTag::PathGlobMatches => SignalKind::PathGlobMatches {
                glob: GlobPattern::new(&require(&self.glob, "glob")?).map_err(&invalid)?,
                min_matches,
            },
            SignalKindTag::FileContentMatchesPattern => SignalKind::FileContentMatchesPattern {
                files: GlobPattern::new(&require(&self.files, "files")?).map_err(&invalid)?,
                pattern: compile_regex(&require(&self.pattern, "pattern")?).map_err(&invalid)?,
                min_matches,
            },
            SignalKindTag::ManifestDeclaresDependency => {
                let dependency = require(&self.dependency, "dependency")?;
                if dependency.trim().is_empty() {
                    return Err(invalid("`dependency` must not be empty".to_string()));
                }
                SignalKind::ManifestDeclaresDependency {
                    manifests: manifest_paths(self.manifests.as_deref()).map_err(&invalid)?,
                    dependency,
                }
            }
        };

        Ok(Signal {
            id: self.id,
            kind,
            weight: self.weight,
            category_id: category_id.to_string(),
        })
    }

    fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.path.is_some() {
            fields.push("path");
        }
        if self.glob.is_some() {
            fields.push("glob");
        }
        if self.files.is_some() {
            fields.push("files");
        }
        if self.pattern.is_some() {
            fields.push("pattern");
        }
        if self.manifests.is_some() {
            fields.push("manifests");
        }
        if self.dependency.is_some() {
            fields.push("dependency");
        }
        if self.min_matches.is_some() {
            fields.push("min_matches");
        }
        fields
    }
}

impl VersionFile {
    fn into_extractor(self) -> Result<VersionExtractor, String> {
        match self.from {
            VersionSource::Dependency => {
                if self.file.is_some() || self.pattern.is_some() {
                    return Err("`file`/`pattern` do not apply to from: dependency".to_string());
                }
                let dependency = self
                    .dependency
                    .filter(|d| !d.trim().is_empty())
                    .ok_or_else(|| "from: dependency requires `dependency`".to_string())?;
                Ok(VersionExtractor::Dependency {
                    manifests: manifest_paths(self.manifests.as_deref())?,
                    dependency,
                })
            }
            VersionSource::Pattern => {
                if self.manifests.is_some() || self.dependency.is_some() {
                    return Err(
                        "`manifests`/`dependency` do not apply to from: pattern".to_string()
                    );
                }
                let file = self
                    .file
                    .ok_or_else(|| "from: pattern requires `file`".to_string())?;
                let pattern = self
                    .pattern
                    .ok_or_else(|| "from: pattern requires `pattern`".to_string())?;
                let pattern = compile_regex(&pattern)?;
                if pattern.captures_len() < 2 {
                    return Err("version pattern needs a capture group".to_string());
                }
                Ok(VersionExtractor::Pattern {
                    file: relative_path(&file)?,
                    pattern,
                })
            }
        }
    }
}

fn validate_id(id: &str) -> CatalogResult<()> {
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(CatalogError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn compile_regex(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|e| format!("invalid pattern {:?}: {}", pattern, e))
}

/// Paths in a catalog must stay inside the project root
fn relative_path(raw: &str) -> Result<PathBuf, String> {
    let path = Path::new(raw.trim());
    if raw.trim().is_empty() {
        return Err("path must not be empty".to_string());
    }
    if path.has_root() || path.is_absolute() {
        return Err(format!("path {:?} must be relative to the project root", raw));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(format!("path {:?} must not contain '..'", raw));
    }
    Ok(path.to_path_buf())
}

fn manifest_paths(raw: Option<&[String]>) -> Result<Vec<PathBuf>, String> {
    let raw = raw.filter(|m| !m.is_empty()).ok_or_else(|| {
        "`manifests` must list at least one manifest file".to_string()
    })?;

    raw.iter()
        .map(|m| {
            let path = relative_path(m)?;
            if ManifestFormat::from_path(&path).is_none() {
                return Err(format!("unsupported manifest {:?}", m));
            }
            Ok(path)
        })
        .collect()
}
