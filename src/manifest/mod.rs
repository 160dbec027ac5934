//! Dependency manifest parsing
//!
//! Each supported manifest is recognised by its file name and parsed with one
//! of the [`parsers`]. Dependency names are compared per ecosystem: Python
//! names are normalised the way pip does (case and `-`/`_`/`.` insensitive),
//! Go modules also match their `/vN` major-version paths, and Maven
//! coordinates match either `groupId:artifactId` or the bare `artifactId`.

pub mod parsers;

use parsers::{
    gem_pattern, requirement_pattern, DependencyParser, GoModDependencyParser,
    JsonDependencyParser, PomDependencyParser, PyprojectDependencyParser, RegexDependencyParser,
    TomlDependencyParser, YamlDependencyParser,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestFormat {
    PackageJson,
    ComposerJson,
    CargoToml,
    PyprojectToml,
    Pipfile,
    Requirements,
    GoMod,
    Gemfile,
    Pubspec,
    PomXml,
}

impl ManifestFormat {
    /// Detect the format from a manifest path's file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Some(match name {
            "package.json" => Self::PackageJson,
            "composer.json" => Self::ComposerJson,
            "Cargo.toml" => Self::CargoToml,
            "pyproject.toml" => Self::PyprojectToml,
            "Pipfile" => Self::Pipfile,
            "go.mod" => Self::GoMod,
            "Gemfile" => Self::Gemfile,
            "pubspec.yaml" | "pubspec.yml" => Self::Pubspec,
            "pom.xml" => Self::PomXml,
            n if n.starts_with("requirements") && n.ends_with(".txt") => Self::Requirements,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PackageJson => "package.json",
            Self::ComposerJson => "composer.json",
            Self::CargoToml => "Cargo.toml",
            Self::PyprojectToml => "pyproject.toml",
            Self::Pipfile => "Pipfile",
            Self::Requirements => "requirements.txt",
            Self::GoMod => "go.mod",
            Self::Gemfile => "Gemfile",
            Self::Pubspec => "pubspec.yaml",
            Self::PomXml => "pom.xml",
        }
    }

    fn parser(&self) -> Box<dyn DependencyParser> {
        match self {
            Self::PackageJson => Box::new(JsonDependencyParser {
                dependencies_keys: &[
                    "dependencies",
                    "devDependencies",
                    "peerDependencies",
                    "optionalDependencies",
                ],
            }),
            Self::ComposerJson => Box::new(JsonDependencyParser {
                dependencies_keys: &["require", "require-dev"],
            }),
            Self::CargoToml => Box::new(TomlDependencyParser {
                dependencies_keys: &[
                    "dependencies",
                    "dev-dependencies",
                    "build-dependencies",
                    "workspace.dependencies",
                ],
            }),
            Self::Pipfile => Box::new(TomlDependencyParser {
                dependencies_keys: &["packages", "dev-packages"],
            }),
            Self::PyprojectToml => Box::new(PyprojectDependencyParser),
            Self::Requirements => Box::new(RegexDependencyParser {
                line_pattern: requirement_pattern(),
                skip_prefixes: &["-"],
            }),
            Self::GoMod => Box::new(GoModDependencyParser),
            Self::Gemfile => Box::new(RegexDependencyParser {
                line_pattern: gem_pattern(),
                skip_prefixes: &[],
            }),
            Self::Pubspec => Box::new(YamlDependencyParser {
                dependencies_keys: &["dependencies", "dev_dependencies"],
            }),
            Self::PomXml => Box::new(PomDependencyParser),
        }
    }

    /// Parse manifest content; `None` means the content is malformed
    pub fn parse(&self, content: &str) -> Option<Vec<Dependency>> {
        self.parser().parse(content)
    }

    /// Whether a declared dependency name satisfies a wanted name
    pub fn names_match(&self, declared: &str, wanted: &str) -> bool {
        match self {
            Self::Requirements | Self::PyprojectToml | Self::Pipfile => {
                normalize_python_name(declared) == normalize_python_name(wanted)
            }
            Self::GoMod => {
                declared == wanted
                    || declared
                        .strip_prefix(wanted)
                        .and_then(|rest| rest.strip_prefix("/v"))
                        .map(|major| !major.is_empty() && major.chars().all(|c| c.is_ascii_digit()))
                        .unwrap_or(false)
            }
            Self::PomXml => {
                declared == wanted
                    || (!wanted.contains(':')
                        && declared.rsplit(':').next().map(|a| a == wanted).unwrap_or(false))
            }
            _ => declared == wanted,
        }
    }

    /// Find a wanted dependency among parsed dependencies
    pub fn find<'a>(&self, deps: &'a [Dependency], wanted: &str) -> Option<&'a Dependency> {
        deps.iter().find(|d| self.names_match(&d.name, wanted))
    }
}

/// PEP 503 normalisation: runs of `-`, `_` and `.` collapse to one `-`
fn normalize_python_name(name: &str) -> String {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let separators =
        SEPARATORS.get_or_init(|| Regex::new(r"[-_.]+").expect("separator pattern is valid"));
    separators.replace_all(name, "-").to_ascii_lowercase()
}

/// Normalise a declared version string for display.
///
/// Strips range operators and a leading `v`; wildcard and tag-like values
/// (`*`, `latest`, `x`) yield `None`.
pub fn normalize_version(raw: &str) -> Option<String> {
    let first = raw
        .split([',', ' ', '|'])
        .find(|part| !part.trim_matches(|c: char| "^~=<>! ".contains(c)).is_empty())?;
    let trimmed = first
        .trim()
        .trim_start_matches(|c: char| "^~=<>! ".contains(c))
        .trim_start_matches('v')
        .trim();

    if trimmed.is_empty()
        || trimmed == "*"
        || trimmed.eq_ignore_ascii_case("latest")
        || trimmed.eq_ignore_ascii_case("x")
        || !trimmed.starts_with(|c: char| c.is_ascii_digit())
    {
        return None;
    }
    Some(trimmed.to_string())
}
