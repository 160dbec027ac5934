//! Signal Probe
//!
//! Evaluates one primitive check against a project root and returns the
//! [`Evidence`] it produced. Evaluation never fails: a missing, unreadable,
//! oversized or escaping file simply means the signal did not fire, and the
//! reason is recorded in the evidence note.

use super::report::{Artifact, Evidence};
use crate::catalog::{GlobPattern, Signal, SignalKind};
use crate::config::ProbeLimits;
use crate::fs::{FileListing, FileSystem};
use crate::manifest::{Dependency, ManifestFormat};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

const MAX_ARTIFACT_LINE_CHARS: usize = 200;

/// Why a file could not be used as evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Skip {
    Missing,
    OutsideRoot,
    WrongType(&'static str),
    Oversized(u64),
    Unreadable(String),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::Missing => write!(f, "not found"),
            Skip::OutsideRoot => write!(f, "resolves outside the project root"),
            Skip::WrongType(expected) => write!(f, "exists but is not a {}", expected),
            Skip::Oversized(size) => write!(f, "oversized ({} bytes)", size),
            Skip::Unreadable(reason) => write!(f, "unreadable: {}", reason),
        }
    }
}

/// Result of looking a dependency up across a list of manifests
#[derive(Debug, Clone)]
pub(crate) enum DependencyLookup {
    Found {
        manifest: PathBuf,
        dependency: Dependency,
    },
    NotFound(String),
}

pub struct SignalProbe<'a> {
    fs: &'a dyn FileSystem,
    limits: ProbeLimits,
    listings: Mutex<HashMap<PathBuf, Arc<FileListing>>>,
}

impl<'a> SignalProbe<'a> {
    pub fn new(fs: &'a dyn FileSystem, limits: ProbeLimits) -> Self {
        Self {
            fs,
            limits,
            listings: Mutex::new(HashMap::new()),
        }
    }

    pub fn evaluate(&self, signal: &Signal, project_root: &Path) -> Evidence {
        let evidence = match &signal.kind {
            SignalKind::FileExists { path } => {
                self.check_presence(signal, project_root, path, false)
            }
            SignalKind::DirectoryExists { path } => {
                self.check_presence(signal, project_root, path, true)
            }
            SignalKind::PathGlobMatches { glob, min_matches } => {
                self.check_glob(signal, project_root, glob, *min_matches)
            }
            SignalKind::FileContentMatchesPattern {
                files,
                pattern,
                min_matches,
            } => self.check_content(signal, project_root, files, pattern, *min_matches),
            SignalKind::ManifestDeclaresDependency {
                manifests,
                dependency,
            } => match self.find_dependency(project_root, manifests, dependency) {
                DependencyLookup::Found {
                    manifest,
                    dependency,
                } => Evidence::fired(
                    signal,
                    Artifact::Dependency {
                        manifest,
                        name: dependency.name,
                        version: dependency.version,
                    },
                ),
                DependencyLookup::NotFound(note) => Evidence::not_fired(signal, note),
            },
        };

        trace!(
            signal = %signal.id,
            category = %signal.category_id,
            fired = evidence.fired,
            "Signal evaluated"
        );
        evidence
    }

    fn check_presence(&self, signal: &Signal, root: &Path, path: &Path, dir: bool) -> Evidence {
        match self.resolve(root, path) {
            Ok(resolved) => {
                let matches = if dir {
                    self.fs.is_dir(&resolved)
                } else {
                    self.fs.is_file(&resolved)
                };
                if matches {
                    Evidence::fired(
                        signal,
                        Artifact::Path {
                            path: path.to_path_buf(),
                        },
                    )
                } else {
                    let expected = if dir { "directory" } else { "file" };
                    Evidence::not_fired(
                        signal,
                        format!("{}: {}", path.display(), Skip::WrongType(expected)),
                    )
                }
            }
            Err(skip) => Evidence::not_fired(signal, format!("{}: {}", path.display(), skip)),
        }
    }

    fn check_glob(&self, signal: &Signal, root: &Path, glob: &GlobPattern, min_matches: usize) -> Evidence {
        let listing = self.files_under(root);
        let matched: Vec<&PathBuf> = listing.files.iter().filter(|f| glob.is_match(f)).collect();

        let evidence = if matched.len() >= min_matches {
            let evidence = Evidence::fired(
                signal,
                Artifact::Path {
                    path: matched[0].clone(),
                },
            );
            if matched.len() > 1 {
                evidence.with_note(format!("{} matching files", matched.len()))
            } else {
                evidence
            }
        } else if matched.is_empty() {
            Evidence::not_fired(signal, format!("no files match {}", glob.as_str()))
        } else {
            Evidence::not_fired(
                signal,
                format!("{} of {} required files match {}", matched.len(), min_matches, glob.as_str()),
            )
        };
        self.note_truncation(evidence, &listing)
    }

    fn check_content(
        &self,
        signal: &Signal,
        root: &Path,
        files: &GlobPattern,
        pattern: &Regex,
        min_matches: usize,
    ) -> Evidence {
        let listing = self.files_under(root);
        let candidates: Vec<&PathBuf> = listing.files.iter().filter(|f| files.is_match(f)).collect();
        if candidates.is_empty() {
            let evidence = Evidence::not_fired(signal, format!("no files match {}", files.as_str()));
            return self.note_truncation(evidence, &listing);
        }

        let mut first: Option<Artifact> = None;
        let mut count = 0usize;
        let mut skipped = 0usize;

        'files: for relative in &candidates {
            let text = match self.read_text(root, relative) {
                Ok(text) => text,
                Err(skip) => {
                    debug!(file = %relative.display(), reason = %skip, "Skipping file for content match");
                    skipped += 1;
                    continue;
                }
            };

            for (index, line) in text.lines().enumerate() {
                if !pattern.is_match(line) {
                    continue;
                }
                count += 1;
                if first.is_none() {
                    first = Some(Artifact::Line {
                        path: (*relative).clone(),
                        line_number: index + 1,
                        line: truncate_line(line.trim()),
                    });
                }
                if count >= min_matches {
                    break 'files;
                }
            }
        }

        let evidence = match first {
            Some(artifact) if count >= min_matches => Evidence::fired(signal, artifact),
            _ => {
                let mut note = if count == 0 {
                    format!("pattern not found in {} file(s)", candidates.len() - skipped)
                } else {
                    format!("{} of {} required matches", count, min_matches)
                };
                if skipped > 0 {
                    note.push_str(&format!(", {} file(s) skipped", skipped));
                }
                Evidence::not_fired(signal, note)
            }
        };
        self.note_truncation(evidence, &listing)
    }

    /// Flag evidence drawn from a walk that stopped at a limit
    fn note_truncation(&self, evidence: Evidence, listing: &FileListing) -> Evidence {
        if !listing.truncated {
            return evidence;
        }
        evidence.with_note(format!(
            "file walk truncated after {} files (max depth {}, max files {})",
            listing.files.len(),
            self.limits.walk.max_depth,
            self.limits.walk.max_files
        ))
    }

    /// First manifest, in declared order, that lists `wanted`
    pub(crate) fn find_dependency(&self, root: &Path, manifests: &[PathBuf], wanted: &str) -> DependencyLookup {
        let mut notes = Vec::new();

        for manifest in manifests {
            let Some(format) = ManifestFormat::from_path(manifest) else {
                continue;
            };
            let content = match self.read_text(root, manifest) {
                Ok(content) => content,
                Err(Skip::Missing) => continue,
                Err(skip) => {
                    notes.push(format!("{}: {}", manifest.display(), skip));
                    continue;
                }
            };
            let Some(deps) = format.parse(&content) else {
                debug!(manifest = %manifest.display(), "Manifest could not be parsed");
                notes.push(format!("{}: malformed", manifest.display()));
                continue;
            };

            match format.find(&deps, wanted) {
                Some(dependency) => {
                    return DependencyLookup::Found {
                        manifest: manifest.clone(),
                        dependency: dependency.clone(),
                    }
                }
                None => notes.push(format!("{} not declared in {}", wanted, manifest.display())),
            }
        }

        if notes.is_empty() {
            DependencyLookup::NotFound("no manifest found".to_string())
        } else {
            DependencyLookup::NotFound(notes.join("; "))
        }
    }

    /// Read a file under the root, bounded by the size limit.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub(crate) fn read_text(&self, root: &Path, relative: &Path) -> Result<String, Skip> {
        let resolved = self.resolve(root, relative)?;
        let metadata = self
            .fs
            .metadata(&resolved)
            .map_err(|e| Skip::Unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(Skip::WrongType("file"));
        }
        if metadata.size > self.limits.max_file_size_bytes {
            return Err(Skip::Oversized(metadata.size));
        }

        let bytes = self
            .fs
            .read_bytes(&resolved, self.limits.max_file_size_bytes as usize)
            .map_err(|e| Skip::Unreadable(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Join `relative` onto the root, refusing anything whose canonical form
    /// leaves the canonical root.
    fn resolve(&self, root: &Path, relative: &Path) -> Result<PathBuf, Skip> {
        let candidate = root.join(relative);
        if !self.fs.exists(&candidate) {
            return Err(Skip::Missing);
        }

        let canonical_root = self
            .fs
            .canonicalize(root)
            .unwrap_or_else(|_| root.to_path_buf());
        let canonical = self
            .fs
            .canonicalize(&candidate)
            .map_err(|e| Skip::Unreadable(e.to_string()))?;

        if !canonical.starts_with(&canonical_root) {
            debug!(
                path = %candidate.display(),
                target = %canonical.display(),
                "Path escapes the project root"
            );
            return Err(Skip::OutsideRoot);
        }
        Ok(candidate)
    }

    /// Sorted relative file listing of `root`, walked once per probe
    fn files_under(&self, root: &Path) -> Arc<FileListing> {
        let mut listings = match self.listings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(listing) = listings.get(root) {
            return Arc::clone(listing);
        }

        let listing = match self.fs.walk_files(root, self.limits.walk) {
            Ok(listing) => listing,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "Walk failed, treating as empty");
                FileListing::default()
            }
        };
        debug!(
            root = %root.display(),
            files = listing.files.len(),
            truncated = listing.truncated,
            "Project files listed"
        );

        let listing = Arc::new(listing);
        listings.insert(root.to_path_buf(), Arc::clone(&listing));
        listing
    }
}

fn truncate_line(line: &str) -> String {
    if line.chars().count() <= MAX_ARTIFACT_LINE_CHARS {
        line.to_string()
    } else {
        let mut truncated: String = line.chars().take(MAX_ARTIFACT_LINE_CHARS).collect();
        truncated.push_str("...");
        truncated
    }
}
