use super::probe::{DependencyLookup, SignalProbe};
use super::report::{BestCategory, DetectionReport, Evidence, RankedCategory};
use super::scoring::{CategoryScore, ScoringEngine};
use crate::catalog::{Catalog, Category, VersionExtractor};
use crate::config::ProbeLimits;
use crate::error::DetectError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::manifest::normalize_version;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Classifies a project root against one catalog at a time.
///
/// Holds no state between runs; the same classifier can be reused for any
/// number of projects and catalogs, including concurrently.
pub struct Classifier {
    fs: Arc<dyn FileSystem>,
    limits: ProbeLimits,
}

impl Classifier {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            limits: ProbeLimits::default(),
        }
    }

    /// Classifier over the real file system with default limits
    pub fn real() -> Self {
        Self::new(Arc::new(RealFileSystem::new()))
    }

    pub fn with_limits(mut self, limits: ProbeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> ProbeLimits {
        self.limits
    }

    pub fn classify(&self, catalog: &Catalog, project_root: &Path) -> Result<DetectionReport, DetectError> {
        self.check_root(project_root)?;

        let probe = SignalProbe::new(self.fs.as_ref(), self.limits);
        let engine = ScoringEngine::new(&probe);
        let scores: Vec<CategoryScore> = catalog
            .categories()
            .iter()
            .map(|category| engine.score(category, catalog.signals_for(&category.id), project_root))
            .collect();

        Ok(self.report(catalog, scores, &probe, project_root))
    }

    /// Same result as [`Classifier::classify`], scoring categories on
    /// scoped worker threads.
    pub fn classify_parallel(
        &self,
        catalog: &Catalog,
        project_root: &Path,
    ) -> Result<DetectionReport, DetectError> {
        self.check_root(project_root)?;

        let probe = SignalProbe::new(self.fs.as_ref(), self.limits);
        let scores: Vec<CategoryScore> = std::thread::scope(|scope| {
            let handles: Vec<_> = catalog
                .categories()
                .iter()
                .map(|category| {
                    let probe = &probe;
                    scope.spawn(move || {
                        ScoringEngine::new(probe).score(
                            category,
                            catalog.signals_for(&category.id),
                            project_root,
                        )
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(score) => score,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        Ok(self.report(catalog, scores, &probe, project_root))
    }

    fn check_root(&self, project_root: &Path) -> Result<(), DetectError> {
        if !self.fs.exists(project_root) {
            return Err(DetectError::RootNotFound(project_root.to_path_buf()));
        }
        if !self.fs.is_dir(project_root) {
            return Err(DetectError::RootNotDirectory(project_root.to_path_buf()));
        }
        self.fs
            .list_dir(project_root)
            .map_err(|e| DetectError::RootUnreadable {
                path: project_root.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn report(
        &self,
        catalog: &Catalog,
        scores: Vec<CategoryScore>,
        probe: &SignalProbe<'_>,
        project_root: &Path,
    ) -> DetectionReport {
        let mut ranked: Vec<(&Category, &CategoryScore)> = catalog
            .categories()
            .iter()
            .zip(scores.iter())
            .filter(|(_, score)| score.confidence > 0)
            .collect();
        ranked.sort_by(|a, b| rank_order(a, b));

        let best_index = ranked
            .iter()
            .position(|(category, score)| score.confidence >= category.minimum_confidence);

        for (category, score) in &ranked {
            if score.confidence < category.minimum_confidence {
                debug!(
                    category = %category.id,
                    confidence = score.confidence,
                    minimum = category.minimum_confidence,
                    "Category below its minimum confidence"
                );
            }
        }

        let best = best_index.map(|index| {
            let (category, score) = ranked[index];
            BestCategory {
                id: category.id.clone(),
                display_name: category.display_name.clone(),
                confidence: score.confidence,
                version: category
                    .version
                    .as_ref()
                    .and_then(|extractor| extract_version(probe, extractor, project_root)),
            }
        });

        let alternates: Vec<RankedCategory> = ranked
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != best_index)
            .map(|(_, (category, score))| RankedCategory {
                id: category.id.clone(),
                confidence: score.confidence,
            })
            .collect();

        match &best {
            Some(best) => info!(
                axis = %catalog.axis(),
                best = %best.id,
                confidence = best.confidence,
                version = best.version.as_deref().unwrap_or("-"),
                alternates = alternates.len(),
                "Classification complete"
            ),
            None => info!(
                axis = %catalog.axis(),
                alternates = alternates.len(),
                "Classification complete: unknown"
            ),
        }

        let evidence: Vec<Evidence> = scores.into_iter().flat_map(|s| s.evidence).collect();
        DetectionReport::assemble(catalog.axis(), best, alternates, evidence)
    }
}

/// Confidence descending, then total signal weight descending, then id
fn rank_order(a: &(&Category, &CategoryScore), b: &(&Category, &CategoryScore)) -> Ordering {
    b.1.confidence
        .cmp(&a.1.confidence)
        .then_with(|| b.1.max_possible_weight.total_cmp(&a.1.max_possible_weight))
        .then_with(|| a.0.id.cmp(&b.0.id))
}

fn extract_version(probe: &SignalProbe<'_>, extractor: &VersionExtractor, root: &Path) -> Option<String> {
    match extractor {
        VersionExtractor::Dependency {
            manifests,
            dependency,
        } => match probe.find_dependency(root, manifests, dependency) {
            DependencyLookup::Found { dependency, .. } => {
                dependency.version.as_deref().and_then(normalize_version)
            }
            DependencyLookup::NotFound(_) => None,
        },
        VersionExtractor::Pattern { file, pattern } => {
            let text = probe.read_text(root, file).ok()?;
            text.lines()
                .filter_map(|line| pattern.captures(line))
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .find_map(|raw| normalize_version(&raw))
        }
    }
}
