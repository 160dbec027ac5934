//! Scoring Engine
//!
//! Runs every signal of a category through the probe, sums the weight of
//! those that fired and normalises it against the category's total weight.

use super::probe::SignalProbe;
use super::report::Evidence;
use crate::catalog::{Category, Signal};
use std::path::Path;
use tracing::{debug, warn};

/// Score of one category for one scan
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub category_id: String,
    pub raw_weight: f64,
    pub max_possible_weight: f64,
    pub confidence: u8,
    pub evidence: Vec<Evidence>,
}

/// `round_half_up(100 * raw / max)` clamped to 0..=100.
///
/// The ratio is snapped to 1e-9 first so that values such as 62.4999999
/// produced by binary fractions round the way the decimal weights read.
/// A zero denominator yields 0.
pub fn confidence_percent(raw_weight: f64, max_possible_weight: f64) -> u8 {
    if !(max_possible_weight > 0.0) || !raw_weight.is_finite() {
        return 0;
    }
    let ratio = 100.0 * raw_weight / max_possible_weight;
    let snapped = (ratio * 1e9).round() / 1e9;
    (snapped + 0.5).floor().clamp(0.0, 100.0) as u8
}

pub struct ScoringEngine<'p, 'fs> {
    probe: &'p SignalProbe<'fs>,
}

impl<'p, 'fs> ScoringEngine<'p, 'fs> {
    pub fn new(probe: &'p SignalProbe<'fs>) -> Self {
        Self { probe }
    }

    pub fn score<'s>(
        &self,
        category: &Category,
        signals: impl IntoIterator<Item = &'s Signal>,
        project_root: &Path,
    ) -> CategoryScore {
        let evidence: Vec<Evidence> = signals
            .into_iter()
            .filter(|s| s.category_id == category.id)
            .map(|s| self.probe.evaluate(s, project_root))
            .collect();

        let raw_weight: f64 = evidence.iter().filter(|e| e.fired).map(|e| e.weight).sum();
        let max_possible_weight = category.max_possible_weight();

        if max_possible_weight <= 0.0 {
            warn!(category = %category.id, "Category has no signal weight, scoring 0");
        }
        let confidence = confidence_percent(raw_weight, max_possible_weight);

        debug!(
            category = %category.id,
            raw_weight,
            max_possible_weight,
            confidence,
            fired = evidence.iter().filter(|e| e.fired).count(),
            "Category scored"
        );

        CategoryScore {
            category_id: category.id.clone(),
            raw_weight,
            max_possible_weight,
            confidence,
            evidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::ProbeLimits;
    use crate::fs::MockFileSystem;
    use std::path::PathBuf;
    use yare::parameterized;

    #[parameterized(
        none = { 0.0, 100.0, 0 },
        all = { 100.0, 100.0, 100 },
        partial = { 80.0, 100.0, 80 },
        half_rounds_up = { 1.0, 8.0, 13 },
        below_half_rounds_down = { 1.0, 3.0, 33 },
        two_thirds = { 2.0, 3.0, 67 },
        float_noise = { 0.3, 0.48, 63 },
        zero_denominator = { 5.0, 0.0, 0 },
        over_max_clamped = { 150.0, 100.0, 100 },
    )]
    fn test_confidence_percent(raw: f64, max: f64, expected: u8) {
        assert_eq!(confidence_percent(raw, max), expected);
    }

    const CATALOG: &str = r#"
axis: framework
categories:
  - id: fastapi
    display_name: FastAPI
    signals:
      - { id: dep, kind: manifest-declares-dependency, manifests: [requirements.txt], dependency: fastapi, weight: 50 }
      - { id: server, kind: manifest-declares-dependency, manifests: [requirements.txt], dependency: uvicorn, weight: 30 }
      - { id: import, kind: file-content-matches-pattern, files: '*.py', pattern: 'from fastapi import', weight: 20 }
  - id: flask
    display_name: Flask
    signals:
      - { id: flask-dep, kind: manifest-declares-dependency, manifests: [requirements.txt], dependency: flask, weight: 1 }
"#;

    #[test]
    fn test_score_partial_category() {
        let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
        let fs = MockFileSystem::new();
        fs.add_file("requirements.txt", "fastapi==0.109.2\nuvicorn[standard]==0.27.0\n");
        let probe = SignalProbe::new(&fs, ProbeLimits::default());
        let engine = ScoringEngine::new(&probe);

        let category = catalog.category("fastapi").unwrap();
        let score = engine.score(category, catalog.signals(), &PathBuf::from("/mock"));

        assert_eq!(score.raw_weight, 80.0);
        assert_eq!(score.max_possible_weight, 100.0);
        assert_eq!(score.confidence, 80);
        assert_eq!(score.evidence.len(), 3);
        let fired: Vec<&str> = score
            .evidence
            .iter()
            .filter(|e| e.fired)
            .map(|e| e.signal_id.as_str())
            .collect();
        assert_eq!(fired, vec!["dep", "server"]);
    }

    #[test]
    fn test_score_only_uses_own_signals() {
        let catalog = Catalog::from_yaml_str(CATALOG).unwrap();
        let fs = MockFileSystem::new();
        fs.add_file("requirements.txt", "flask\n");
        let probe = SignalProbe::new(&fs, ProbeLimits::default());
        let engine = ScoringEngine::new(&probe);

        let flask = engine.score(
            catalog.category("flask").unwrap(),
            catalog.signals(),
            &PathBuf::from("/mock"),
        );
        assert_eq!(flask.confidence, 100);
        assert_eq!(flask.evidence.len(), 1);

        let fastapi = engine.score(
            catalog.category("fastapi").unwrap(),
            catalog.signals(),
            &PathBuf::from("/mock"),
        );
        assert_eq!(fastapi.confidence, 0);
    }
}
