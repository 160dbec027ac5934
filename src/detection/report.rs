use crate::catalog::{Axis, Signal, SignalKindTag};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The concrete thing a fired signal matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Artifact {
    Path {
        path: PathBuf,
    },
    Line {
        path: PathBuf,
        line_number: usize,
        line: String,
    },
    Dependency {
        manifest: PathBuf,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Path { path } => write!(f, "{}", path.display()),
            Artifact::Line {
                path,
                line_number,
                line,
            } => write!(f, "{}:{}: {}", path.display(), line_number, line),
            Artifact::Dependency {
                manifest,
                name,
                version: Some(version),
            } => write!(f, "{} {} in {}", name, version, manifest.display()),
            Artifact::Dependency { manifest, name, .. } => {
                write!(f, "{} in {}", name, manifest.display())
            }
        }
    }
}

/// Outcome of evaluating one signal during one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub signal_id: String,
    pub category_id: String,
    pub kind: SignalKindTag,
    pub weight: f64,
    pub fired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Evidence {
    pub fn fired(signal: &Signal, artifact: Artifact) -> Self {
        Self {
            signal_id: signal.id.clone(),
            category_id: signal.category_id.clone(),
            kind: signal.kind.tag(),
            weight: signal.weight,
            fired: true,
            artifact: Some(artifact),
            note: None,
        }
    }

    pub fn not_fired(signal: &Signal, note: impl Into<String>) -> Self {
        Self {
            signal_id: signal.id.clone(),
            category_id: signal.category_id.clone(),
            kind: signal.kind.tag(),
            weight: signal.weight,
            fired: false,
            artifact: None,
            note: Some(note.into()),
        }
    }

    /// Attach a note, appending to any note already present
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = Some(match self.note.take() {
            Some(existing) => format!("{}; {}", existing, note),
            None => note,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestCategory {
    pub id: String,
    pub display_name: String,
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCategory {
    pub id: String,
    pub confidence: u8,
}

/// Result of one classification run over one catalog.
///
/// `best` is `None` when no category reached its minimum confidence; that is
/// an expected outcome and is reported as "unknown". `evidence` holds every
/// signal of the catalog, fired or not, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    axis: Axis,
    best: Option<BestCategory>,
    alternates: Vec<RankedCategory>,
    evidence: Vec<Evidence>,
}

impl DetectionReport {
    pub fn assemble(
        axis: Axis,
        best: Option<BestCategory>,
        alternates: Vec<RankedCategory>,
        evidence: Vec<Evidence>,
    ) -> Self {
        Self {
            axis,
            best,
            alternates,
            evidence,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn best(&self) -> Option<&BestCategory> {
        self.best.as_ref()
    }

    pub fn alternates(&self) -> &[RankedCategory] {
        &self.alternates
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }

    pub fn is_unknown(&self) -> bool {
        self.best.is_none()
    }

    /// Evidence records for a single category
    pub fn evidence_for<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a Evidence> {
        self.evidence
            .iter()
            .filter(move |e| e.category_id == category_id)
    }

    pub fn fired(&self) -> impl Iterator<Item = &Evidence> {
        self.evidence.iter().filter(|e| e.fired)
    }
}
