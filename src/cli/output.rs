//! Output formatting for detection reports and catalogs
//!
//! JSON and YAML are straight serializations of the report structures;
//! the human format is a compact summary meant for terminals.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::catalog::{Axis, Catalog, SignalKindTag};
use crate::detection::{DetectionReport, Evidence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Human,
}

/// One axis' report plus the description of its best category, if any
#[derive(Debug, Clone, Serialize)]
pub struct AxisOutput {
    #[serde(flatten)]
    pub report: DetectionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AxisOutput {
    pub fn new(report: DetectionReport, catalog: &Catalog) -> Self {
        let description = report
            .best()
            .and_then(|best| catalog.category(&best.id))
            .and_then(|category| category.description.clone());
        Self {
            report,
            description,
        }
    }
}

/// Everything `detect` prints
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutput {
    pub project: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<AxisOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<AxisOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<AxisOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<AxisOutput>,
}

impl DetectionOutput {
    pub fn new(project: PathBuf) -> Self {
        Self {
            project,
            stack: None,
            phase: None,
            language: None,
            workspace: None,
        }
    }

    /// Store an axis report in its slot, replacing any earlier one
    pub fn insert(&mut self, axis: Axis, output: AxisOutput) {
        let slot = match axis {
            Axis::Framework => &mut self.stack,
            Axis::Phase => &mut self.phase,
            Axis::Language => &mut self.language,
            Axis::Workspace => &mut self.workspace,
        };
        *slot = Some(output);
    }

    /// Classified axes with their human labels, in report order
    fn labelled(&self) -> [(&'static str, &Option<AxisOutput>); 4] {
        [
            ("Stack", &self.stack),
            ("Phase", &self.phase),
            ("Language", &self.language),
            ("Workspace", &self.workspace),
        ]
    }

    pub fn axes(&self) -> impl Iterator<Item = &AxisOutput> {
        self.stack
            .iter()
            .chain(self.phase.iter())
            .chain(self.language.iter())
            .chain(self.workspace.iter())
    }

    /// True when every classified axis produced a best category
    pub fn is_confident(&self) -> bool {
        self.axes().all(|axis| !axis.report.is_unknown())
    }
}

#[derive(Debug, Clone, Serialize)]
struct SignalSummary<'a> {
    id: &'a str,
    kind: SignalKindTag,
    weight: f64,
}

#[derive(Debug, Clone, Serialize)]
struct CategorySummary<'a> {
    id: &'a str,
    display_name: &'a str,
    minimum_confidence: u8,
    max_possible_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    signals: Vec<SignalSummary<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct CatalogSummary<'a> {
    axis: Axis,
    categories: Vec<CategorySummary<'a>>,
}

impl<'a> CatalogSummary<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        let categories = catalog
            .categories()
            .iter()
            .map(|category| CategorySummary {
                id: &category.id,
                display_name: &category.display_name,
                minimum_confidence: category.minimum_confidence,
                max_possible_weight: category.max_possible_weight(),
                description: category.description.as_deref(),
                signals: catalog
                    .signals_for(&category.id)
                    .map(|s| SignalSummary {
                        id: &s.id,
                        kind: s.kind.tag(),
                        weight: s.weight,
                    })
                    .collect(),
            })
            .collect();

        Self {
            axis: catalog.axis(),
            categories,
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
    show_evidence: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_evidence: false,
        }
    }

    /// Include non-fired evidence and every category in human output
    pub fn with_evidence(mut self, show_evidence: bool) -> Self {
        self.show_evidence = show_evidence;
        self
    }

    pub fn format(&self, output: &DetectionOutput) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(output)
                .context("Failed to serialize detection output to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(output)
                .context("Failed to serialize detection output to YAML"),
            OutputFormat::Human => Ok(self.format_human(output)),
        }
    }

    pub fn format_catalog(&self, catalog: &Catalog) -> Result<String> {
        let summary = CatalogSummary::new(catalog);
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&summary)
                .context("Failed to serialize catalog to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&summary).context("Failed to serialize catalog to YAML")
            }
            OutputFormat::Human => Ok(format_catalog_human(&summary)),
        }
    }

    fn format_human(&self, output: &DetectionOutput) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Project: {}", output.project.display());

        for (label, axis) in output.labelled() {
            if let Some(axis) = axis {
                out.push('\n');
                self.format_axis_human(&mut out, label, axis);
            }
        }
        out
    }

    fn format_axis_human(&self, out: &mut String, label: &str, axis: &AxisOutput) {
        let report = &axis.report;

        match report.best() {
            Some(best) => {
                let version = best
                    .version
                    .as_ref()
                    .map(|v| format!(" {}", v))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "\u{2713} {}: {}{} ({}%)",
                    label, best.display_name, version, best.confidence
                );
            }
            None => {
                let _ = writeln!(out, "\u{26A0} {}: unknown", label);
            }
        }

        if let Some(description) = &axis.description {
            let _ = writeln!(out, "  {}", description);
        }

        if !report.alternates().is_empty() {
            let alternates: Vec<String> = report
                .alternates()
                .iter()
                .map(|a| format!("{} ({}%)", a.id, a.confidence))
                .collect();
            let _ = writeln!(out, "  Alternates: {}", alternates.join(", "));
        }

        let shown: Vec<&Evidence> = if self.show_evidence {
            report.evidence().iter().collect()
        } else {
            match report.best() {
                Some(best) => report.evidence_for(&best.id).filter(|e| e.fired).collect(),
                None => Vec::new(),
            }
        };

        if !shown.is_empty() {
            let _ = writeln!(out, "  Evidence:");
            for (i, evidence) in shown.iter().enumerate() {
                let connector = if i == shown.len() - 1 {
                    "\u{2514}\u{2500}"
                } else {
                    "\u{251C}\u{2500}"
                };
                let mark = if evidence.fired { "+" } else { "-" };
                let detail = match (&evidence.artifact, &evidence.note) {
                    (Some(artifact), Some(note)) => format!("{} ({})", artifact, note),
                    (Some(artifact), None) => artifact.to_string(),
                    (None, Some(note)) => note.clone(),
                    (None, None) => String::new(),
                };
                let _ = writeln!(
                    out,
                    "  {} {} {} [{}] {}",
                    connector, mark, evidence.signal_id, evidence.weight, detail
                );
            }
        }
    }
}

fn format_catalog_human(summary: &CatalogSummary<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} catalog: {} categories",
        summary.axis,
        summary.categories.len()
    );

    for category in &summary.categories {
        let _ = writeln!(
            out,
            "\n{} ({}) min {}%, total weight {}",
            category.display_name, category.id, category.minimum_confidence, category.max_possible_weight
        );
        if let Some(description) = category.description {
            let _ = writeln!(out, "  {}", description);
        }
        for signal in &category.signals {
            let _ = writeln!(out, "  - {} [{}] {}", signal.id, signal.kind, signal.weight);
        }
    }
    out
}
