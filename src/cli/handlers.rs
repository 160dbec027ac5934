//! Command handlers
//!
//! Each handler returns the process exit code: 0 on success, 2 when
//! `detect` could not classify every requested axis, 1 on any error.

use crate::catalog::{Axis, Catalog};
use crate::cli::commands::{DetectArgs, ShowArgs, ValidateArgs};
use crate::cli::output::{AxisOutput, DetectionOutput, OutputFormat, OutputFormatter};
use crate::config::StackprobeConfig;
use crate::detection::{Classifier, DetectionReport};
use crate::error::{CatalogError, DetectError};
use crate::fs::RealFileSystem;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_UNKNOWN: i32 = 2;

/// Load the catalog for `axis`: an explicit file, else the configured
/// override, else the bundled catalog.
pub fn load_catalog(
    axis: Axis,
    explicit: Option<&Path>,
    config: &StackprobeConfig,
) -> Result<Catalog, CatalogError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.catalog_override(axis));

    let catalog = match path {
        Some(path) => {
            debug!(axis = %axis, path = %path.display(), "Loading catalog override");
            Catalog::from_path(&path)?
        }
        None => Catalog::builtin(axis)?,
    };

    if catalog.axis() != axis {
        return Err(CatalogError::AxisMismatch {
            expected: axis,
            found: catalog.axis(),
        });
    }
    Ok(catalog)
}

pub async fn handle_detect(args: &DetectArgs, quiet: bool) -> i32 {
    match run_detect(args, quiet).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    }
}

async fn run_detect(args: &DetectArgs, quiet: bool) -> Result<i32> {
    let project_path = match &args.project_path {
        Some(path) => path.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let project_path = project_path.canonicalize().unwrap_or(project_path);
    debug!(project = %project_path.display(), "Project path resolved");

    let config = StackprobeConfig::from_env().context("Invalid configuration")?;

    let mut jobs = Vec::new();
    for axis in args.axes() {
        let catalog = load_catalog(axis, args.catalog_for(axis), &config)
            .with_context(|| format!("Failed to load {} catalog", axis))?;
        jobs.push(catalog);
    }

    let classifier = Arc::new(
        Classifier::new(Arc::new(RealFileSystem::new())).with_limits(config.probe_limits()),
    );

    info!(project = %project_path.display(), axes = jobs.len(), "Classifying project");

    let handles: Vec<_> = jobs
        .into_iter()
        .map(|catalog| {
            let classifier = Arc::clone(&classifier);
            let root = project_path.clone();
            tokio::task::spawn_blocking(move || {
                let report = classifier.classify(&catalog, &root);
                (catalog, report)
            })
        })
        .collect();

    let run = async {
        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await);
        }
        results
    };

    let results = match args.timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .map_err(|_| DetectError::Timeout(secs))?,
        None => run.await,
    };

    let mut output = DetectionOutput::new(project_path.clone());
    for joined in results {
        let (catalog, report) = joined.map_err(|e| anyhow!("Classification task failed: {}", e))?;
        let report: DetectionReport = report?;
        let axis_output = AxisOutput::new(report, &catalog);
        output.insert(catalog.axis(), axis_output);
    }

    let format: OutputFormat = args.format.into();
    let rendered = OutputFormatter::new(format)
        .with_evidence(args.evidence)
        .format(&output)?;
    emit(&rendered, args.output.as_deref(), quiet)?;

    Ok(if output.is_confident() {
        EXIT_OK
    } else {
        EXIT_UNKNOWN
    })
}

pub fn handle_catalog_validate(args: &ValidateArgs, quiet: bool) -> i32 {
    match Catalog::from_path(&args.file) {
        Ok(catalog) => {
            info!(path = %args.file.display(), "Catalog is valid");
            if !quiet {
                println!(
                    "\u{2713} {}: valid {} catalog ({} categories, {} signals)",
                    args.file.display(),
                    catalog.axis(),
                    catalog.categories().len(),
                    catalog.signals().len()
                );
            }
            EXIT_OK
        }
        Err(e) => {
            error!(path = %args.file.display(), error = %e, "Catalog is invalid");
            eprintln!("\u{2717} {}: {}", args.file.display(), e);
            EXIT_ERROR
        }
    }
}

pub fn handle_catalog_show(args: &ShowArgs) -> i32 {
    let result = (|| -> Result<String> {
        let config = StackprobeConfig::from_env().context("Invalid configuration")?;
        let axis: Axis = args.axis.into();
        let catalog = load_catalog(axis, args.catalog.as_deref(), &config)
            .with_context(|| format!("Failed to load {} catalog", axis))?;
        OutputFormatter::new(args.format.into()).format_catalog(&catalog)
    })();

    match result {
        Ok(rendered) => {
            println!("{}", rendered);
            EXIT_OK
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    }
}

fn emit(rendered: &str, output_file: Option<&Path>, quiet: bool) -> Result<()> {
    match output_file {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "Output written");
            if !quiet {
                println!("Output written to: {}", path.display());
            }
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_catalog(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    fn config() -> StackprobeConfig {
        StackprobeConfig {
            log_level: "info".to_string(),
            max_file_size_bytes: 1_048_576,
            max_walk_depth: 12,
            max_walk_files: 5000,
            stack_catalog: None,
            phase_catalog: None,
            language_catalog: None,
            workspace_catalog: None,
        }
    }

    #[test]
    fn test_load_builtin_catalog() {
        let catalog = load_catalog(Axis::Phase, None, &config()).unwrap();
        assert_eq!(catalog.axis(), Axis::Phase);
    }

    #[test]
    fn test_load_explicit_catalog_checks_axis() {
        let mut file = temp_catalog(".yaml");
        writeln!(
            file,
            "axis: phase\ncategories:\n  - id: x\n    display_name: X\n    signals: [{{ id: a, kind: file-exists, path: a, weight: 1 }}]"
        )
        .unwrap();

        assert!(load_catalog(Axis::Phase, Some(file.path()), &config()).is_ok());
        let err = load_catalog(Axis::Framework, Some(file.path()), &config()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::AxisMismatch {
                expected: Axis::Framework,
                found: Axis::Phase,
            }
        ));
        assert_eq!(err.to_string(), "Catalog declares axis phase, expected framework");
    }

    #[test]
    fn test_configured_override_used() {
        let mut file = temp_catalog(".json");
        write!(
            file,
            r#"{{"axis": "framework", "categories": [{{"id": "custom", "display_name": "Custom",
                "signals": [{{"id": "marker", "kind": "file-exists", "path": ".custom", "weight": 1}}]}}]}}"#
        )
        .unwrap();

        let config = StackprobeConfig {
            stack_catalog: Some(file.path().to_path_buf()),
            ..config()
        };
        let catalog = load_catalog(Axis::Framework, None, &config).unwrap();
        assert!(catalog.category("custom").is_some());
    }
}
