use crate::analysis::PackageVerdict;
use crate::pipeline::RunReport;
use crate::removal::{PackageRemoval, RefusedRemoval};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, run: &RunReport) -> Result<()> {
        let report = JsonReport::from_run(run);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    project_root: &'a Path,
    vendor_dir: &'a Path,
    dry_run: bool,
    skipped: bool,
    unused: Vec<&'a str>,
    packages: &'a [PackageVerdict],
    classmap_only: &'a [String],
    removals: &'a [PackageRemoval],
    refused: &'a [RefusedRemoval],
    scan: JsonScan<'a>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonScan<'a> {
    files_scanned: usize,
    used_namespaces: Vec<&'a str>,
    used_symbols: Vec<&'a str>,
    parse_failures: Vec<JsonFailure<'a>>,
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    file: String,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonSummary {
    installed: usize,
    used: usize,
    excluded: usize,
    protected_by_dependency: usize,
    unused: usize,
    removed: usize,
    would_remove: usize,
    failed: usize,
}

impl<'a> JsonReport<'a> {
    fn from_run(run: &'a RunReport) -> Self {
        let classes = &run.classifications;

        let summary = JsonSummary {
            installed: run.installed_packages,
            used: classes.used().len(),
            excluded: classes.excluded().len(),
            protected_by_dependency: classes.protected_by_dependency().len(),
            unused: classes.unused().len(),
            removed: run.removal.removed().len(),
            would_remove: run.removal.would_remove().len(),
            failed: run.removal.failed().len(),
        };

        let scan = JsonScan {
            files_scanned: run.files_scanned,
            used_namespaces: run.usage.used_namespaces.iter().map(String::as_str).collect(),
            used_symbols: run.usage.used_symbols.iter().map(String::as_str).collect(),
            parse_failures: run
                .parse_failures
                .iter()
                .map(|f| JsonFailure {
                    file: f.path.display().to_string(),
                    message: &f.message,
                })
                .collect(),
        };

        Self {
            version: env!("CARGO_PKG_VERSION"),
            project_root: &run.project_root,
            vendor_dir: &run.vendor_dir,
            dry_run: run.dry_run,
            skipped: run.skipped,
            unused: classes.unused(),
            packages: &classes.verdicts,
            classmap_only: &classes.classmap_only,
            removals: &run.removal.packages,
            refused: &run.refused,
            scan,
            summary,
        }
    }
}
