// One synchronous cleanup pass: scan, extract, classify, remove

use crate::analysis::{Classifications, ClosureEngine, ParseFailure, UsageScanner, UsageSet};
use crate::composer::ProjectLayout;
use crate::config::Config;
use crate::discovery::FileFinder;
use crate::graph::PackageGraph;
use crate::removal::{RefusedRemoval, RemovalPlan, RemovalSummary, SafeDeleter};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Everything a run found and did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub project_root: PathBuf,
    pub vendor_dir: PathBuf,
    pub dry_run: bool,

    /// No scan directories were configured; nothing was analyzed
    pub skipped: bool,

    pub files_scanned: usize,
    pub usage: UsageSet,
    pub parse_failures: Vec<ParseFailure>,
    pub installed_packages: usize,
    pub classifications: Classifications,
    pub refused: Vec<RefusedRemoval>,
    pub removal: RemovalSummary,
}

impl RunReport {
    fn skipped(layout: &ProjectLayout, dry_run: bool) -> Self {
        Self {
            project_root: layout.root.clone(),
            vendor_dir: layout.vendor_dir.clone(),
            dry_run,
            skipped: true,
            files_scanned: 0,
            usage: UsageSet::default(),
            parse_failures: Vec::new(),
            installed_packages: 0,
            classifications: Classifications::default(),
            refused: Vec::new(),
            removal: RemovalSummary::default(),
        }
    }

    /// Unused packages in input order
    pub fn unused(&self) -> Vec<&str> {
        self.classifications.unused()
    }

    /// Whether any planned package could not be fully removed
    pub fn has_failures(&self) -> bool {
        self.removal.has_failures()
    }
}

/// Wires the components together for one project
pub struct Pipeline<'a> {
    config: &'a Config,
    layout: ProjectLayout,
    show_progress: bool,
    interactive: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, layout: ProjectLayout) -> Self {
        Self {
            config,
            layout,
            show_progress: false,
            interactive: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn run(&self) -> Result<RunReport> {
        let config = self.config;

        if config.scan_directories.is_empty() {
            info!("No scan directories configured, skipping application scan.");
            return Ok(RunReport::skipped(&self.layout, config.dry_run));
        }

        // Step 1: read what Composer installed
        let packages = self
            .layout
            .installed_packages()
            .into_diagnostic()
            .wrap_err("Failed to load the installed package list")?;
        let installed_packages = packages.len();

        // Step 2: find and scan sources
        info!("Analyzing application for used classes...");
        let files = FileFinder::new(config).find_files(&self.layout.root)?;
        let outcome = UsageScanner::new()
            .with_progress(self.show_progress)
            .scan(&files);

        // Step 3: classify
        let graph = PackageGraph::build(packages);
        let classifications = ClosureEngine::new(config).classify(&outcome.usage, &graph);

        // Step 4: plan and execute removals
        let plan = RemovalPlan::new(classifications.unused(), &self.layout.vendor_dir);
        let removal = SafeDeleter::new(config.dry_run, self.interactive).execute(&plan);

        Ok(RunReport {
            project_root: self.layout.root.clone(),
            vendor_dir: self.layout.vendor_dir.clone(),
            dry_run: config.dry_run,
            skipped: false,
            files_scanned: outcome.files_scanned,
            usage: outcome.usage,
            parse_failures: outcome.failures,
            installed_packages,
            classifications,
            refused: plan.refused,
            removal,
        })
    }
}
