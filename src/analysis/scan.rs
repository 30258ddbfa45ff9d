// Parallel usage scan using rayon

use super::usage::{UsageExtractor, UsageSet};
use crate::discovery::SourceFile;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// A file that contributed nothing because it could not be read or parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregate result of scanning a set of files
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub usage: UsageSet,
    pub files_scanned: usize,
    pub failures: Vec<ParseFailure>,
}

impl ScanOutcome {
    fn merge(mut self, other: ScanOutcome) -> Self {
        self.usage.merge(other.usage);
        self.files_scanned += other.files_scanned;
        self.failures.extend(other.failures);
        self
    }
}

/// Extracts usage from every file, one rayon task per file
pub struct UsageScanner {
    extractor: UsageExtractor,
    show_progress: bool,
}

impl UsageScanner {
    pub fn new() -> Self {
        Self {
            extractor: UsageExtractor::new(),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Scan all files. Failures are recorded per file and never abort the scan.
    pub fn scan(&self, files: &[SourceFile]) -> ScanOutcome {
        info!("Scanning {} files for used classes...", files.len());

        let pb = self.progress_bar(files.len());

        let mut outcome = files
            .par_iter()
            .fold(ScanOutcome::default, |mut local, file| {
                match self.scan_file(file) {
                    Ok(usage) => local.usage.merge(usage),
                    Err(failure) => {
                        debug!("Error parsing {}: {}", failure.path.display(), failure.message);
                        local.failures.push(failure);
                    }
                }
                local.files_scanned += 1;
                pb.inc(1);
                local
            })
            .reduce(ScanOutcome::default, ScanOutcome::merge);

        pb.finish_and_clear();

        // Worker scheduling decides the order failures arrive in
        outcome.failures.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(
            "Scan complete: {} symbols, {} namespaces, {} failures",
            outcome.usage.used_symbols.len(),
            outcome.usage.used_namespaces.len(),
            outcome.failures.len()
        );

        outcome
    }

    fn scan_file(&self, file: &SourceFile) -> Result<UsageSet, ParseFailure> {
        let contents = file.read_contents().map_err(|e| ParseFailure {
            path: file.path.clone(),
            message: e.to_string(),
        })?;

        self.extractor
            .extract_source(&file.path, &contents)
            .map_err(|e| ParseFailure {
                path: file.path.clone(),
                message: e.to_string(),
            })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

impl Default for UsageScanner {
    fn default() -> Self {
        Self::new()
    }
}
