use crate::config::Config;
use ignore::WalkBuilder;
use miette::{miette, IntoDiagnostic, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace, warn};

/// Extension of the files the scanner yields
pub const SOURCE_EXTENSION: &str = "php";

/// Represents a discovered source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path to the file
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load and return owned contents. Bytes that are not UTF-8 (Latin-1
    /// comments and literals in legacy code) become U+FFFD.
    pub fn read_contents(&self) -> Result<String> {
        let bytes = std::fs::read(&self.path).into_diagnostic()?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

/// Check whether a path has the source extension
pub fn is_source_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

/// An `exclude_directories` entry split into path components.
///
/// `tests` prunes every directory named `tests`; `Legacy/tests` prunes a
/// `tests` directory whose parent is `Legacy`, at any depth below the scan root.
#[derive(Debug, Clone)]
struct ExcludeRule {
    segments: Vec<String>,
}

impl ExcludeRule {
    fn parse(raw: &str) -> Option<Self> {
        let segments: Vec<String> = raw
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    fn matches(&self, relative: &[String]) -> bool {
        relative
            .windows(self.segments.len())
            .any(|window| window == self.segments.as_slice())
    }
}

fn relative_segments(path: &Path, root: &Path) -> Vec<String> {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// File finder for discovering PHP sources in a project
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find all source files below the configured scan directories.
    ///
    /// The result is sorted, so two scans of an unchanged tree agree.
    /// No scan directories means no files. A configured directory that does
    /// not exist is an error.
    pub fn find_files(&self, root: &Path) -> Result<Vec<SourceFile>> {
        if self.config.scan_directories.is_empty() {
            debug!("No scan directories configured");
            return Ok(Vec::new());
        }

        let rules: Vec<ExcludeRule> = self
            .config
            .exclude_directories
            .iter()
            .filter_map(|raw| ExcludeRule::parse(raw))
            .collect();

        let dirs: Vec<PathBuf> = self
            .config
            .scan_directories
            .iter()
            .map(|dir| root.join(dir))
            .collect();

        if let Some(missing) = dirs.iter().find(|dir| !dir.is_dir()) {
            return Err(miette!("Scan directory does not exist: {}", missing.display()));
        }

        let mut files: Vec<SourceFile> = dirs
            .iter()
            .flat_map(|dir| self.scan_directory(dir, &rules))
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);

        debug!("Found {} files", files.len());
        Ok(files)
    }

    /// Scan a single directory for source files
    fn scan_directory(&self, dir: &Path, rules: &[ExcludeRule]) -> Vec<SourceFile> {
        let scan_root = dir.to_path_buf();
        let rules = rules.to_vec();

        let walker = WalkBuilder::new(dir)
            .hidden(true)           // Skip hidden files and VCS directories
            .git_ignore(false)      // Ignored files may still be live application code
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .parents(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir || rules.is_empty() {
                    return true;
                }
                let relative = relative_segments(entry.path(), &scan_root);
                let excluded = rules.iter().any(|rule| rule.matches(&relative));
                if excluded {
                    trace!("Excluding: {}", entry.path().display());
                }
                !excluded
            })
            .build();

        walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    // sources below here go unscanned
                    warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter(|entry| is_source_path(entry.path()))
            .map(|entry| {
                trace!("Found: {}", entry.path().display());
                SourceFile::new(entry.path().to_path_buf())
            })
            .collect()
    }
}
