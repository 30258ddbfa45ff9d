use super::plan::{PlannedRemoval, RemovalError, RemovalPlan};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What happened to one planned package directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemovalOutcome {
    Removed,
    WouldRemove,
    /// Nothing on disk at the planned path
    Absent,
    /// Declined at the interactive prompt
    Declined,
    Failed {
        message: String,
        /// Some contents were deleted before the failure
        partial: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRemoval {
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: RemovalOutcome,
}

/// Per-package results of executing a plan, in plan order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalSummary {
    pub packages: Vec<PackageRemoval>,
}

impl RemovalSummary {
    fn with_outcome(&self, pred: impl Fn(&RemovalOutcome) -> bool) -> Vec<&PackageRemoval> {
        self.packages.iter().filter(|p| pred(&p.outcome)).collect()
    }

    pub fn removed(&self) -> Vec<&PackageRemoval> {
        self.with_outcome(|o| matches!(o, RemovalOutcome::Removed))
    }

    pub fn would_remove(&self) -> Vec<&PackageRemoval> {
        self.with_outcome(|o| matches!(o, RemovalOutcome::WouldRemove))
    }

    pub fn absent(&self) -> Vec<&PackageRemoval> {
        self.with_outcome(|o| matches!(o, RemovalOutcome::Absent))
    }

    pub fn declined(&self) -> Vec<&PackageRemoval> {
        self.with_outcome(|o| matches!(o, RemovalOutcome::Declined))
    }

    pub fn failed(&self) -> Vec<&PackageRemoval> {
        self.with_outcome(|o| matches!(o, RemovalOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        !self.failed().is_empty()
    }
}

/// Deletes planned package directories, or reports them in a dry run
pub struct SafeDeleter {
    dry_run: bool,
    interactive: bool,
}

impl SafeDeleter {
    pub fn new(dry_run: bool, interactive: bool) -> Self {
        Self {
            dry_run,
            interactive,
        }
    }

    /// Execute the plan package by package. Filesystem errors are recorded
    /// against their package and never stop the remaining removals. A
    /// failing confirmation prompt is recorded against its package and ends
    /// the run; what was already removed stays in the summary.
    pub fn execute(&self, plan: &RemovalPlan) -> RemovalSummary {
        let mut summary = RemovalSummary::default();

        for entry in &plan.entries {
            let (outcome, stop) = match self.execute_one(entry) {
                Ok(outcome) => (outcome, false),
                Err(e) => {
                    warn!("Confirmation for {} failed, stopping: {}", entry.name, e);
                    let outcome = RemovalOutcome::Failed {
                        message: e.to_string(),
                        partial: false,
                    };
                    (outcome, true)
                }
            };

            summary.packages.push(PackageRemoval {
                name: entry.name.clone(),
                path: entry.path.clone(),
                outcome,
            });

            if stop {
                break;
            }
        }

        summary
    }

    /// Errors only when the confirmation prompt fails
    fn execute_one(&self, entry: &PlannedRemoval) -> Result<RemovalOutcome> {
        let metadata = match fs::symlink_metadata(&entry.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} already absent at {}", entry.name, entry.path.display());
                return Ok(RemovalOutcome::Absent);
            }
            Err(e) => {
                return Ok(RemovalOutcome::Failed {
                    message: e.to_string(),
                    partial: false,
                })
            }
        };

        let is_link = metadata.file_type().is_symlink();
        if !is_link && !metadata.is_dir() {
            debug!("{} is not a directory, skipping", entry.path.display());
            return Ok(RemovalOutcome::Absent);
        }

        if self.dry_run {
            debug!("Would remove {}", entry.path.display());
            return Ok(RemovalOutcome::WouldRemove);
        }

        if self.interactive && !self.confirm(entry)? {
            return Ok(RemovalOutcome::Declined);
        }

        let result = if is_link {
            unlink(&entry.path).map(|_| 0)
        } else {
            remove_tree(&entry.path)
        };

        match result {
            Ok(_) => {
                debug!("Removed {}", entry.path.display());
                Ok(RemovalOutcome::Removed)
            }
            Err((e, removed)) => {
                warn!("Failed to remove {}: {}", entry.name, e);
                Ok(RemovalOutcome::Failed {
                    message: e.to_string(),
                    partial: removed > 0,
                })
            }
        }
    }

    fn confirm(&self, entry: &PlannedRemoval) -> Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Remove unused package '{}' ({})?",
                entry.name,
                entry.path.display()
            ))
            .default(false)
            .interact()
            .into_diagnostic()
    }
}

/// Remove a symlinked package directory without touching its target
fn unlink(path: &Path) -> std::result::Result<(), (RemovalError, usize)> {
    let io_error = |source| {
        (
            RemovalError::Io {
                path: path.to_path_buf(),
                source,
            },
            0,
        )
    };

    // Windows directory symlinks need remove_dir
    fs::remove_file(path).or_else(|_| fs::remove_dir(path)).map_err(io_error)
}

/// Delete files before their directories, the package directory last.
/// On error, returns how many entries were already gone.
fn remove_tree(root: &Path) -> std::result::Result<usize, (RemovalError, usize)> {
    let mut removed = 0;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .contents_first(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| {
            (
                RemovalError::Walk {
                    path: root.to_path_buf(),
                    source,
                },
                removed,
            )
        })?;

        let result = if entry.file_type().is_dir() {
            fs::remove_dir(entry.path())
        } else {
            fs::remove_file(entry.path())
        };

        result.map_err(|source| {
            (
                RemovalError::Io {
                    path: entry.path().to_path_buf(),
                    source,
                },
                removed,
            )
        })?;
        removed += 1;
    }

    Ok(removed)
}
