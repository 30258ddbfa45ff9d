use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemovalError {
    #[error("refusing to remove '{name}': not a vendor/name package name")]
    InvalidName { name: String },

    #[error("failed to remove {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One package directory scheduled for removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRemoval {
    pub name: String,
    pub path: PathBuf,
}

/// A package that was not planned because its name cannot be mapped to a
/// directory safely
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefusedRemoval {
    pub name: String,
    pub reason: String,
}

/// The vendor directories of every unused package
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalPlan {
    pub entries: Vec<PlannedRemoval>,
    pub refused: Vec<RefusedRemoval>,
}

impl RemovalPlan {
    /// Map each unused package to `<vendor_dir>/<vendor>/<name>`
    pub fn new<'a, I>(unused: I, vendor_dir: &Path) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut plan = Self::default();

        for name in unused {
            match package_dir(vendor_dir, name) {
                Ok(path) => plan.entries.push(PlannedRemoval {
                    name: name.to_string(),
                    path,
                }),
                Err(e) => {
                    tracing::warn!("{}", e);
                    plan.refused.push(RefusedRemoval {
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Resolve the directory of a package, refusing any name that is not
/// exactly two plain path segments
pub fn package_dir(vendor_dir: &Path, name: &str) -> Result<PathBuf, RemovalError> {
    let invalid = || RemovalError::InvalidName {
        name: name.to_string(),
    };

    if name.contains('\\') || name.contains('\0') {
        return Err(invalid());
    }

    let segments: Vec<&str> = name.split('/').collect();
    if segments.len() != 2 {
        return Err(invalid());
    }

    for segment in &segments {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part.to_str() == Some(*segment) => {}
            _ => return Err(invalid()),
        }
    }

    Ok(vendor_dir.join(segments[0]).join(segments[1]))
}
