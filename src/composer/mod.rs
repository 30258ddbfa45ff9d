//! Read-only view of what Composer wrote into the project.
//!
//! The installed package list comes from `vendor/composer/installed.json`,
//! in either the Composer 2 object form (`{"packages": [...]}`) or the
//! Composer 1 bare array form. The vendor directory comes from the
//! `config.vendor-dir` key of the project's `composer.json`.

use crate::graph::{Autoload, Package, DEFAULT_PACKAGE_TYPE};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Vendor directory Composer uses when `config.vendor-dir` is not set
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstalledFile {
    V2 { packages: Vec<InstalledPackage> },
    V1(Vec<InstalledPackage>),
}

#[derive(Debug, Deserialize)]
struct InstalledPackage {
    name: String,
    #[serde(rename = "type")]
    package_type: Option<String>,
    #[serde(default)]
    autoload: Autoload,
    #[serde(default)]
    require: BTreeMap<String, serde_json::Value>,
}

impl From<InstalledPackage> for Package {
    fn from(installed: InstalledPackage) -> Self {
        Package {
            name: installed.name,
            package_type: installed
                .package_type
                .unwrap_or_else(|| DEFAULT_PACKAGE_TYPE.to_string()),
            autoload: installed.autoload,
            requires: installed.require.into_keys().collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    config: ComposerJsonConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerJsonConfig {
    #[serde(rename = "vendor-dir")]
    vendor_dir: Option<String>,
}

/// Where the project and its vendor tree live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub vendor_dir: PathBuf,
}

impl ProjectLayout {
    /// Resolve the vendor directory: an explicit override first, then
    /// `composer.json`, then `vendor`. Relative paths are taken from the
    /// project root.
    pub fn discover(root: &Path, vendor_override: Option<&Path>) -> Result<Self, ComposerError> {
        let vendor = match vendor_override {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from(read_vendor_dir(root)?.unwrap_or_else(|| DEFAULT_VENDOR_DIR.to_string())),
        };

        let vendor_dir = if vendor.is_absolute() {
            vendor
        } else {
            root.join(vendor)
        };

        debug!("Vendor directory: {}", vendor_dir.display());

        Ok(Self {
            root: root.to_path_buf(),
            vendor_dir,
        })
    }

    pub fn installed_json(&self) -> PathBuf {
        self.vendor_dir.join("composer").join("installed.json")
    }

    /// Load the installed package list
    pub fn installed_packages(&self) -> Result<Vec<Package>, ComposerError> {
        load_installed(&self.installed_json())
    }
}

/// `config.vendor-dir` from `composer.json`, if the file exists and sets it
fn read_vendor_dir(root: &Path) -> Result<Option<String>, ComposerError> {
    let path = root.join("composer.json");
    if !path.is_file() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ComposerError::Read {
        path: path.clone(),
        source,
    })?;
    let manifest: ComposerJson =
        serde_json::from_str(&contents).map_err(|source| ComposerError::Json { path, source })?;

    Ok(manifest.config.vendor_dir)
}

/// Parse an `installed.json` file in either Composer format
pub fn load_installed(path: &Path) -> Result<Vec<Package>, ComposerError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ComposerError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file: InstalledFile = serde_json::from_str(&contents).map_err(|source| ComposerError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let installed = match file {
        InstalledFile::V2 { packages } => packages,
        InstalledFile::V1(packages) => packages,
    };

    debug!("Loaded {} installed packages from {}", installed.len(), path.display());

    Ok(installed.into_iter().map(Package::from).collect())
}
