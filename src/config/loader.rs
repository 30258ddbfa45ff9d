use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File names probed in the project root, in order
pub const DEFAULT_CONFIG_NAMES: &[&str] = &[
    "composer-cleanup.json",
    "composer-cleanup.yaml",
    "composer-cleanup.yml",
    "composer-cleanup.toml",
];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// How an autoload prefix is compared against a used name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceMatching {
    /// Raw string prefix: `Acme\Util` matches `Acme\Utility\Foo`
    #[default]
    Prefix,
    /// Namespace segments must line up: `Acme\Util` only matches `Acme\Util\...`
    Segment,
}

impl NamespaceMatching {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceMatching::Prefix => "prefix",
            NamespaceMatching::Segment => "segment",
        }
    }
}

/// Configuration for a cleanup run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories (relative to the project root) searched for PHP sources
    pub scan_directories: Vec<PathBuf>,

    /// Sub-paths pruned from the scan
    pub exclude_directories: Vec<String>,

    /// Package name prefixes that are never removed
    pub exclude_packages: Vec<String>,

    /// Package types that are never removed
    pub exclude_package_types: Vec<String>,

    /// Report removal candidates without touching the filesystem
    pub dry_run: bool,

    /// Emit the detail of every classification step
    pub verbose: bool,

    /// Autoload prefix comparison policy
    pub namespace_matching: NamespaceMatching,

    /// Also keep packages that require a protected package
    pub protect_dependents: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_directories: vec![],
            exclude_directories: vec![],
            exclude_packages: vec![],
            exclude_package_types: vec![
                "composer-plugin".to_string(),
                "metapackage".to_string(),
            ],
            dry_run: true,
            verbose: false,
            namespace_matching: NamespaceMatching::Prefix,
            protect_dependents: false,
        }
    }
}

/// Where the effective configuration came from
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No config file present
    Defaults,
    /// A config file was present but unusable; defaults were substituted
    Fallback(ConfigError),
}

/// A configuration together with its provenance
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

impl Config {
    /// Load configuration from a file (JSON, YAML or TOML by extension)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            }),
            "toml" => toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            }),
            _ => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Find the first config file present in the project root
    pub fn find_default_file(project_root: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.is_file())
    }

    /// Load the configuration, substituting defaults when the file is malformed.
    ///
    /// An explicit path takes precedence over the default locations. A file
    /// that cannot be read or parsed never aborts the run: the defaults scan
    /// nothing and are dry-run, so falling back to them cannot delete anything.
    pub fn load_or_default(project_root: &Path, explicit: Option<&Path>) -> LoadedConfig {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_default_file(project_root),
        };

        let Some(path) = path else {
            debug!("No configuration file in {}", project_root.display());
            return LoadedConfig {
                config: Self::default(),
                source: ConfigSource::Defaults,
            };
        };

        match Self::from_file(&path) {
            Ok(config) => {
                debug!("Loaded configuration from {}", path.display());
                LoadedConfig {
                    config,
                    source: ConfigSource::File(path),
                }
            }
            Err(e) => {
                warn!("{}; using default configuration", e);
                LoadedConfig {
                    config: Self::default(),
                    source: ConfigSource::Fallback(e),
                }
            }
        }
    }

    /// Check whether a package name matches an excluded name prefix
    pub fn is_excluded_name(&self, name: &str) -> bool {
        self.exclude_packages
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Check whether a package type is excluded
    pub fn is_excluded_type(&self, package_type: &str) -> bool {
        self.exclude_package_types.iter().any(|t| t == package_type)
    }
}
