use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Composer's type for packages that do not declare one
pub const DEFAULT_PACKAGE_TYPE: &str = "library";

/// Autoload conventions a package can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AutoloadKind {
    #[serde(rename = "psr-4")]
    Psr4,
    #[serde(rename = "psr-0")]
    Psr0,
    #[serde(rename = "classmap")]
    Classmap,
}

impl AutoloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoloadKind::Psr4 => "psr-4",
            AutoloadKind::Psr0 => "psr-0",
            AutoloadKind::Classmap => "classmap",
        }
    }

    /// Whether entries of this kind carry a namespace prefix
    pub fn is_namespaced(&self) -> bool {
        matches!(self, AutoloadKind::Psr4 | AutoloadKind::Psr0)
    }
}

/// A path, or a list of paths, as Composer writes them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(path) => vec![path],
            OneOrMany::Many(paths) => paths,
        }
    }
}

/// The autoload table of a package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoload {
    /// Namespace prefix → source directories
    #[serde(rename = "psr-4", default)]
    pub psr4: BTreeMap<String, OneOrMany>,

    /// Namespace or PEAR-style class prefix → source directories
    #[serde(rename = "psr-0", default)]
    pub psr0: BTreeMap<String, OneOrMany>,

    /// Directories and files scanned for classes
    #[serde(default)]
    pub classmap: Vec<String>,
}

impl Autoload {
    /// Declared prefixes of the namespaced conventions, psr-4 first
    pub fn namespace_prefixes(&self) -> impl Iterator<Item = (AutoloadKind, &str)> {
        self.psr4
            .keys()
            .map(|p| (AutoloadKind::Psr4, p.as_str()))
            .chain(self.psr0.keys().map(|p| (AutoloadKind::Psr0, p.as_str())))
    }

    /// Whether the package can only be autoloaded through a classmap
    pub fn is_classmap_only(&self) -> bool {
        self.psr4.is_empty() && self.psr0.is_empty() && !self.classmap.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.psr4.is_empty() && self.psr0.is_empty() && self.classmap.is_empty()
    }
}

/// An installed package as supplied by the host repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Unique `vendor/name`
    pub name: String,

    /// Free-form classification (`library`, `metapackage`, `composer-plugin`, ...)
    pub package_type: String,

    pub autoload: Autoload,

    /// Names of required packages, platform requirements included
    pub requires: Vec<String>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_type: DEFAULT_PACKAGE_TYPE.to_string(),
            autoload: Autoload::default(),
            requires: Vec::new(),
        }
    }

    pub fn with_type(mut self, package_type: impl Into<String>) -> Self {
        self.package_type = package_type.into();
        self
    }

    pub fn with_psr4(mut self, prefix: impl Into<String>, path: impl Into<String>) -> Self {
        self.autoload
            .psr4
            .insert(prefix.into(), OneOrMany::One(path.into()));
        self
    }

    pub fn with_psr0(mut self, prefix: impl Into<String>, path: impl Into<String>) -> Self {
        self.autoload
            .psr0
            .insert(prefix.into(), OneOrMany::One(path.into()));
        self
    }

    pub fn with_classmap(mut self, path: impl Into<String>) -> Self {
        self.autoload.classmap.push(path.into());
        self
    }

    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }
}
