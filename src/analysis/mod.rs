mod closure;
mod matcher;
mod scan;
mod usage;

pub use closure::{Classifications, ClosureEngine, PackageVerdict};
pub use matcher::NamespaceMatcher;
pub use scan::{ParseFailure, ScanOutcome, UsageScanner};
pub use usage::{UsageExtractor, UsageSet};

use serde::Serialize;

/// What a run decided about one installed package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// One of its autoload prefixes matches a used name
    Used,
    /// Kept by an excluded name prefix or package type
    Excluded,
    /// Required (transitively) by a used or excluded package
    ProtectedByDependency,
    /// Safe to remove
    Unused,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Used => "used",
            Classification::Excluded => "excluded",
            Classification::ProtectedByDependency => "protected by dependency",
            Classification::Unused => "unused",
        }
    }

    /// Whether the package stays installed
    pub fn is_kept(&self) -> bool {
        !matches!(self, Classification::Unused)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
