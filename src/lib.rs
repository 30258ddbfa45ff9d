//! vendorsweep - Find and remove unused Composer packages
//!
//! This library determines which installed Composer packages of a PHP
//! application are never referenced by its source code, and removes them
//! without breaking the requirements of the packages that stay.
//!
//! # Architecture
//!
//! The cleanup pipeline consists of:
//! 1. **File Discovery** - Find all .php files under the scan directories
//! 2. **Parsing** - Parse source files using tree-sitter and collect every
//!    imported namespace and statically named class or function
//! 3. **Graph Building** - Index the installed packages and their `requires`
//! 4. **Classification** - Match autoload prefixes against used names, then
//!    keep everything a used or excluded package depends on
//! 5. **Removal** - Delete (or, in a dry run, list) the unused package directories
//! 6. **Reporting** - Output results in various formats

pub mod analysis;
pub mod composer;
pub mod config;
pub mod discovery;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod removal;
pub mod report;

pub use analysis::{Classification, Classifications, ClosureEngine, UsageExtractor, UsageScanner, UsageSet};
pub use composer::ProjectLayout;
pub use config::Config;
pub use discovery::FileFinder;
pub use graph::{Package, PackageGraph};
pub use pipeline::{Pipeline, RunReport};
pub use removal::{RemovalPlan, SafeDeleter};
pub use report::{ReportFormat, Reporter};
