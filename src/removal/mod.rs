//! Removal of unused package directories from the vendor tree

mod executor;
mod plan;

pub use executor::{PackageRemoval, RemovalOutcome, RemovalSummary, SafeDeleter};
pub use plan::{package_dir, PlannedRemoval, RefusedRemoval, RemovalError, RemovalPlan};
