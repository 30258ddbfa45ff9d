//! End-to-end pipeline tests
//!
//! Each test builds a throwaway PHP project with an installed vendor tree
//! and runs the full scan → classify → remove pass against it.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vendorsweep::analysis::Classification;
use vendorsweep::composer::ProjectLayout;
use vendorsweep::config::Config;
use vendorsweep::pipeline::{Pipeline, RunReport};

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn vendor(&self) -> PathBuf {
        self.root().join("vendor")
    }

    fn source(&self, relative: &str, contents: &str) -> &Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    /// Write installed.json and create a directory per package
    fn installed(&self, json: &str) -> &Self {
        let composer_dir = self.vendor().join("composer");
        fs::create_dir_all(&composer_dir).unwrap();
        fs::write(composer_dir.join("installed.json"), json).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(json).unwrap();
        for package in parsed["packages"].as_array().unwrap() {
            let name = package["name"].as_str().unwrap();
            let dir = self.vendor().join(name).join("src");
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("Entry.php"), "<?php\n").unwrap();
        }
        self
    }

    fn config(&self) -> Config {
        Config {
            scan_directories: vec![PathBuf::from("app")],
            exclude_package_types: vec!["metapackage".to_string()],
            ..Config::default()
        }
    }

    fn run(&self, config: &Config) -> RunReport {
        let layout = ProjectLayout::discover(self.root(), None).unwrap();
        Pipeline::new(config, layout).run().expect("pipeline should run")
    }

    fn package_exists(&self, name: &str) -> bool {
        self.vendor().join(name).exists()
    }
}

const ACME: &str = r#"{
    "packages": [
        {"name": "acme/core", "autoload": {"psr-4": {"Acme\\Core\\": "src/"}}},
        {"name": "acme/util", "require": {"acme/core": "^1.0"}, "autoload": {"psr-4": {"Acme\\Util\\": "src/"}}}
    ]
}"#;

#[test]
fn test_used_package_keeps_its_requirements() {
    let project = Project::new();
    project
        .installed(ACME)
        .source("app/Service.php", "<?php\nuse Acme\\Util\\Helper;\n");

    let run = project.run(&project.config());

    assert_eq!(
        run.classifications.classification_of("acme/util"),
        Some(Classification::Used)
    );
    assert_eq!(
        run.classifications.classification_of("acme/core"),
        Some(Classification::ProtectedByDependency)
    );
    assert!(run.unused().is_empty());
    assert!(run.removal.packages.is_empty());
}

#[test]
fn test_nothing_used_lists_every_package() {
    let project = Project::new();
    project
        .installed(ACME)
        .source("app/Plain.php", "<?php\necho 'hello';\n");

    let run = project.run(&project.config());

    assert_eq!(run.unused(), vec!["acme/core", "acme/util"]);
    assert_eq!(run.removal.would_remove().len(), 2);
    // dry run by default
    assert!(project.package_exists("acme/core"));
    assert!(project.package_exists("acme/util"));
}

#[test]
fn test_excluded_type_is_never_unused() {
    let project = Project::new();
    project
        .installed(
            r#"{"packages": [
                {"name": "laravel/laravel-meta", "type": "metapackage"},
                {"name": "psr/log", "autoload": {"psr-4": {"Psr\\Log\\": "src"}}}
            ]}"#,
        )
        .source("app/Plain.php", "<?php\n");

    let run = project.run(&project.config());

    assert_eq!(
        run.classifications.classification_of("laravel/laravel-meta"),
        Some(Classification::Excluded)
    );
    assert_eq!(run.unused(), vec!["psr/log"]);
}

#[test]
fn test_parse_failure_does_not_hide_other_files() {
    let project = Project::new();
    project
        .installed(ACME)
        .source("app/Broken.php", "<?php\nuse Acme\\Core\\Thing;\nclass {\n")
        .source("app/Good.php", "<?php\nnew \\Acme\\Util\\Helper();\n");

    let run = project.run(&project.config());

    assert_eq!(run.files_scanned, 2);
    assert_eq!(run.parse_failures.len(), 1);
    assert!(run.parse_failures[0].path.ends_with("Broken.php"));
    assert!(!run.usage.used_namespaces.contains("Acme\\Core\\Thing"));
    assert_eq!(
        run.classifications.classification_of("acme/util"),
        Some(Classification::Used)
    );
    assert!(run.unused().is_empty());
}

#[test]
fn test_excluded_directories_are_not_scanned() {
    let project = Project::new();
    project
        .installed(ACME)
        .source("app/tests/UtilTest.php", "<?php\nuse Acme\\Util\\Helper;\n")
        .source("app/Plain.php", "<?php\n");

    let mut config = project.config();
    config.exclude_directories = vec!["tests".to_string()];

    let run = project.run(&config);
    assert_eq!(run.files_scanned, 1);
    assert_eq!(run.unused(), vec!["acme/core", "acme/util"]);
}

#[test]
fn test_dry_run_is_repeatable() {
    let project = Project::new();
    project
        .installed(ACME)
        .source("app/Core.php", "<?php\nuse Acme\\Core\\Thing;\n");

    let config = project.config();
    let first = project.run(&config);
    let second = project.run(&config);

    assert_eq!(first.unused(), vec!["acme/util"]);
    assert_eq!(first.unused(), second.unused());
    assert_eq!(first.removal.packages, second.removal.packages);
    assert!(project.package_exists("acme/util"));
}

#[test]
fn test_live_run_then_dry_run_finds_nothing_to_remove() {
    let project = Project::new();
    project
        .installed(ACME)
        .source("app/Core.php", "<?php\nuse Acme\\Core\\Thing;\n");

    let mut config = project.config();
    config.dry_run = false;

    let live = project.run(&config);
    assert_eq!(live.removal.removed().len(), 1);
    assert!(!project.package_exists("acme/util"));
    assert!(project.package_exists("acme/core"));
    assert!(!live.has_failures());

    // installed.json still lists the package; its directory is gone
    config.dry_run = true;
    let after = project.run(&config);
    assert_eq!(after.unused(), vec!["acme/util"]);
    assert!(after.removal.would_remove().is_empty());
    assert_eq!(after.removal.absent().len(), 1);
}

#[test]
fn test_no_scan_directories_skips_everything() {
    let project = Project::new();
    project.installed(ACME);

    let config = Config {
        dry_run: false,
        ..Config::default()
    };
    let run = project.run(&config);

    assert!(run.skipped);
    assert!(run.unused().is_empty());
    assert!(project.package_exists("acme/core"));
    assert!(project.package_exists("acme/util"));
}

#[test]
fn test_missing_installed_json_is_an_error() {
    let project = Project::new();
    project.source("app/Plain.php", "<?php\n");

    let layout = ProjectLayout::discover(project.root(), None).unwrap();
    let config = project.config();
    assert!(Pipeline::new(&config, layout).run().is_err());
}

#[test]
fn test_custom_vendor_dir_from_composer_json() {
    let project = Project::new();
    project
        .source("composer.json", r#"{"config": {"vendor-dir": "deps"}}"#)
        .source(
            "deps/composer/installed.json",
            r#"{"packages": [{"name": "psr/log", "autoload": {"psr-4": {"Psr\\Log\\": "src"}}}]}"#,
        )
        .source("deps/psr/log/src/NullLogger.php", "<?php\n")
        .source("app/Plain.php", "<?php\n");

    let mut config = project.config();
    config.dry_run = false;
    let run = project.run(&config);

    assert_eq!(run.removal.removed().len(), 1);
    assert!(!project.root().join("deps/psr/log").exists());
}

#[test]
fn test_missing_scan_directory_aborts_before_removal() {
    let project = Project::new();
    project
        .installed(ACME)
        .source("app/A.php", "<?php\nuse Acme\\Util\\Helper;\nuse Acme\\Core\\Thing;\n");

    let config = Config {
        scan_directories: vec![PathBuf::from("ap")],
        dry_run: false,
        ..Config::default()
    };
    let layout = ProjectLayout::discover(project.root(), None).unwrap();
    let err = Pipeline::new(&config, layout).run().unwrap_err();

    assert!(err.to_string().contains("Scan directory does not exist"));
    assert!(project.package_exists("acme/core"));
    assert!(project.package_exists("acme/util"));
}

#[test]
fn test_latin1_source_keeps_its_packages() {
    let project = Project::new();
    project.installed(ACME);
    fs::create_dir_all(project.root().join("app")).unwrap();
    fs::write(
        project.root().join("app/Legacy.php"),
        b"<?php\n// caf\xe9\nuse Acme\\Util\\Helper;\n",
    )
    .unwrap();

    let mut config = project.config();
    config.dry_run = false;
    let run = project.run(&config);

    assert!(run.parse_failures.is_empty());
    assert!(run.unused().is_empty());
    assert!(project.package_exists("acme/util"));
}
