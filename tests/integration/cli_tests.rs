//! CLI integration tests
//!
//! These tests verify that the CLI works correctly with various options.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const INSTALLED: &str = r#"{
    "packages": [
        {"name": "monolog/monolog", "require": {"psr/log": "^3.0"}, "autoload": {"psr-4": {"Monolog\\": "src/Monolog"}}},
        {"name": "psr/log", "autoload": {"psr-4": {"Psr\\Log\\": "src"}}},
        {"name": "guzzlehttp/guzzle", "autoload": {"psr-4": {"GuzzleHttp\\": "src/"}}}
    ]
}"#;

/// A project using monolog (and so psr/log) but not guzzle
fn project() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");
    let root = dir.path();

    fs::create_dir_all(root.join("vendor/composer")).unwrap();
    fs::write(root.join("vendor/composer/installed.json"), INSTALLED).unwrap();
    for name in ["monolog/monolog", "psr/log", "guzzlehttp/guzzle"] {
        fs::create_dir_all(root.join("vendor").join(name).join("src")).unwrap();
        fs::write(root.join("vendor").join(name).join("src/A.php"), "<?php\n").unwrap();
    }

    fs::create_dir_all(root.join("app")).unwrap();
    fs::write(
        root.join("app/Logging.php"),
        "<?php\nuse Monolog\\Logger;\n\n$log = new Logger('app');\n",
    )
    .unwrap();

    dir
}

fn write_config(root: &Path, contents: &str) {
    fs::write(root.join("composer-cleanup.json"), contents).unwrap();
}

fn vendorsweep() -> Command {
    Command::cargo_bin("vendorsweep").expect("binary should be built")
}

#[test]
fn test_help() {
    vendorsweep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--scan-dir"))
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_version() {
    vendorsweep()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vendorsweep"));
}

#[test]
fn test_no_scan_directories() {
    let dir = project();

    vendorsweep()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No scan directories configured"));
}

#[test]
fn test_dry_run_from_config_file() {
    let dir = project();
    write_config(dir.path(), r#"{"scan_directories": ["app"]}"#);

    vendorsweep()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 potentially unused packages:"))
        .stdout(predicate::str::contains("  - guzzlehttp/guzzle"))
        .stdout(predicate::str::contains(
            "Would remove unused package: guzzlehttp/guzzle",
        ));

    assert!(dir.path().join("vendor/guzzlehttp/guzzle").exists());
}

#[test]
fn test_force_removes_packages() {
    let dir = project();

    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed unused package: guzzlehttp/guzzle"));

    assert!(!dir.path().join("vendor/guzzlehttp/guzzle").exists());
    assert!(dir.path().join("vendor/monolog/monolog").exists());
    assert!(dir.path().join("vendor/psr/log").exists());
}

#[test]
fn test_exclude_package_flag() {
    let dir = project();

    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--exclude-package", "guzzlehttp/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No unused packages found."));
}

#[test]
fn test_json_output() {
    let dir = project();
    let output = vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--format", "json", "--quiet"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["unused"], serde_json::json!(["guzzlehttp/guzzle"]));
    assert_eq!(report["dry_run"], serde_json::json!(true));
    assert_eq!(report["summary"]["protected_by_dependency"], serde_json::json!(1));
}

#[test]
fn test_json_output_file() {
    let dir = project();
    let out = dir.path().join("report.json");

    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["summary"]["installed"], serde_json::json!(3));
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let dir = project();
    write_config(dir.path(), "{ this is not json");

    vendorsweep()
        .arg(dir.path())
        .arg("--force")
        .assert()
        .success()
        .stderr(predicate::str::contains("using default configuration"))
        .stdout(predicate::str::contains("No scan directories configured"));

    assert!(dir.path().join("vendor/guzzlehttp/guzzle").exists());
}

#[test]
fn test_malformed_config_never_deletes_even_with_force() {
    let dir = project();
    write_config(dir.path(), r#"{"scan_directories": ["app"], "exclude_packages": ["guzzlehttp/"],"#);

    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("running as a dry run"))
        .stdout(predicate::str::contains(
            "Would remove unused package: guzzlehttp/guzzle",
        ));

    assert!(dir.path().join("vendor/guzzlehttp/guzzle").exists());
}

#[test]
fn test_missing_scan_directory_fails_without_removing() {
    let dir = project();

    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "ap", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Scan directory does not exist"));

    for name in ["monolog/monolog", "psr/log", "guzzlehttp/guzzle"] {
        assert!(dir.path().join("vendor").join(name).exists());
    }
}

#[test]
fn test_interactive_without_terminal_fails_cleanly() {
    let dir = project();

    // stdin and stderr are pipes here, so the confirmation prompt errors
    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--force", "--interactive"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to remove"));

    assert!(dir.path().join("vendor/guzzlehttp/guzzle").exists());
}

#[cfg(unix)]
#[test]
fn test_failed_removal_exits_non_zero() {
    use std::os::unix::fs::PermissionsExt;

    let dir = project();
    let locked = dir.path().join("vendor/guzzlehttp/guzzle/src");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    if fs::write(locked.join("writable"), "").is_ok() {
        // permissions are not enforced for this user (root)
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let assert = vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--force"])
        .assert();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert
        .failure()
        .stdout(predicate::str::contains("Failed to remove"));
    assert!(dir.path().join("vendor/guzzlehttp/guzzle/src/A.php").exists());
}

#[test]
fn test_missing_installed_json_fails() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("app")).unwrap();

    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app"])
        .assert()
        .failure();
}

#[test]
fn test_dry_run_conflicts_with_force() {
    vendorsweep()
        .args(["--dry-run", "--force"])
        .assert()
        .failure();
}

#[test]
fn test_verbose_shows_partition() {
    let dir = project();

    vendorsweep()
        .arg(dir.path())
        .args(["--scan-dir", "app", "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Used packages:"))
        .stdout(predicate::str::contains("Kept as dependencies:"))
        .stdout(predicate::str::contains("required through monolog/monolog"));
}
