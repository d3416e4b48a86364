//! Binary-level tests for the `ingot` CLI.
//!
//! Everything here runs offline: the scenarios either fail before the
//! registry is consulted or use fully pinned specifiers.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

use ingot::constants::MANIFEST_FILE;

fn ingot() -> Command {
    Command::cargo_bin("ingot").expect("binary builds")
}

#[test]
fn init_creates_a_starter_manifest() {
    let dir = tempfile::tempdir().unwrap();

    ingot()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    let manifest = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    assert!(manifest.contains("[dependencies]"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), "[dependencies]\n").unwrap();

    ingot()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn invalid_specifier_fails_fast_and_names_it() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), "[dependencies]\n").unwrap();

    ingot()
        .current_dir(dir.path())
        .args(["install", "Bad-Name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid package specifier `Bad-Name`"));

    // Nothing was written.
    let manifest = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    assert_eq!(manifest, "[dependencies]\n");
}

#[test]
fn self_install_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), "[dependencies]\n").unwrap();

    ingot()
        .current_dir(dir.path())
        .args(["install", "ingot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot install `ingot` with itself"));
}

#[test]
fn only_filter_blocks_a_mismatched_environment() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), "[dependencies]\n").unwrap();

    ingot()
        .current_dir(dir.path())
        .env("INGOT_ENV", "dev")
        .args(["install", "foo@1.2.3", "--only", "test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("re-run the command in one of: test"));

    // Zero manifest mutations.
    let manifest = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    assert_eq!(manifest, "[dependencies]\n");
}

#[test]
fn pinned_install_without_installer_reports_informationally() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), "[dependencies]\n").unwrap();

    ingot()
        .current_dir(dir.path())
        .args(["install", "foo@1.2.3", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The package `foo` had no associated installer task.",
        ));

    let manifest = fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    assert!(manifest.contains(r#"foo = "=1.2.3""#));
}

#[test]
fn missing_manifest_suggests_init() {
    let dir = tempfile::tempdir().unwrap();

    ingot()
        .current_dir(dir.path())
        .args(["install", "foo@1.2.3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ingot init"));
}

#[test]
fn tasks_lists_discovered_installer_scripts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), "[dependencies]\n").unwrap();
    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    fs::write(tasks.join("ash.install"), "#!/bin/sh\n").unwrap();

    ingot()
        .current_dir(dir.path())
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("ash.install"));
}

#[test]
fn tasks_reports_an_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(MANIFEST_FILE), "[dependencies]\n").unwrap();

    ingot()
        .current_dir(dir.path())
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("No installer tasks discovered."));
}
