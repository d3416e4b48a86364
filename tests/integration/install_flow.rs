//! End-to-end install pipeline tests over a temporary project.
//!
//! These tests wire the production collaborators (manifest fetcher, console
//! executor, discovered task table) against a tempdir project and a mocked
//! registry, and assert on the final report, the manifest contents, and the
//! side effects of the installer scripts.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use ingot::constants::MANIFEST_FILE;
use ingot::core::IngotError;
use ingot::installer::{ConsoleExecutor, InstallRequest, Orchestrator};
use ingot::project::{Manifest, ManifestFetcher, WorkingContext};
use ingot::registry::RegistryClient;
use ingot::requirement::{InstallInput, normalize};
use ingot::task::{Environment, discover_tasks};
use tempfile::TempDir;

/// Create a project with a manifest and one installer script for `ash`.
///
/// The script records its execution by touching `ran_ash` in the project
/// root, so tests can tell apply from preview.
fn project_with_ash_installer() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(MANIFEST_FILE),
        "[package]\nname = \"demo\"\n\n[dependencies]\n",
    )
    .unwrap();

    let tasks = dir.path().join("tasks");
    fs::create_dir(&tasks).unwrap();
    let script = tasks.join("ash.install");
    fs::write(&script, "#!/bin/sh\ntouch ran_ash\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    dir
}

fn working_context(root: &Path) -> WorkingContext {
    WorkingContext::new(Manifest::load(&root.join(MANIFEST_FILE)).unwrap())
}

async fn mock_registry_for_ash() -> (mockito::ServerGuard, RegistryClient) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/packages/ash")
        .with_status(200)
        .with_body(r#"{"releases": [{"version": "2.3.4"}, {"version": "2.3.3"}]}"#)
        .create_async()
        .await;
    let client = RegistryClient::with_base_url(server.url()).unwrap();
    (server, client)
}

#[tokio::test]
async fn full_flow_runs_installer_and_reports_the_rest() {
    let project = project_with_ash_installer();
    let (_server, registry) = mock_registry_for_ash().await;

    // `ash` is bare (resolved from the registry), `plain` is pinned and has
    // no installer script.
    let descriptors = normalize(
        InstallInput::List(vec!["ash".to_string(), "plain@1.0.0".to_string()]),
        &registry,
    )
    .await
    .unwrap();

    let table = discover_tasks(project.path()).unwrap();
    let fetcher = ManifestFetcher::new();
    let executor = ConsoleExecutor::new();
    let orchestrator = Orchestrator::new(&fetcher, &table, &executor);

    let request = InstallRequest {
        yes: true,
        ..Default::default()
    };
    let report = orchestrator
        .install(
            &descriptors,
            &request,
            &Environment::Dev,
            working_context(project.path()),
        )
        .unwrap();

    assert_eq!(report.available, vec!["ash.install"]);
    assert_eq!(report.unavailable, vec!["plain"]);

    // The installer actually ran from the project root.
    assert!(project.path().join("ran_ash").is_file());

    // Both dependencies were committed to the manifest, the bare name with
    // its loosened registry constraint.
    let manifest = fs::read_to_string(project.path().join(MANIFEST_FILE)).unwrap();
    assert!(manifest.contains(r#"ash = "^2.3""#));
    assert!(manifest.contains(r#"plain = "=1.0.0""#));
}

#[tokio::test]
async fn dry_run_commits_dependencies_but_skips_installers() {
    let project = project_with_ash_installer();
    let (_server, registry) = mock_registry_for_ash().await;

    let descriptors = normalize(InstallInput::List(vec!["ash".to_string()]), &registry)
        .await
        .unwrap();

    let table = discover_tasks(project.path()).unwrap();
    let fetcher = ManifestFetcher::new();
    let executor = ConsoleExecutor::new();
    let orchestrator = Orchestrator::new(&fetcher, &table, &executor);

    let request = InstallRequest {
        dry_run: true,
        yes: true,
        ..Default::default()
    };
    let report = orchestrator
        .install(
            &descriptors,
            &request,
            &Environment::Dev,
            working_context(project.path()),
        )
        .unwrap();

    assert_eq!(report.available, vec!["ash.install"]);
    // Preview only: the script did not run.
    assert!(!project.path().join("ran_ash").exists());
    // The dependency addition and fetch still happened.
    let manifest = fs::read_to_string(project.path().join(MANIFEST_FILE)).unwrap();
    assert!(manifest.contains(r#"ash = "^2.3""#));
}

#[tokio::test]
async fn self_install_fails_before_any_mutation() {
    let project = project_with_ash_installer();
    let before = fs::read_to_string(project.path().join(MANIFEST_FILE)).unwrap();

    // The registry would reject any lookup; none must happen.
    let registry = RegistryClient::with_base_url("http://127.0.0.1:1").unwrap();
    let err = normalize(
        InstallInput::CommaDelimited("ingot".to_string()),
        &registry,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, IngotError::SelfInstallRejected));
    let after = fs::read_to_string(project.path().join(MANIFEST_FILE)).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn environment_mismatch_fails_before_any_mutation() {
    let project = project_with_ash_installer();
    let before = fs::read_to_string(project.path().join(MANIFEST_FILE)).unwrap();

    let registry = RegistryClient::with_base_url("http://127.0.0.1:1").unwrap();
    let descriptors = normalize(
        InstallInput::List(vec!["plain@1.0.0".to_string()]),
        &registry,
    )
    .await
    .unwrap();

    let table = discover_tasks(project.path()).unwrap();
    let fetcher = ManifestFetcher::new();
    let executor = ConsoleExecutor::new();
    let orchestrator = Orchestrator::new(&fetcher, &table, &executor);

    let request = InstallRequest {
        only: Some(vec![Environment::Test]),
        yes: true,
        ..Default::default()
    };
    let err = orchestrator
        .install(
            &descriptors,
            &request,
            &Environment::Dev,
            working_context(project.path()),
        )
        .unwrap_err();

    assert!(matches!(err, IngotError::EnvironmentMismatch { .. }));
    let after = fs::read_to_string(project.path().join(MANIFEST_FILE)).unwrap();
    assert_eq!(before, after);
    assert!(!project.path().join("ran_ash").exists());
}

#[tokio::test]
async fn failing_fetch_command_leaves_manifest_mutated_and_skips_installers() {
    let project = project_with_ash_installer();
    fs::write(
        project.path().join(MANIFEST_FILE),
        "[dependencies]\n\n[tool]\nfetch-command = [\"false\"]\n",
    )
    .unwrap();

    let registry = RegistryClient::with_base_url("http://127.0.0.1:1").unwrap();
    let descriptors = normalize(
        InstallInput::List(vec!["ash@2.0.0".to_string()]),
        &registry,
    )
    .await
    .unwrap();

    let table = discover_tasks(project.path()).unwrap();
    let fetcher = ManifestFetcher::new();
    let executor = ConsoleExecutor::new();
    let orchestrator = Orchestrator::new(&fetcher, &table, &executor);

    let request = InstallRequest {
        yes: true,
        ..Default::default()
    };
    let err = orchestrator
        .install(
            &descriptors,
            &request,
            &Environment::Dev,
            working_context(project.path()),
        )
        .unwrap_err();

    assert!(matches!(err, IngotError::DependencyFetchFailed { .. }));
    // Known limitation: the manifest keeps the addition.
    let manifest = fs::read_to_string(project.path().join(MANIFEST_FILE)).unwrap();
    assert!(manifest.contains(r#"ash = "=2.0.0""#));
    // No installer ran after the failed fetch.
    assert!(!project.path().join("ran_ash").exists());
}

#[tokio::test]
async fn installer_args_are_forwarded_to_the_script() {
    let project = project_with_ash_installer();
    // Replace the installer with one that records its argv.
    let script = project.path().join("tasks/ash.install");
    fs::write(&script, "#!/bin/sh\necho \"$@\" > argv_seen\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let (_server, registry) = mock_registry_for_ash().await;
    let descriptors = normalize(InstallInput::List(vec!["ash".to_string()]), &registry)
        .await
        .unwrap();

    let table = discover_tasks(project.path()).unwrap();
    let fetcher = ManifestFetcher::new();
    let executor = ConsoleExecutor::new();
    let orchestrator = Orchestrator::new(&fetcher, &table, &executor);

    let request = InstallRequest {
        yes: true,
        argv: vec!["--example".to_string(), "extra".to_string()],
        ..Default::default()
    };
    orchestrator
        .install(
            &descriptors,
            &request,
            &Environment::Dev,
            working_context(project.path()),
        )
        .unwrap();

    let argv_seen = fs::read_to_string(project.path().join("argv_seen")).unwrap();
    assert_eq!(argv_seen.trim(), "--example extra");
}
