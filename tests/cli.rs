// ABOUTME: Integration tests for the cutover CLI commands.
// ABOUTME: Validates --help, init, task listing and a local deploy round trip.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn cutover_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("cutover"))
}

/// A project with an app tree and a cutover.yml deploying it to a local directory.
fn local_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("app")).unwrap();
    fs::write(root.join("app/index.html"), "hello").unwrap();
    fs::write(root.join("app/debug.log"), "noise").unwrap();

    fs::write(
        root.join("cutover.yml"),
        format!(
            r#"
deployer:
  from: {root}/app
  to: {root}/remote
  exclude: ["*.log"]
  staging_dir: {root}/staging
  hook_dir: {root}
servers:
  - host: localhost
    transport: local
destinations:
  production:
    servers:
      - host: prod
        transport: local
"#,
            root = root.display()
        ),
    )
    .unwrap();

    dir
}

fn releases(root: &Path) -> Vec<String> {
    let mut entries: Vec<String> = fs::read_dir(root.join("remote/releases"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    entries
}

#[test]
fn help_shows_commands() {
    cutover_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("rollback"))
        .stdout(predicate::str::contains("releases"))
        .stdout(predicate::str::contains("tasks"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("cutover.yml");

    cutover_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--host", "deploy@web1.example.com"])
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("deploy@web1.example.com"));
    assert!(content.contains("deployer:"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("cutover.yml");
    fs::write(&config_path, "existing: config").unwrap();

    cutover_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cutover_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
    assert!(fs::read_to_string(&config_path).unwrap().contains("servers:"));
}

#[test]
fn missing_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    cutover_cmd()
        .current_dir(temp_dir.path())
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn tasks_lists_every_group() {
    let project = local_project();

    cutover_cmd()
        .current_dir(project.path())
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("deployer:deploy\n"))
        .stdout(predicate::str::contains("deployer:rollback"))
        .stdout(predicate::str::contains("production:deployer:deploy"))
        .stdout(predicate::str::contains("production:deployer:rollback"));
}

#[test]
fn explicit_config_path() {
    let project = local_project();
    let elsewhere = tempfile::tempdir().unwrap();

    cutover_cmd()
        .current_dir(elsewhere.path())
        .arg("--config")
        .arg(project.path().join("cutover.yml"))
        .arg("tasks")
        .assert()
        .success()
        .stdout(predicate::str::contains("deployer:deploy"));
}

#[test]
fn local_deploy_list_and_rollback() {
    let project = local_project();
    let root = project.path();

    cutover_cmd()
        .current_dir(root)
        .arg("deploy")
        .assert()
        .success()
        .stdout(predicate::str::contains("is live"));

    let deployed = releases(root);
    assert_eq!(deployed.len(), 1);
    assert!(root.join("remote/current/index.html").exists());
    assert!(!root.join("remote/current/debug.log").exists());

    cutover_cmd()
        .current_dir(root)
        .args(["releases", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"releases""#))
        .stdout(predicate::str::contains(deployed[0].as_str()));

    cutover_cmd()
        .current_dir(root)
        .arg("rollback")
        .assert()
        .success()
        .stdout(predicate::str::contains("no release to roll back to"));

    assert_eq!(releases(root), deployed);
}

#[test]
fn run_task_by_name() {
    let project = local_project();

    cutover_cmd()
        .current_dir(project.path())
        .args(["--quiet", "run", "deployer:rollback"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deployer:rollback complete"));
}

#[test]
fn run_unknown_task_fails() {
    let project = local_project();

    cutover_cmd()
        .current_dir(project.path())
        .args(["run", "staging:deployer:deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown task: staging:deployer:deploy"));
}

#[test]
fn unknown_destination_fails() {
    let project = local_project();

    cutover_cmd()
        .current_dir(project.path())
        .args(["deploy", "-d", "qa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown destination: qa"));
}
