// ABOUTME: Integration tests for the renova CLI commands.
// ABOUTME: Validates --help output, init behavior, and config discovery.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn renova_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("renova"))
}

#[test]
fn help_shows_commands() {
    renova_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("renova.yml");

    renova_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--service", "myapp", "--target", "/var/www/myapp"])
        .assert()
        .success();

    assert!(config_path.exists(), "renova.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("service: myapp"));
    assert!(content.contains("target: /var/www/myapp"));
    assert!(content.contains("preserve:"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("renova.yml");

    fs::write(&config_path, "existing: config").unwrap();

    renova_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_force_overwrites() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("renova.yml"), "existing: config").unwrap();

    renova_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force", "--service", "other"])
        .assert()
        .success();

    let content = fs::read_to_string(temp_dir.path().join("renova.yml")).unwrap();
    assert!(content.contains("service: other"));
}

#[test]
fn status_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    renova_cmd()
        .current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn status_reports_merge_path_for_plain_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let target = temp_dir.path().join("app");
    fs::create_dir_all(&target).unwrap();

    let yaml = format!(
        "service: myapp\ntarget: {}\nrepo: git@example.com:org/app.git\n",
        target.display()
    );
    fs::write(temp_dir.path().join("renova.yml"), yaml).unwrap();

    renova_cmd()
        .current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Service: myapp"))
        .stdout(predicate::str::contains("merge path"));
}

#[test]
fn update_with_missing_target_fails_cleanly() {
    let temp_dir = tempfile::tempdir().unwrap();

    let yaml = format!(
        "service: myapp\ntarget: {}\nrepo: git@example.com:org/app.git\n",
        temp_dir.path().join("gone").display()
    );
    fs::write(temp_dir.path().join("renova.yml"), yaml).unwrap();

    renova_cmd()
        .current_dir(temp_dir.path())
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
