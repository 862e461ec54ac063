//! Integration tests for the CLI interface
//!
//! Tests the entry point, argument parsing and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sitesync(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sitesync").unwrap();
    cmd.current_dir(dir.path()).env_remove("SITESYNC_CONFIG");
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::write(dir.path().join("sitesync.yml"), yaml).unwrap();
}

const CONFIG: &str = r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /var/www/site
    domain: https://staging.example.com
"#;

#[test]
fn test_cli_help_flag() {
    let dir = TempDir::new().unwrap();
    sitesync(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("db:export"));
}

#[test]
fn test_push_help_lists_target_flags() {
    let dir = TempDir::new().unwrap();
    sitesync(&dir)
        .args(["push", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--mu-plugins"))
        .stdout(predicate::str::contains("--uploads"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    sitesync(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitesync"));
}

#[test]
fn test_invalid_command_exits_one() {
    let dir = TempDir::new().unwrap();
    sitesync(&dir)
        .arg("invalid-command")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_missing_config_exits_one() {
    let dir = TempDir::new().unwrap();
    sitesync(&dir)
        .args(["push", "staging", "themes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_config_from_environment_variable() {
    let dir = TempDir::new().unwrap();
    sitesync(&dir)
        .env("SITESYNC_CONFIG", dir.path().join("elsewhere.yml"))
        .args(["pull", "themes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("elsewhere.yml"));
}

#[test]
fn test_db_export_requires_env() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);
    sitesync(&dir)
        .arg("db:export")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("explicit environment"));
}

#[test]
fn test_unknown_environment_exits_one() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);
    sitesync(&dir)
        .args(["push", "-e", "qa", "themes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown environment 'qa'"));
}

#[test]
fn test_unknown_target_exits_one() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);
    sitesync(&dir)
        .args(["pull", "staging", "widgets"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown sync target 'widgets'"));
}

#[test]
fn test_no_targets_exits_one() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);
    sitesync(&dir)
        .args(["pull", "staging"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("select targets"));
}

#[test]
fn test_remote_without_domain_fails_before_anything_runs() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
environments:
  local:
    domain: http://dev.local
  staging:
    ssh: staging
    root: /var/www/site
"#,
    );
    sitesync(&dir)
        .args(["push", "--dry-run", "-a"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("domain"));
    assert!(!dir.path().join("backups").exists());
}

#[test]
fn test_declined_push_exits_zero() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, CONFIG);
    sitesync(&dir)
        .args(["push", "staging", "--database"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));
    assert!(!dir.path().join("backups").exists());
}
