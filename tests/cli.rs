//! Integration tests for the sv-scatter CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Project directory with a config file pointing at local sources
fn project(converter: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("sv_sources")).unwrap();
    fs::write(temp.path().join("sv_sources/alu.sv"), "module alu; endmodule\n").unwrap();
    fs::write(temp.path().join("sv_sources/alu_pkg.sv"), "package alu_pkg; endpackage\n").unwrap();
    fs::write(
        temp.path().join("sv-scatter.toml"),
        format!(
            r#"
[paths]
source_dir = "sv_sources"
output_dir = "scattered"
toplevel = "top.sv"

[converter]
program = "{converter}"
aux_inputs = []
include_dirs = []

[special_case]
input = "clk.v"
output = "scattered/clk.v"
"#
        ),
    )
    .unwrap();
    temp
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sv2v"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sv-scatter"));
}

#[test]
fn test_invalid_subcommand() {
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.arg("scatter-everything")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_dry_run_lists_commands() {
    let temp = project("sv2v");
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .args(["run", "--dry-run", "-j", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sv_sources/alu.sv"))
        .stdout(predicate::str::contains("scattered/top.v"))
        .stdout(predicate::str::contains("2 worker(s)"));

    // nothing was written
    assert!(!temp.path().join("scattered").exists());
}

#[test]
fn test_dry_run_json() {
    let temp = project("sv2v");
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    let assert = cmd
        .current_dir(temp.path())
        .args(["run", "--dry-run", "--format", "json", "-j", "8"])
        .assert()
        .success();

    let plan: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    // capped at the number of bulk tasks
    assert_eq!(plan["workers"], 2);
    assert_eq!(plan["bulk"].as_array().unwrap().len(), 2);
    assert_eq!(plan["special_case"]["kind"], "special_case");
}

#[test]
fn test_directory_flag() {
    let temp = project("sv2v");
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.arg("-C")
        .arg(temp.path())
        .args(["run", "--dry-run", "--skip-special"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Special case disabled"));
}

#[test]
fn test_missing_converter_fails() {
    let temp = project("sv-scatter-no-such-converter");
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found on PATH"));
}

#[cfg(unix)]
#[test]
fn test_failed_conversion_exit_code() {
    use std::os::unix::fs::PermissionsExt;

    let temp = project("./broken-sv2v");
    let script = temp.path().join("broken-sv2v");
    fs::write(&script, "#!/bin/sh\necho 'unsupported construct' >&2\nexit 2\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported construct"))
        .stderr(predicate::str::contains("3/3 conversions failed"));
}

#[test]
fn test_config_show() {
    let temp = project("sv2v");
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source_dir = \"sv_sources\""))
        .stdout(predicate::str::contains("thread_percentage = 50"));
}

#[test]
fn test_config_env_override() {
    let temp = project("sv2v");
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .env("SV_SCATTER_PARALLEL__MAX_THREADS", "3")
        .args(["config", "show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_threads\": 3"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let temp = project("sv2v");
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
    assert!(fs::read_to_string(temp.path().join("sv-scatter.toml")).unwrap().contains("sv2v"));
}

#[test]
fn test_missing_custom_config() {
    let temp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("sv-scatter").unwrap();
    cmd.current_dir(temp.path())
        .args(["--config", "nope.toml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
