//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Build command for the schemedit-cli binary (finds it in target/debug when run via cargo test).
fn schemedit_cli() -> Command {
    cargo_bin_cmd!("schemedit-cli")
}

/// Path to schemedit library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("schemedit")
        .join("tests")
        .join("fixtures")
}

fn fixture() -> PathBuf {
    fixtures_dir().join("three_modules.json")
}

#[test]
fn test_cli_help() {
    let mut cmd = schemedit_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("merge"));
}

#[test]
fn test_cli_version() {
    let mut cmd = schemedit_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_stats_human() {
    let mut cmd = schemedit_cli();

    cmd.arg("stats").arg(fixture());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Modules:             3"))
        .stdout(predicate::str::contains("Inter-module traces: 2"));
}

#[test]
fn test_cli_stats_json() {
    let mut cmd = schemedit_cli();

    cmd.arg("stats").arg(fixture()).arg("--format").arg("json");
    let output = cmd.assert().success().get_output().stdout.clone();
    let stats: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(stats["module_count"], 3);
    assert_eq!(stats["part_count"], 4);
    assert_eq!(stats["pad_count"], 4);
}

#[test]
fn test_cli_locate_module() {
    let mut cmd = schemedit_cli();

    cmd.args(["locate", "--layer", "top", "--x", "105", "--y", "100"])
        .arg(fixture());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Module M1"));
}

#[test]
fn test_cli_locate_pin() {
    let mut cmd = schemedit_cli();

    cmd.args(["locate", "--layer", "top", "--module", "M1", "--x", "97.5", "--y", "100"])
        .args(["--format", "json"])
        .arg(fixture());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"component\": \"U1\""))
        .stdout(predicate::str::contains("\"pin\": 2"));
}

#[test]
fn test_cli_locate_nothing() {
    let mut cmd = schemedit_cli();

    cmd.args(["locate", "--layer", "top", "--x", "0", "--y", "0"])
        .arg(fixture());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Nothing at"));
}

#[test]
fn test_cli_merge_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("merged.json");
    let mut cmd = schemedit_cli();

    cmd.args(["merge", "--layer", "top", "--module", "M1", "--module", "M2"])
        .arg(fixture())
        .arg("--output")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Merged M1, M2 into MODULE-U1-R1-C1"));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let modules = written["layers"]["top"]["modules"].as_object().unwrap();
    assert!(modules.contains_key("MODULE-U1-R1-C1"));
    assert!(!modules.contains_key("M1"));
}

#[test]
fn test_cli_rotate_to_stdout() {
    let mut cmd = schemedit_cli();

    cmd.args(["rotate", "--layer", "top", "--module", "M3"])
        .arg(fixture());
    let output = cmd.assert().success().get_output().stdout.clone();
    let circuit: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(circuit["layers"]["top"]["modules"]["M3"]["angle"], 90);
}

#[test]
fn test_cli_move_module_negative_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("moved.json");
    let mut cmd = schemedit_cli();

    cmd.args(["move-module", "--layer", "top", "--module", "M3", "--x", "-40", "--y", "12.5"])
        .arg(fixture())
        .arg("-o")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Moved M3 to (-40, 12.5)"));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["layers"]["top"]["modules"]["M3"]["pos"]["x"], -40.0);
}

#[test]
fn test_cli_merge_unknown_module_fails() {
    let mut cmd = schemedit_cli();

    cmd.args(["merge", "--layer", "top", "--module", "M1", "--module", "M9"])
        .arg(fixture());
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown module M9"));
}

#[test]
fn test_cli_missing_file() {
    let mut cmd = schemedit_cli();

    cmd.arg("stats").arg("nonexistent.json");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read circuit"));
}

#[test]
fn test_cli_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{ not json").unwrap();
    let mut cmd = schemedit_cli();

    cmd.arg("stats")
        .arg(fixture())
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}
