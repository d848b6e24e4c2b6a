//! End-to-end tests for the dgate binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn dgate(filter: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dgate").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("DGATE_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--file")
        .arg(filter);
    cmd
}

#[test]
fn test_add_then_check() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");

    dgate(&filter)
        .args(["add", "svc1", "--type", "file"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added svc1"));

    dgate(&filter)
        .args(["check", "svc1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked"));

    dgate(&filter)
        .args(["check", "svc2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allowed"));
}

#[test]
fn test_filter_prints_allowed_in_order() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");

    dgate(&filter).args(["add", "svc1", "-t", "tag"]).assert().success();

    dgate(&filter)
        .args(["filter", "svc3", "svc1", "svc2", "svc3"])
        .assert()
        .success()
        .stdout("svc3\nsvc2\n");
}

#[test]
fn test_remove_allows_again() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");

    dgate(&filter).args(["add", "svc1"]).assert().success();
    dgate(&filter).args(["remove", "svc1"]).assert().success();

    dgate(&filter)
        .args(["filter", "svc1"])
        .assert()
        .success()
        .stdout("svc1\n");
}

#[test]
fn test_clean_with_registry() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");
    let registry = dir.path().join("services.toml");

    std::fs::write(
        &registry,
        "[[service]]\nkey = \"alive\"\ntype = 2\n",
    )
    .unwrap();

    dgate(&filter).args(["add", "alive"]).assert().success();
    dgate(&filter).args(["add", "gone", "-t", "tag"]).assert().success();

    dgate(&filter)
        .arg("clean")
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 rules"));

    dgate(&filter)
        .args(["filter", "alive", "gone"])
        .assert()
        .success()
        .stdout("gone\n");
}

#[test]
fn test_clean_without_registry_fails() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");

    dgate(&filter).arg("clean").assert().failure();
}

#[test]
fn test_diff_summary() {
    let dir = tempdir().unwrap();
    let old = dir.path().join("old.json");
    let new = dir.path().join("new.json");

    dgate(&old).args(["add", "a"]).assert().success();
    dgate(&new).args(["add", "b"]).assert().success();
    dgate(&new).args(["add", "c"]).assert().success();

    dgate(&new)
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 rules"))
        .stdout(predicate::str::contains("Deleted 1 rules"));
}

#[test]
fn test_corrupt_filter_refuses_edit_but_queries_default() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");
    std::fs::write(&filter, "{ corrupt").unwrap();

    dgate(&filter).args(["add", "svc1"]).assert().failure();
    assert_eq!(std::fs::read_to_string(&filter).unwrap(), "{ corrupt");

    dgate(&filter)
        .args(["filter", "svc1"])
        .assert()
        .success()
        .stdout("svc1\n");
}

#[test]
fn test_config_validate() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");
    let good = dir.path().join("good.toml");
    let bad = dir.path().join("bad.toml");

    std::fs::write(&good, "[filter]\ntoo_many_rules_threshold = 20\n").unwrap();
    std::fs::write(&bad, "[filter]\ntoo_many_rules_threshold = 0\n").unwrap();

    dgate(&filter)
        .args(["config", "validate"])
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("20"));

    dgate(&filter)
        .args(["config", "validate"])
        .arg(&bad)
        .assert()
        .failure();
}

#[test]
fn test_threshold_warning() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");
    let config = dir.path().join("dgate.toml");
    std::fs::write(&config, "[filter]\ntoo_many_rules_threshold = 1\n").unwrap();

    dgate(&filter).arg("--config").arg(&config).args(["add", "a"]).assert().success();

    dgate(&filter)
        .arg("--config")
        .arg(&config)
        .args(["add", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("suggested maximum 1"));
}

#[test]
fn test_clean_reports_type_only_changes() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");
    let registry = dir.path().join("services.toml");
    std::fs::write(&registry, "[[service]]\nkey = \"svc\"\ntype = 5\n").unwrap();

    dgate(&filter).args(["add", "svc", "-t", "file"]).assert().success();

    dgate(&filter)
        .arg("clean")
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("svc (type 2 -> 5)"))
        .stdout(predicate::str::contains("Retyped 1 rules"))
        .stdout(predicate::str::contains("still valid").not());

    dgate(&filter)
        .arg("clean")
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("All 1 rules are still valid"));
}

#[test]
fn test_compact_log_format_writes_log_file() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");
    let registry = dir.path().join("services.toml");
    let log = dir.path().join("dgate.log");
    std::fs::write(&registry, "[[service]]\nkey = \"svc\"\ntype = 2\n").unwrap();

    dgate(&filter).args(["add", "svc"]).assert().success();

    dgate(&filter)
        .args(["--log-format", "compact", "--log-file"])
        .arg(&log)
        .arg("clean")
        .arg("--registry")
        .arg(&registry)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Cleaned filter saved"), "log file was: {contents:?}");
}

#[test]
fn test_elvish_completions() {
    let dir = tempdir().unwrap();
    let filter = dir.path().join("rules.json");

    dgate(&filter)
        .args(["completions", "elvish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dgate"));
}
