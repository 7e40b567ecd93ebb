//! End-to-end tests of the `dashvars` binary.

use assert_cmd::Command;
use dashvars::test_utils::SnapshotFixture;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary invocation isolated from the user's configuration and terminal.
fn dashvars(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dashvars").unwrap();
    cmd.current_dir(temp.path())
        .env("DASHVARS_CONFIG_PATH", temp.path().join("no-config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(temp: &TempDir, content: &str) -> std::path::PathBuf {
    let path = temp.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_deps_prints_load_order_and_tree() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("deps")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. region (custom)"))
        .stdout(predicate::str::contains("2. host (query)"))
        .stdout(predicate::str::contains("3. service (query)"))
        .stdout(predicate::str::contains("└── service\n    └── host\n        └── region"));
}

#[test]
fn test_deps_rejects_cycles() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::cyclic().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("deps")
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency detected"));
}

#[test]
fn test_keys_uses_configured_namespace() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("keys")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("host\tdashboard-variable/host/region\n"))
        .stdout(predicate::str::contains("service\tdashboard-variable/service/host\n"));

    let config = write_config(&temp, "cache_namespace = \"team\"\n");
    dashvars(&temp)
        .arg("--config")
        .arg(&config)
        .arg("keys")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("host\tteam/host/region\n"));
}

#[test]
fn test_resolve_applies_defaults() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("resolve")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("region [custom] = eu"))
        .stdout(predicate::str::contains("host [query] = h1,h2 (all)"))
        .stdout(predicate::str::contains("options: h1, h2"))
        .stdout(predicate::str::contains("service [query] = api"));
}

#[test]
fn test_resolve_cascades_selection() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("resolve")
        .arg(&snapshot)
        .args(["--select", "region=us"])
        .assert()
        .success()
        .stdout(predicate::str::contains("host [query] = h3 (all)"))
        .stdout(predicate::str::contains("service [query] = db"));
}

#[test]
fn test_resolve_json_output() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    let output = dashvars(&temp)
        .arg("resolve")
        .arg(&snapshot)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let views: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 3);
    assert_eq!(views[1]["name"], "host");
    assert_eq!(views[1]["all_selected"], true);
    assert_eq!(views[1]["selected_value"], serde_json::json!(["h1", "h2"]));
    assert_eq!(views[2]["is_locked"], false);
}

#[test]
fn test_resolve_rejects_value_outside_options() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("resolve")
        .arg(&snapshot)
        .args(["--select", "region=asia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Value 'asia' is not an option of variable 'region'"));
}

#[test]
fn test_resolve_suggests_similar_variable() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("resolve")
        .arg(&snapshot)
        .args(["--select", "regoin=us"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Variable 'regoin' not found"))
        .stderr(predicate::str::contains("Did you mean: region?"));
}

#[test]
fn test_resolve_textbox_with_short_debounce() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::with_textbox().write_to(temp.path()).unwrap();
    let config = write_config(&temp, "debounce_ms = 5\n");

    dashvars(&temp)
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Please make sure the query is valid and dependent variables are selected",
        ));

    dashvars(&temp)
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .arg(&snapshot)
        .args(["--select", "search=web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("search [textbox] = web"))
        .stdout(predicate::str::contains("results [query] = web-1"));
}

#[test]
fn test_resolve_invalid_format() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();

    dashvars(&temp)
        .arg("resolve")
        .arg(&snapshot)
        .args(["--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format 'yaml'"));
}

#[test]
fn test_missing_snapshot_file() {
    let temp = TempDir::new().unwrap();

    dashvars(&temp)
        .arg("deps")
        .arg("absent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read snapshot"));
}

#[test]
fn test_malformed_config_names_the_config_file() {
    let temp = TempDir::new().unwrap();
    let snapshot = SnapshotFixture::chained().write_to(temp.path()).unwrap();
    let config = write_config(&temp, "debounce_ms = \n");

    dashvars(&temp)
        .arg("--config")
        .arg(&config)
        .arg("keys")
        .arg(&snapshot)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse resolver config from"))
        .stderr(predicate::str::contains("dashboard snapshot").not());
}
