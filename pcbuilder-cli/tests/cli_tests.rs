//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build command for the pcbuilder-cli binary, rooted in a scratch directory
/// so no stray settings file is picked up.
fn pcbuilder_cli(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("pcbuilder-cli");
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("cli.db")
}

/// Fresh database with the sample catalog loaded.
fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(db_path(&dir))
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 8 sample components"));
    dir
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    pcbuilder_cli(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compatibility"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    pcbuilder_cli(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_rules() {
    let dir = TempDir::new().unwrap();
    pcbuilder_cli(dir.path())
        .arg("rules")
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("socket"))
        .stdout(predicate::str::contains("form_factor"))
        .stdout(predicate::str::contains("power"));
}

#[test]
fn test_cli_seed_is_idempotent() {
    let dir = seeded();
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(db_path(&dir))
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("already has components"));
}

#[test]
fn test_cli_components_list() {
    let dir = seeded();
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(db_path(&dir))
        .args(["components", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AMD Ryzen 7 7700X"))
        .stdout(predicate::str::contains("8 component(s)"));
}

#[test]
fn test_cli_components_search_json() {
    let dir = seeded();
    let value = json_output(
        pcbuilder_cli(dir.path())
            .arg("--db")
            .arg(db_path(&dir))
            .args(["--format", "json", "components", "search", "DDR5"]),
    );
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Kingston Fury 32GB DDR5"));
    assert!(!names.contains(&"Corsair RM750"));
}

#[test]
fn test_cli_add_and_remove_component() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir);

    let added = json_output(pcbuilder_cli(dir.path()).arg("--db").arg(&db).args([
        "--format",
        "json",
        "components",
        "add",
        "--name",
        "Seasonic Focus 650",
        "--type",
        "Power Supply",
        "--price",
        "95.5",
        "--power",
        "650",
    ]));
    assert_eq!(added["kind"], "Power Supply");
    assert_eq!(added["power_watts"], 650);
    let id = added["id"].as_i64().unwrap();

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["components", "remove", id.to_string().as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed component"));
}

#[test]
fn test_cli_add_rejects_negative_price() {
    let dir = TempDir::new().unwrap();
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(db_path(&dir))
        .args([
            "components", "add", "--name", "Broken", "--type", "Memory", "--price=-5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_update_missing_component() {
    let dir = TempDir::new().unwrap();
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(db_path(&dir))
        .args(["components", "update", "42", "--price", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("42"));
}

#[test]
fn test_cli_create_and_check_compatible_configuration() {
    let dir = seeded();
    let db = db_path(&dir);

    let created = json_output(pcbuilder_cli(dir.path()).arg("--db").arg(&db).args([
        "--format", "json", "configs", "create", "AM5 build", "2", "3", "5", "6", "7", "8", "99",
    ]));
    assert_eq!(created["status"], "UNCHECKED");
    assert_eq!(created["total_price"], 146000.0);
    assert_eq!(created["skipped_ids"], serde_json::json!([99]));
    let id = created["id"].as_i64().unwrap().to_string();

    let report = json_output(pcbuilder_cli(dir.path()).arg("--db").arg(&db).args([
        "--format",
        "json",
        "configs",
        "check",
        id.as_str(),
        "--fail-on",
        "warning",
    ]));
    assert_eq!(report["status"], "COMPATIBLE");
    assert_eq!(report["issues"].as_array().unwrap().len(), 0);

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["configs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AM5 build"))
        .stdout(predicate::str::contains("COMPATIBLE"));
}

#[test]
fn test_cli_check_socket_mismatch_fails_on_error() {
    let dir = seeded();
    let db = db_path(&dir);

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["configs", "create", "Mismatch", "1", "3", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration 1"));

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["configs", "check", "1", "--fail-on", "error"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SOCKET_MISMATCH"))
        .stdout(predicate::str::contains("INCOMPATIBLE"));

    // Without --fail-on the report is informational only.
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["configs", "check", "1"])
        .assert()
        .success();
}

#[test]
fn test_cli_check_missing_configuration() {
    let dir = TempDir::new().unwrap();
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(db_path(&dir))
        .args(["configs", "check", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_component_in_use_cannot_be_removed() {
    let dir = seeded();
    let db = db_path(&dir);

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["configs", "create", "Holds CPU", "2"])
        .assert()
        .success();

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["components", "remove", "2"])
        .assert()
        .failure();

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["configs", "remove", "1"])
        .assert()
        .success();

    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(&db)
        .args(["components", "remove", "2"])
        .assert()
        .success();
}

#[test]
fn test_cli_inventory_threshold() {
    let dir = seeded();
    pcbuilder_cli(dir.path())
        .arg("--db")
        .arg(db_path(&dir))
        .args(["inventory", "--threshold", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MSI MAG B760M Mortar"))
        .stdout(predicate::str::contains("NVIDIA GeForce RTX 4070"))
        .stdout(predicate::str::contains("Total"));
}

#[test]
fn test_cli_reads_settings_file() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("pcbuilder.json");
    std::fs::write(
        &settings,
        r#"{ "database_path": "from_settings.db", "seed_sample_data": true }"#,
    )
    .unwrap();

    pcbuilder_cli(dir.path())
        .args(["components", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 component(s)"));
    assert!(dir.path().join("from_settings.db").exists());
}

#[test]
fn test_cli_invalid_settings_file() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("broken.json");
    std::fs::write(&settings, "{ not json").unwrap();

    pcbuilder_cli(dir.path())
        .arg("--config")
        .arg(&settings)
        .arg("rules")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
