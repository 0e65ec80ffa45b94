// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn compendium() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_compendium"));
    for key in [
        "COMPENDIUM_RUN_DIR",
        "COMPENDIUM_OUTPUT_ROOT",
        "COMPENDIUM_REPORTS_DIR",
        "COMPENDIUM_LOG_LEVEL",
        "COMPENDIUM_LOG_JSON",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, text).expect("write");
}

fn seed(root: &Path) {
    write(
        &root.join("content/monsters.ndjson"),
        "{\"_id\":\"m1\",\"name\":\"Orc\"}\n{\"_id\":\"m1\",\"name\":\"Orc chief\"}\n",
    );
    write(
        &root.join("run/monsters.json/manifest_monsters.json"),
        &json!({"files": [{"file": "content/monsters.ndjson", "items": 2}]}).to_string(),
    );
}

fn path_args(root: &Path) -> Vec<String> {
    vec![
        "--run-dir".to_string(),
        root.join("run").display().to_string(),
        "--output-root".to_string(),
        root.join("out").display().to_string(),
        "--reports-dir".to_string(),
        root.join("reports").display().to_string(),
    ]
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("json payload")
}

#[test]
fn help_lists_every_command() {
    let output = compendium().arg("--help").output().expect("run help");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    for name in ["ingest", "validate", "print-config", "version"] {
        assert!(text.contains(name), "missing {name} in help");
    }
    assert!(text.contains("COMPENDIUM_RUN_DIR"));
}

#[test]
fn version_output_contains_crate_version() {
    let output = compendium()
        .args(["version", "--json"])
        .output()
        .expect("run version");
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output)["version"],
        json!(env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn unknown_argument_is_a_usage_error() {
    let output = compendium()
        .args(["ingest", "--no-such-flag"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_run_dir_fails_ingest_with_pipeline_exit_code() {
    let tmp = tempdir().expect("tmp");
    let output = compendium()
        .arg("ingest")
        .args(path_args(tmp.path()))
        .args(["--json", "--quiet"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(4));
    let err: Value = serde_json::from_slice(&output.stderr).expect("machine error");
    assert_eq!(err["code"], json!("ingest_failed"));
    assert_eq!(
        err["details"]["run_dir"],
        json!(tmp.path().join("run").display().to_string())
    );
}

#[test]
fn ingest_then_validate_round_trip() {
    let tmp = tempdir().expect("tmp");
    seed(tmp.path());

    let output = compendium()
        .current_dir(tmp.path())
        .arg("ingest")
        .args(path_args(tmp.path()))
        .args(["--json", "--quiet"])
        .output()
        .expect("ingest");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let payload = stdout_json(&output);
    assert_eq!(payload["stored_total"], json!(2));
    assert_eq!(payload["ledger_entries"], json!(2));
    assert_eq!(payload["packs"][0]["category"], json!("Actor"));

    let db = tmp.path().join("out/monsters.json/monsters.json.db");
    let conn = Connection::open(&db).expect("open db");
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM data WHERE type = 'Actor'", [], |r| r.get(0))
        .expect("count");
    assert_eq!(rows, 2);
    drop(conn);

    let output = compendium()
        .arg("validate")
        .args(path_args(tmp.path()))
        .args(["--json", "--quiet", "--fail-on-mismatch"])
        .output()
        .expect("validate");
    assert!(output.status.success());
    let payload = stdout_json(&output);
    assert_eq!(payload["status"], json!("ok"));
    assert_eq!(payload["summary"]["by_status"]["consistent"], json!(1));
    assert!(tmp.path().join("reports/compendium_validation.json").is_file());
    assert!(tmp.path().join("reports/duplicates_preserved_map.json").is_file());
}

#[test]
fn validate_fail_on_mismatch_exits_with_validation_code() {
    let tmp = tempdir().expect("tmp");
    seed(tmp.path());
    write(
        &tmp.path().join("run/spells.json/manifest_spells.json"),
        &json!({"files": [{"file": "content/spells.json", "items": 4}]}).to_string(),
    );
    let output = compendium()
        .arg("validate")
        .args(path_args(tmp.path()))
        .args(["--json", "--quiet", "--fail-on-mismatch"])
        .output()
        .expect("validate");
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout_json(&output)["status"], json!("mismatch"));
    let err: Value = serde_json::from_slice(&output.stderr).expect("machine error");
    assert_eq!(err["code"], json!("store_mismatch"));
}

#[test]
fn print_config_reflects_environment_overrides() {
    let tmp = tempdir().expect("tmp");
    let run_dir = tmp.path().join("from-env");
    let output = compendium()
        .env("COMPENDIUM_RUN_DIR", &run_dir)
        .args(["print-config", "--json"])
        .output()
        .expect("print-config");
    assert!(output.status.success());
    let payload = stdout_json(&output);
    assert_eq!(payload["run_dir"], json!(run_dir.display().to_string()));
    assert_eq!(payload["output_root"], json!("jsons/foundry_compendiums"));
    assert_eq!(payload["sample_size"], json!(100));
}
