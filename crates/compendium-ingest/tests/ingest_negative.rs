// SPDX-License-Identifier: Apache-2.0

use compendium_ingest::{ingest_run, IngestOptions};
use compendium_store::{discover_stores, store_db_path};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, bytes).expect("write");
}

fn options(root: &Path) -> IngestOptions {
    IngestOptions {
        run_dir: root.join("run"),
        output_root: root.join("out"),
        reports_dir: root.join("reports"),
        base_dir: Some(root.to_path_buf()),
        ..IngestOptions::default()
    }
}

fn manifest(root: &Path, source: &str, body: serde_json::Value) {
    write(
        &root.join("run").join(source).join("manifest_items.json"),
        body.to_string().as_bytes(),
    );
}

#[test]
fn missing_file_is_skipped_and_the_rest_of_the_source_survives() {
    let tmp = tempdir().expect("tmp");
    write(&tmp.path().join("c/ok.json"), br#"[{"_id":"a"},{"_id":"b"}]"#);
    manifest(
        tmp.path(),
        "items.json",
        json!({"files": [
            {"file": "c/absent.json", "items": 4},
            {"file": "c/ok.json", "items": 2}
        ]}),
    );
    let result = ingest_run(&options(tmp.path())).expect("ingest");
    assert_eq!(result.skipped.files_missing, 1);
    assert_eq!(result.packs.len(), 1);
    assert_eq!(result.packs[0].inserted, 2);
}

#[test]
fn count_mismatch_is_recorded_not_fatal() {
    let tmp = tempdir().expect("tmp");
    write(&tmp.path().join("c/ok.json"), br#"[{"_id":"a"}]"#);
    manifest(
        tmp.path(),
        "items.json",
        json!({"files": [{"file": "c/ok.json", "items": 10}]}),
    );
    let result = ingest_run(&options(tmp.path())).expect("ingest");
    assert_eq!(result.skipped.count_mismatches, 1);
    assert_eq!(result.stored_total(), 1);
    assert!(result
        .events
        .iter()
        .any(|e| e.name == "ingest.file.count_mismatch" && e.fields["found"] == "1"));
}

#[test]
fn unparsable_and_empty_files_leave_no_store() {
    let tmp = tempdir().expect("tmp");
    write(&tmp.path().join("c/garbage.json"), b"definitely not json");
    write(&tmp.path().join("c/blank.json"), b"   \n");
    manifest(
        tmp.path(),
        "broken.json",
        json!({"files": [
            {"file": "c/garbage.json", "items": 1},
            {"file": "c/blank.json", "items": 0}
        ]}),
    );
    let opts = options(tmp.path());
    let result = ingest_run(&opts).expect("ingest");
    assert!(result.packs.is_empty());
    assert_eq!(result.skipped.files_unparsable, 1);
    assert_eq!(result.skipped.sources_empty, 1);
    assert!(!store_db_path(&opts.output_root, "broken.json").exists());
    assert!(discover_stores(&opts.output_root).expect("discover").is_empty());
}

#[test]
fn source_without_objects_removes_a_stale_store() {
    let tmp = tempdir().expect("tmp");
    let opts = options(tmp.path());
    write(&tmp.path().join("c/items.json"), br#"[{"_id":"a"}]"#);
    manifest(
        tmp.path(),
        "items.json",
        json!({"files": [{"file": "c/items.json", "items": 1}]}),
    );
    ingest_run(&opts).expect("first run");
    assert!(store_db_path(&opts.output_root, "items.json").exists());

    write(&tmp.path().join("c/items.json"), b"[1, \"two\", null]");
    let result = ingest_run(&opts).expect("second run");
    assert_eq!(result.skipped.records_skipped, 3);
    assert_eq!(result.skipped.sources_empty, 1);
    assert!(!store_db_path(&opts.output_root, "items.json").exists());
}

#[test]
fn malformed_manifest_fails_only_its_source() {
    let tmp = tempdir().expect("tmp");
    write(&tmp.path().join("run/bad.json/manifest_bad.json"), b"{ nope");
    write(&tmp.path().join("c/ok.json"), br#"{"_id":"z"}"#);
    manifest(
        tmp.path(),
        "good.json",
        json!({"files": [{"file": "c/ok.json", "items": 1}]}),
    );
    let result = ingest_run(&options(tmp.path())).expect("ingest");
    assert_eq!(result.skipped.sources_failed, 1);
    assert_eq!(result.packs.len(), 1);
    assert_eq!(result.packs[0].source, "good.json");
}

#[test]
fn windows_1252_content_is_decoded() {
    let tmp = tempdir().expect("tmp");
    write(
        &tmp.path().join("c/legacy.json"),
        b"[{\"_id\":\"q\",\"name\":\"\x93Quoted\x94\"}]",
    );
    manifest(
        tmp.path(),
        "legacy.json",
        json!({"files": [{"file": "c/legacy.json", "items": 1}]}),
    );
    let result = ingest_run(&options(tmp.path())).expect("ingest");
    assert_eq!(result.stored_total(), 1);
    assert!(result
        .events
        .iter()
        .any(|e| e.name == "ingest.file.fallback_encoding" && e.fields["encoding"] == "windows-1252"));
}

#[test]
fn run_with_no_manifests_still_writes_reports() {
    let tmp = tempdir().expect("tmp");
    fs::create_dir_all(tmp.path().join("run")).expect("mkdir");
    let result = ingest_run(&options(tmp.path())).expect("ingest");
    assert!(result.packs.is_empty());
    assert_eq!(fs::read_to_string(&result.ledger_path).expect("ledger"), "{}\n");
    assert!(result.run_index_path.is_file());
}

#[test]
fn manifests_sharing_a_source_directory_feed_one_store() {
    let tmp = tempdir().expect("tmp");
    write(&tmp.path().join("c/a.json"), br#"[{"_id":"a"},{"_id":"b"}]"#);
    write(&tmp.path().join("c/b.json"), br#"[{"_id":"c"}]"#);
    write(
        &tmp.path().join("run/items.json/manifest_part1.json"),
        json!({"files": [{"file": "c/a.json", "items": 2}]}).to_string().as_bytes(),
    );
    write(
        &tmp.path().join("run/items.json/manifest_part2.json"),
        json!({"files": [{"file": "c/b.json", "items": 1}]}).to_string().as_bytes(),
    );
    let result = ingest_run(&options(tmp.path())).expect("ingest");
    assert_eq!(result.packs.len(), 1);
    assert_eq!(result.packs[0].inserted, 3);
    assert_eq!(result.packs[0].total_seen, 3);
}

#[test]
fn unwritable_store_fails_only_its_own_source() {
    let tmp = tempdir().expect("tmp");
    write(&tmp.path().join("c/a.json"), br#"[{"_id":"a1"}]"#);
    write(&tmp.path().join("c/b.json"), br#"[{"_id":"b1"},{"_id":"b2"}]"#);
    manifest(
        tmp.path(),
        "a.json",
        json!({"files": [{"file": "c/a.json", "items": 1}]}),
    );
    manifest(
        tmp.path(),
        "b.json",
        json!({"files": [{"file": "c/b.json", "items": 2}]}),
    );
    // A regular file where the store directory for a.json belongs.
    write(&tmp.path().join("out/a.json"), b"occupied");

    let opts = options(tmp.path());
    let result = ingest_run(&opts).expect("ingest");
    assert_eq!(result.skipped.sources_failed, 1);
    assert_eq!(result.packs.len(), 1);
    assert_eq!(result.packs[0].source, "b.json");
    assert!(store_db_path(&opts.output_root, "b.json").is_file());
    assert!(result.ledger_path.is_file());
    assert!(result.run_index_path.is_file());

    let ledger: serde_json::Value =
        serde_json::from_slice(&fs::read(&result.ledger_path).expect("ledger")).expect("json");
    assert!(ledger.get("a1").is_none());
    assert_eq!(result.ledger_entries, 2);
    assert!(result
        .events
        .iter()
        .any(|e| e.name == "ingest.source.failed" && e.fields["source"] == "a.json"));
}
