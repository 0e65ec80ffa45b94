// SPDX-License-Identifier: Apache-2.0

use compendium_store::{
    discover_stores, store_db_path, store_dir, StoreReader, DATA_TABLE, META_TABLE,
};
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_fixture_store(path: &Path, ids: &[&str]) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    let conn = Connection::open(path).expect("open");
    conn.execute_batch(&format!(
        "CREATE TABLE {DATA_TABLE} (id TEXT PRIMARY KEY, type TEXT NOT NULL, name TEXT NOT NULL, data TEXT NOT NULL);
         CREATE TABLE {META_TABLE} (k TEXT PRIMARY KEY, v TEXT NOT NULL);
         INSERT INTO {META_TABLE} (k, v) VALUES ('source', 'spells');
         PRAGMA user_version=1;"
    ))
    .expect("schema");
    for id in ids {
        conn.execute(
            &format!("INSERT INTO {DATA_TABLE} (id, type, name, data) VALUES (?1, 'Item', 'n', '{{}}')"),
            [id],
        )
        .expect("insert");
    }
}

#[test]
fn store_layout_paths_are_stable() {
    let root = Path::new("out");
    assert_eq!(store_dir(root, "spells"), Path::new("out/spells"));
    assert_eq!(store_db_path(root, "spells"), Path::new("out/spells/spells.db"));
}

#[test]
fn discover_stores_skips_dirs_without_db_and_sorts() {
    let tmp = tempdir().expect("tmp");
    write_fixture_store(&store_db_path(tmp.path(), "zeta"), &["a"]);
    write_fixture_store(&store_db_path(tmp.path(), "alpha"), &["b"]);
    fs::create_dir_all(tmp.path().join("empty_dir")).expect("mkdir");
    fs::write(tmp.path().join("index.json"), "{}").expect("index");

    let found = discover_stores(tmp.path()).expect("discover");
    let names: Vec<_> = found.iter().map(|s| s.source.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn discover_stores_on_missing_root_is_empty() {
    let tmp = tempdir().expect("tmp");
    let found = discover_stores(&tmp.path().join("nope")).expect("discover");
    assert!(found.is_empty());
}

#[test]
fn reader_counts_and_samples_in_id_order() {
    let tmp = tempdir().expect("tmp");
    let db = store_db_path(tmp.path(), "spells");
    write_fixture_store(&db, &["cc", "aa", "bb"]);

    let reader = StoreReader::open(&db).expect("open");
    assert_eq!(reader.count().expect("count"), 3);
    assert_eq!(reader.sample_ids(2).expect("sample"), vec!["aa", "bb"]);
    assert_eq!(reader.meta("source").expect("meta").as_deref(), Some("spells"));
    assert_eq!(reader.schema_version().expect("version"), 1);
    assert!(reader.entry("zz").expect("entry").is_none());
}

#[test]
fn reader_refuses_missing_store_without_creating_it() {
    let tmp = tempdir().expect("tmp");
    let db = tmp.path().join("ghost/ghost.db");
    assert!(StoreReader::open(&db).is_err());
    assert!(!db.exists());
}
