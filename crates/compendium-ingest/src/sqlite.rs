// SPDX-License-Identifier: Apache-2.0

use compendium_model::{PackSummary, Provenance};
use compendium_store::{store_db_path, DATA_TABLE, META_TABLE, STORE_SCHEMA_VERSION};
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::identity::{original_identity, UsedIdentifiers};
use crate::IngestError;

const INSERT_ENTRY_SQL: &str = "INSERT INTO data (id, type, name, data) VALUES (?1, ?2, ?3, ?4)";

/// Result of writing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted { original: String, new_id: String },
    /// The record is not a JSON object.
    NotAnObject { kind: &'static str },
    InsertFailed { new_id: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub source: String,
    pub db_path: PathBuf,
    pub category: String,
    pub inserted: u64,
    pub total_seen: u64,
    pub insert_failures: u64,
    pub skipped_records: u64,
}

impl StoreSummary {
    #[must_use]
    pub fn to_pack_summary(&self) -> PackSummary {
        PackSummary {
            source: self.source.clone(),
            db: self.db_path.display().to_string(),
            category: self.category.clone(),
            count: self.inserted,
            total_seen: self.total_seen,
        }
    }
}

/// Writer for one source's store. Owns the source's used-identifier set.
pub struct SourceStore {
    conn: Connection,
    source: String,
    category: String,
    db_path: PathBuf,
    used: UsedIdentifiers,
    inserted: u64,
    total_seen: u64,
    insert_failures: u64,
    skipped_records: u64,
}

impl SourceStore {
    /// Creates `<output_root>/<source>/<source>.db`, replacing any previous store of that name.
    pub fn open(output_root: &Path, source: &str, category: &str) -> Result<Self, IngestError> {
        let db_path = store_db_path(output_root, source);
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|e| IngestError(e.to_string()))?;
        }
        remove_store_files(&db_path)?;

        let conn = Connection::open(&db_path).map_err(|e| IngestError(e.to_string()))?;
        conn.execute_batch(&format!(
            "
            PRAGMA journal_mode=DELETE;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            CREATE TABLE {DATA_TABLE} (
              id TEXT PRIMARY KEY,
              type TEXT NOT NULL,
              name TEXT NOT NULL,
              data TEXT NOT NULL
            );
            CREATE TABLE {META_TABLE} (
              k TEXT PRIMARY KEY,
              v TEXT NOT NULL
            ) WITHOUT ROWID;
            PRAGMA user_version={STORE_SCHEMA_VERSION};
            "
        ))
        .map_err(|e| IngestError(e.to_string()))?;
        // Held open across `put` calls and committed by `close`; a borrowed
        // `rusqlite::Transaction` cannot live in the same struct as its connection.
        conn.execute_batch("BEGIN")
            .map_err(|e| IngestError(e.to_string()))?;

        Ok(Self {
            conn,
            source: source.to_string(),
            category: category.to_string(),
            db_path,
            used: UsedIdentifiers::new(),
            inserted: 0,
            total_seen: 0,
            insert_failures: 0,
            skipped_records: 0,
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    #[must_use]
    pub fn inserted(&self) -> u64 {
        self.inserted
    }

    /// Assigns an identifier, rewrites identity fields and inserts. Per-record failures are
    /// reported in the outcome, never as an error.
    pub fn put(&mut self, record: Value, provenance: &Provenance) -> PutOutcome {
        self.total_seen += 1;
        let mut body = match record {
            Value::Object(map) => map,
            other => {
                self.skipped_records += 1;
                return PutOutcome::NotAnObject {
                    kind: json_kind(&other),
                };
            }
        };

        let original = original_identity(&body);
        let new_id = self.used.claim(
            &original,
            &provenance.source,
            &provenance.file,
            provenance.index,
        );
        rewrite_identity(&mut body, &new_id, &original);
        let name = display_name(&body);

        let result = serde_json::to_string(&Value::Object(body))
            .map_err(|e| e.to_string())
            .and_then(|doc| {
                self.conn
                    .prepare_cached(INSERT_ENTRY_SQL)
                    .and_then(|mut stmt| stmt.execute(params![new_id, self.category, name, doc]))
                    .map_err(|e| e.to_string())
            });
        match result {
            Ok(_) => {
                self.inserted += 1;
                PutOutcome::Inserted { original, new_id }
            }
            Err(reason) => {
                self.insert_failures += 1;
                PutOutcome::InsertFailed { new_id, reason }
            }
        }
    }

    /// Commits the entries and metadata. The store is complete once this returns.
    pub fn close(self) -> Result<StoreSummary, IngestError> {
        let meta = [
            ("schema_version", STORE_SCHEMA_VERSION.to_string()),
            ("source", self.source.clone()),
            ("category", self.category.clone()),
            ("entry_count", self.inserted.to_string()),
        ];
        for (k, v) in meta {
            self.conn
                .execute(
                    &format!("INSERT INTO {META_TABLE} (k, v) VALUES (?1, ?2)"),
                    params![k, v],
                )
                .map_err(|e| IngestError(e.to_string()))?;
        }
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| IngestError(e.to_string()))?;
        self.conn
            .close()
            .map_err(|(_, e)| IngestError(e.to_string()))?;

        Ok(StoreSummary {
            source: self.source,
            db_path: self.db_path,
            category: self.category,
            inserted: self.inserted,
            total_seen: self.total_seen,
            insert_failures: self.insert_failures,
            skipped_records: self.skipped_records,
        })
    }
}

/// Removes a store file and any SQLite side files next to it.
pub fn remove_store_files(db_path: &Path) -> Result<(), IngestError> {
    let mut candidates = vec![db_path.to_path_buf()];
    for suffix in ["-journal", "-wal", "-shm"] {
        let mut side = db_path.as_os_str().to_owned();
        side.push(suffix);
        candidates.push(PathBuf::from(side));
    }
    for path in candidates {
        if path.exists() {
            fs::remove_file(&path).map_err(|e| IngestError(e.to_string()))?;
        }
    }
    Ok(())
}

/// Sets `_id` to the assigned identifier and keeps the original under `flags.orig_id`.
/// Existing keys keep their position in the body.
pub fn rewrite_identity(body: &mut Map<String, Value>, new_id: &str, original: &str) {
    let orig = Value::String(original.to_string());
    match body.get_mut("flags") {
        Some(Value::Object(flags)) => {
            flags.insert("orig_id".to_string(), orig);
        }
        Some(slot) => {
            let prior = slot.take();
            let mut flags = Map::new();
            if !prior.is_null() {
                flags.insert("original_flags".to_string(), prior);
            }
            flags.insert("orig_id".to_string(), orig);
            *slot = Value::Object(flags);
        }
        None => {
            let mut flags = Map::new();
            flags.insert("orig_id".to_string(), orig);
            body.insert("flags".to_string(), Value::Object(flags));
        }
    }
    body.insert("_id".to_string(), Value::String(new_id.to_string()));
}

/// `name`, then `title`, then empty.
#[must_use]
pub fn display_name(body: &Map<String, Value>) -> String {
    ["name", "title"]
        .iter()
        .find_map(|key| match body.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
