// SPDX-License-Identifier: Apache-2.0

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use crate::{StoreError, DATA_TABLE, META_TABLE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: String,
    pub category: String,
    pub name: String,
    pub body: String,
}

/// Read-only view over one source's store. Never creates or mutates the file.
pub struct StoreReader {
    conn: Connection,
}

impl StoreReader {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError(format!("store not found: {}", path.display())));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {DATA_TABLE}"), [], |row| {
                row.get(0)
            })
            .map_err(|e| StoreError(e.to_string()))?;
        Ok(count.max(0) as u64)
    }

    /// Up to `limit` identifiers in identifier order.
    pub fn sample_ids(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id FROM {DATA_TABLE} ORDER BY id LIMIT ?1"))
            .map_err(|e| StoreError(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError(e.to_string()))?;
        Ok(rows)
    }

    pub fn entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, type, name, data FROM {DATA_TABLE} ORDER BY id"
            ))
            .map_err(|e| StoreError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredEntry {
                    id: row.get(0)?,
                    category: row.get(1)?,
                    name: row.get(2)?,
                    body: row.get(3)?,
                })
            })
            .map_err(|e| StoreError(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError(e.to_string()))?;
        Ok(rows)
    }

    pub fn entry(&self, id: &str) -> Result<Option<StoredEntry>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT id, type, name, data FROM {DATA_TABLE} WHERE id = ?1"),
                params![id],
                |row| {
                    Ok(StoredEntry {
                        id: row.get(0)?,
                        category: row.get(1)?,
                        name: row.get(2)?,
                        body: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| StoreError(e.to_string()))
    }

    pub fn meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT v FROM {META_TABLE} WHERE k = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError(e.to_string()))
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        self.conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| StoreError(e.to_string()))
    }
}
