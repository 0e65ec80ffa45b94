// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use crate::StoreError;

pub const STORE_FILE_EXTENSION: &str = "db";
pub const RUN_INDEX_FILE: &str = "index.json";
pub const LEDGER_FILE: &str = "duplicates_preserved_map.json";
pub const VALIDATION_REPORT_FILE: &str = "compendium_validation.json";

#[must_use]
pub fn store_dir(output_root: &Path, source: &str) -> PathBuf {
    output_root.join(source)
}

#[must_use]
pub fn store_db_path(output_root: &Path, source: &str) -> PathBuf {
    store_dir(output_root, source).join(format!("{source}.{STORE_FILE_EXTENSION}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredStore {
    pub source: String,
    pub db_path: PathBuf,
}

/// Every `<root>/<name>/<name>.db`, sorted by source name. A missing root has no stores.
pub fn discover_stores(output_root: &Path) -> Result<Vec<DiscoveredStore>, StoreError> {
    if !output_root.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(output_root).map_err(|e| StoreError(e.to_string()))? {
        let entry = entry.map_err(|e| StoreError(e.to_string()))?;
        if !entry.file_type().map_err(|e| StoreError(e.to_string()))?.is_dir() {
            continue;
        }
        let Some(source) = entry.file_name().to_str().map(ToString::to_string) else {
            continue;
        };
        let db_path = store_db_path(output_root, &source);
        if db_path.is_file() {
            out.push(DiscoveredStore { source, db_path });
        }
    }
    out.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(out)
}
