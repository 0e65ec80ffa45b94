// SPDX-License-Identifier: Apache-2.0

use compendium_model::{LedgerEntry, LedgerMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::IngestError;

/// Cross-source fan-out of original identifiers. Append-only until flushed.
#[derive(Debug, Default, Clone)]
pub struct ProvenanceLedger {
    map: LedgerMap,
    entries: u64,
}

impl ProvenanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, original: &str, new_id: &str, file: &str, index: u64) {
        self.map
            .entry(original.to_string())
            .or_default()
            .push(LedgerEntry {
                new_id: new_id.to_string(),
                file: file.to_string(),
                index,
            });
        self.entries += 1;
    }

    /// Total recorded occurrences across every original identifier.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries
    }

    #[must_use]
    pub fn original_count(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn get(&self, original: &str) -> Option<&[LedgerEntry]> {
        self.map.get(original).map(Vec::as_slice)
    }

    /// Writes the whole mapping once. Consumes the ledger so it cannot change afterwards.
    pub fn flush(self, destination: &Path) -> Result<PathBuf, IngestError> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| IngestError(e.to_string()))?;
            }
        }
        let mut bytes =
            serde_json::to_vec_pretty(&self.map).map_err(|e| IngestError(e.to_string()))?;
        bytes.push(b'\n');
        fs::write(destination, bytes).map_err(|e| IngestError(e.to_string()))?;
        Ok(destination.to_path_buf())
    }
}
