#![forbid(unsafe_code)]

mod paths;
mod reader;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "compendium-store";

pub use paths::{
    discover_stores, store_db_path, store_dir, DiscoveredStore, LEDGER_FILE, RUN_INDEX_FILE,
    STORE_FILE_EXTENSION, VALIDATION_REPORT_FILE,
};
pub use reader::{StoreReader, StoredEntry};

/// Name of the per-source entry table.
pub const DATA_TABLE: &str = "data";
/// Key/value metadata table written alongside the entries.
pub const META_TABLE: &str = "compendium_meta";
pub const STORE_SCHEMA_VERSION: i64 = 1;

#[derive(Debug)]
pub struct StoreError(pub String);

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}
