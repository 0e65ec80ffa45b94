use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where a record physically came from. The file is the logical path declared in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Provenance {
    pub source: String,
    pub file: String,
    pub index: u64,
}

impl Provenance {
    #[must_use]
    pub fn new(source: impl Into<String>, file: impl Into<String>, index: u64) -> Self {
        Self {
            source: source.into(),
            file: file.into(),
            index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerEntry {
    pub new_id: String,
    pub file: String,
    pub index: u64,
}

/// Original identifier -> every assigned identifier it fanned out into, in processing order.
pub type LedgerMap = IndexMap<String, Vec<LedgerEntry>>;
