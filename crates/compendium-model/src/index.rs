// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Everything the run dropped, by granularity. All zero means nothing was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SkipCounters {
    pub records_skipped: u64,
    pub lines_skipped: u64,
    pub insert_failures: u64,
    pub files_missing: u64,
    pub files_unreadable: u64,
    pub files_unparsable: u64,
    pub count_mismatches: u64,
    pub sources_empty: u64,
    pub sources_failed: u64,
}

impl SkipCounters {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.records_skipped
            + self.lines_skipped
            + self.insert_failures
            + self.files_missing
            + self.files_unreadable
            + self.files_unparsable
            + self.sources_empty
            + self.sources_failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackSummary {
    pub source: String,
    pub db: String,
    pub category: String,
    pub count: u64,
    pub total_seen: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunIndex {
    pub created_on: String,
    pub packs: Vec<PackSummary>,
    pub duplicates_map: String,
    pub skipped: SkipCounters,
}
