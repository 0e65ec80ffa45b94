// SPDX-License-Identifier: Apache-2.0

use compendium_core::canonical;
use compendium_model::{
    RunIndex, SkipCounters, TimestampPolicy, DETERMINISTIC_ZERO_TIMESTAMP,
};
use compendium_store::RUN_INDEX_FILE;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sqlite::StoreSummary;
use crate::IngestError;

#[must_use]
pub fn build_run_index(
    timestamp_policy: TimestampPolicy,
    packs: &[StoreSummary],
    ledger_path: &Path,
    skipped: SkipCounters,
) -> RunIndex {
    let created_on = match timestamp_policy {
        TimestampPolicy::DeterministicZero => DETERMINISTIC_ZERO_TIMESTAMP.to_string(),
        TimestampPolicy::WallClock => {
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        }
    };
    RunIndex {
        created_on,
        packs: packs.iter().map(StoreSummary::to_pack_summary).collect(),
        duplicates_map: ledger_path.display().to_string(),
        skipped,
    }
}

pub fn write_run_index(output_root: &Path, index: &RunIndex) -> Result<PathBuf, IngestError> {
    fs::create_dir_all(output_root).map_err(|e| IngestError(e.to_string()))?;
    let path = output_root.join(RUN_INDEX_FILE);
    let bytes =
        canonical::stable_json_pretty_bytes(index).map_err(|e| IngestError(e.to_string()))?;
    fs::write(&path, bytes).map_err(|e| IngestError(e.to_string()))?;
    Ok(path)
}
