// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Consistent,
    CountMismatch,
    MissingStore,
    MissingManifest,
    StoreUnreadable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IdShapeStats {
    pub sample_count: u64,
    pub sample_id_lengths: Vec<usize>,
    pub sample_ids_lowercase_hex: bool,
    pub sample_ids_nonconforming: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceValidation {
    pub status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_shape: Option<IdShapeStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_total_seen: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ValidationSummary {
    pub sources: u64,
    pub by_status: BTreeMap<ValidationStatus, u64>,
    pub stored_total: u64,
    pub manifest_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ValidationReport {
    pub sources: BTreeMap<String, SourceValidation>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.sources
            .values()
            .all(|s| s.status == ValidationStatus::Consistent)
    }
}
