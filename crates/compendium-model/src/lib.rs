#![forbid(unsafe_code)]
//! Compendium model SSOT: manifests, provenance, ledger and report shapes.

mod index;
mod ledger;
mod manifest;
mod policy;
mod report;
mod serde_helpers;

pub use index::{PackSummary, RunIndex, SkipCounters};
pub use ledger::{LedgerEntry, LedgerMap, Provenance};
pub use manifest::{ManifestFileEntry, SourceManifest, MANIFEST_FILE_PREFIX, MANIFEST_FILE_SUFFIX};
pub use policy::{
    CategoryPolicy, TextEncoding, TimestampPolicy, DEFAULT_CATEGORY, DETERMINISTIC_ZERO_TIMESTAMP,
    ID_LENGTH_LADDER, ID_MAX_LEN,
};
pub use report::{IdShapeStats, SourceValidation, ValidationReport, ValidationStatus, ValidationSummary};

pub const CRATE_NAME: &str = "compendium-model";
