// SPDX-License-Identifier: Apache-2.0

use compendium_core::is_lowercase_hex;
use compendium_ingest::scan_manifests;
use compendium_model::{
    IdShapeStats, SourceValidation, ValidationReport, ValidationStatus, ValidationSummary,
    ID_LENGTH_LADDER,
};
use compendium_store::{discover_stores, StoreReader, VALIDATION_REPORT_FILE};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_SAMPLE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub output_root: PathBuf,
    pub run_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub sample_size: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(compendium_ingest::DEFAULT_OUTPUT_ROOT),
            run_dir: PathBuf::from(compendium_ingest::DEFAULT_RUN_DIR),
            reports_dir: PathBuf::from(compendium_ingest::DEFAULT_REPORTS_DIR),
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub report: ValidationReport,
    pub report_path: PathBuf,
}

/// Re-opens every store and compares it with the manifests. Mismatches and missing
/// stores are reported; only an unwritable report is an error.
pub fn validate_compendiums(opts: &ValidateOptions) -> Result<ValidationOutcome, String> {
    let stores = discover_stores(&opts.output_root).map_err(|e| e.to_string())?;
    let expected = manifest_totals(&opts.run_dir);

    let mut sources = BTreeMap::new();
    for store in &stores {
        let manifest_total = expected.get(&store.source).copied();
        let validation = validate_store(&store.db_path, manifest_total, opts.sample_size);
        sources.insert(store.source.clone(), validation);
    }
    for (source, total) in &expected {
        if sources.contains_key(source) {
            continue;
        }
        warn!(source = %source, "manifest source has no store");
        sources.insert(
            source.clone(),
            SourceValidation {
                status: ValidationStatus::MissingStore,
                db_path: None,
                count: None,
                id_shape: None,
                manifest_total_seen: Some(*total),
                error: None,
            },
        );
    }

    let report = ValidationReport {
        summary: summarize(&sources),
        sources,
    };
    let report_path = write_report(&opts.reports_dir, &report)?;
    info!(
        report = %report_path.display(),
        sources = report.summary.sources,
        consistent = report.is_consistent(),
        "validation report written"
    );
    Ok(ValidationOutcome {
        report,
        report_path,
    })
}

/// Declared totals per source, summed across every manifest of that source.
pub(crate) fn manifest_totals(run_dir: &Path) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    if !run_dir.is_dir() {
        warn!(run_dir = %run_dir.display(), "run directory not found; no manifests to compare");
        return totals;
    }
    for item in scan_manifests(run_dir) {
        match item {
            Ok(found) => {
                *totals.entry(found.source).or_insert(0) += found.manifest.declared_total();
            }
            Err(failure) => warn!(
                path = ?failure.path,
                reason = %failure.reason,
                "manifest skipped during validation"
            ),
        }
    }
    totals
}

fn validate_store(
    db_path: &Path,
    manifest_total: Option<u64>,
    sample_size: usize,
) -> SourceValidation {
    let db = Some(db_path.display().to_string());
    let inspected = StoreReader::open(db_path).and_then(|reader| {
        let count = reader.count()?;
        let sample = reader.sample_ids(sample_size)?;
        Ok((count, sample))
    });
    let (count, sample) = match inspected {
        Ok(found) => found,
        Err(e) => {
            warn!(db = %db_path.display(), error = %e, "store unreadable");
            return SourceValidation {
                status: ValidationStatus::StoreUnreadable,
                db_path: db,
                count: None,
                id_shape: None,
                manifest_total_seen: manifest_total,
                error: Some(e.to_string()),
            };
        }
    };

    let status = match manifest_total {
        None => ValidationStatus::MissingManifest,
        Some(total) if total == count => ValidationStatus::Consistent,
        Some(_) => ValidationStatus::CountMismatch,
    };
    if status != ValidationStatus::Consistent {
        warn!(
            db = %db_path.display(),
            count,
            ?manifest_total,
            ?status,
            "store does not match manifest"
        );
    }
    SourceValidation {
        status,
        db_path: db,
        count: Some(count),
        id_shape: Some(id_shape(&sample)),
        manifest_total_seen: manifest_total,
        error: None,
    }
}

pub(crate) fn id_shape(sample: &[String]) -> IdShapeStats {
    let lengths: BTreeSet<usize> = sample.iter().map(String::len).collect();
    let nonconforming = sample
        .iter()
        .filter(|id| !is_lowercase_hex(id) || !ID_LENGTH_LADDER.contains(&id.len()))
        .count();
    IdShapeStats {
        sample_count: sample.len() as u64,
        sample_id_lengths: lengths.into_iter().collect(),
        sample_ids_lowercase_hex: sample.iter().all(|id| is_lowercase_hex(id)),
        sample_ids_nonconforming: nonconforming as u64,
    }
}

fn summarize(sources: &BTreeMap<String, SourceValidation>) -> ValidationSummary {
    let mut summary = ValidationSummary {
        sources: sources.len() as u64,
        ..ValidationSummary::default()
    };
    for validation in sources.values() {
        *summary.by_status.entry(validation.status).or_insert(0) += 1;
        summary.stored_total += validation.count.unwrap_or(0);
        summary.manifest_total += validation.manifest_total_seen.unwrap_or(0);
    }
    summary
}

fn write_report(reports_dir: &Path, report: &ValidationReport) -> Result<PathBuf, String> {
    fs::create_dir_all(reports_dir).map_err(|e| e.to_string())?;
    let path = reports_dir.join(VALIDATION_REPORT_FILE);
    let mut bytes = serde_json::to_vec_pretty(report).map_err(|e| e.to_string())?;
    bytes.push(b'\n');
    fs::write(&path, bytes).map_err(|e| e.to_string())?;
    Ok(path)
}
