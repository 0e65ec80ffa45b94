// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod identity;
mod ledger;
mod logging;
mod records;
mod scan;
mod sqlite;
mod text;
mod write;

use compendium_model::{
    CategoryPolicy, Provenance, RunIndex, SkipCounters, TextEncoding, TimestampPolicy,
};
use compendium_store::{store_db_path, LEDGER_FILE};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;

use logging::fields;

pub const CRATE_NAME: &str = "compendium-ingest";

pub const DEFAULT_RUN_DIR: &str = "jsons/organized";
pub const DEFAULT_OUTPUT_ROOT: &str = "jsons/foundry_compendiums";
pub const DEFAULT_REPORTS_DIR: &str = "jsons/reports";

pub use identity::{assign_identifier, original_identity, UsedIdentifiers};
pub use ledger::ProvenanceLedger;
pub use logging::{IngestEvent, IngestLevel, IngestLog, IngestStage};
pub use records::{load_records, parse_records, LoadOutcome, RawRecord, RecordFormat, SkippedLine};
pub use scan::{
    read_manifest, resolve_manifest_file, scan_manifests, source_name, DiscoveredManifest,
    ManifestScan, ScanFailure,
};
pub use sqlite::{
    display_name, remove_store_files, rewrite_identity, PutOutcome, SourceStore, StoreSummary,
};
pub use text::decode_text;
pub use write::{build_run_index, write_run_index};

#[derive(Debug)]
pub struct IngestError(pub String);
impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for IngestError {}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub run_dir: PathBuf,
    pub output_root: PathBuf,
    pub reports_dir: PathBuf,
    pub base_dir: Option<PathBuf>,
    pub categories: CategoryPolicy,
    pub fallback_encodings: Vec<TextEncoding>,
    pub timestamp_policy: TimestampPolicy,
    pub ledger_file_name: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            run_dir: PathBuf::from(DEFAULT_RUN_DIR),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            base_dir: None,
            categories: CategoryPolicy::default(),
            fallback_encodings: vec![TextEncoding::Windows1252, TextEncoding::Latin1],
            timestamp_policy: TimestampPolicy::DeterministicZero,
            ledger_file_name: LEDGER_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestResult {
    pub packs: Vec<StoreSummary>,
    pub ledger_path: PathBuf,
    pub ledger_entries: u64,
    pub run_index_path: PathBuf,
    pub run_index: RunIndex,
    pub skipped: SkipCounters,
    pub events: Vec<IngestEvent>,
}

impl IngestResult {
    #[must_use]
    pub fn stored_total(&self) -> u64 {
        self.packs.iter().map(|p| p.inserted).sum()
    }
}

/// Ingests every source under `opts.run_dir`, then flushes the ledger and run index once.
/// A source whose store cannot be written is counted as failed and the run continues.
pub fn ingest_run(opts: &IngestOptions) -> Result<IngestResult, IngestError> {
    let mut log = IngestLog::default();
    log.info(
        IngestStage::Prepare,
        "ingest.start",
        fields([
            ("run_dir", opts.run_dir.display().to_string()),
            ("output_root", opts.output_root.display().to_string()),
        ]),
    );
    if !opts.run_dir.is_dir() {
        return Err(IngestError(format!(
            "run directory not found: {}",
            opts.run_dir.display()
        )));
    }
    fs::create_dir_all(&opts.output_root).map_err(|e| IngestError(e.to_string()))?;

    let mut ledger = ProvenanceLedger::new();
    let mut counters = SkipCounters::default();
    let mut packs = Vec::new();

    for discovered in collect_manifests(&opts.run_dir, &mut counters, &mut log) {
        match ingest_source(&discovered, opts, &mut ledger, &mut counters, &mut log) {
            Ok(Some(summary)) => packs.push(summary),
            Ok(None) => {}
            Err(err) => {
                counters.sources_failed += 1;
                let db_path = store_db_path(&opts.output_root, &discovered.source);
                let _ = remove_store_files(&db_path);
                log.warn(
                    IngestStage::Persist,
                    "ingest.source.failed",
                    fields([
                        ("source", discovered.source.clone()),
                        ("reason", err.to_string()),
                    ]),
                );
            }
        }
    }

    let ledger_entries = ledger.entry_count();
    let ledger_path = ledger.flush(&opts.reports_dir.join(&opts.ledger_file_name))?;
    log.info(
        IngestStage::Finalize,
        "ingest.ledger.flushed",
        fields([
            ("path", ledger_path.display().to_string()),
            ("entries", ledger_entries.to_string()),
        ]),
    );

    let run_index = build_run_index(opts.timestamp_policy, &packs, &ledger_path, counters);
    let run_index_path = write_run_index(&opts.output_root, &run_index)?;
    log.info(
        IngestStage::Finalize,
        "ingest.complete",
        fields([
            ("packs", packs.len().to_string()),
            (
                "stored",
                packs.iter().map(|p| p.inserted).sum::<u64>().to_string(),
            ),
            ("skipped_total", counters.total().to_string()),
            ("index", run_index_path.display().to_string()),
        ]),
    );

    Ok(IngestResult {
        packs,
        ledger_path,
        ledger_entries,
        run_index_path,
        run_index,
        skipped: counters,
        events: log.into_events(),
    })
}

/// Scans the run directory and merges manifests that name the same source, keeping scan order.
fn collect_manifests(
    run_dir: &std::path::Path,
    counters: &mut SkipCounters,
    log: &mut IngestLog,
) -> Vec<DiscoveredManifest> {
    let mut out: Vec<DiscoveredManifest> = Vec::new();
    for item in scan_manifests(run_dir) {
        match item {
            Ok(discovered) => {
                match out.iter_mut().find(|m| m.source == discovered.source) {
                    Some(existing) => {
                        log.debug(
                            IngestStage::Scan,
                            "ingest.scan.manifest_merged",
                            fields([
                                ("source", discovered.source.clone()),
                                ("manifest", discovered.path.display().to_string()),
                            ]),
                        );
                        existing.manifest.files.extend(discovered.manifest.files);
                    }
                    None => out.push(discovered),
                }
            }
            Err(failure) => {
                counters.sources_failed += 1;
                log.warn(
                    IngestStage::Scan,
                    "ingest.scan.manifest_failed",
                    fields([
                        (
                            "path",
                            failure
                                .path
                                .map(|p| p.display().to_string())
                                .unwrap_or_default(),
                        ),
                        ("reason", failure.reason),
                    ]),
                );
            }
        }
    }
    out
}

fn ingest_source(
    discovered: &DiscoveredManifest,
    opts: &IngestOptions,
    ledger: &mut ProvenanceLedger,
    counters: &mut SkipCounters,
    log: &mut IngestLog,
) -> Result<Option<StoreSummary>, IngestError> {
    let source = discovered.source.as_str();
    log.info(
        IngestStage::Scan,
        "ingest.source.begin",
        fields([
            ("source", source.to_string()),
            ("manifest", discovered.path.display().to_string()),
            (
                "declared_total",
                discovered.manifest.declared_total().to_string(),
            ),
        ]),
    );

    let loaded = load_source_records(discovered, opts, counters, log);
    let db_path = store_db_path(&opts.output_root, source);
    if loaded.is_empty() {
        counters.sources_empty += 1;
        remove_store_files(&db_path)?;
        log.warn(
            IngestStage::Persist,
            "ingest.source.no_records",
            fields([("source", source.to_string())]),
        );
        return Ok(None);
    }

    let category = opts.categories.category_for(source).to_string();
    let mut store = SourceStore::open(&opts.output_root, source, &category)?;
    // Ledger entries are committed only once the store closes cleanly.
    let mut inserted = Vec::new();
    for (record, file) in loaded {
        let provenance = Provenance::new(source, file, record.index);
        match store.put(record.value, &provenance) {
            PutOutcome::Inserted { original, new_id } => {
                inserted.push((original, new_id, provenance));
            }
            PutOutcome::NotAnObject { kind } => {
                counters.records_skipped += 1;
                log.warn(
                    IngestStage::Persist,
                    "ingest.record.not_an_object",
                    fields([
                        ("source", source.to_string()),
                        ("file", provenance.file.clone()),
                        ("index", provenance.index.to_string()),
                        ("kind", kind.to_string()),
                    ]),
                );
            }
            PutOutcome::InsertFailed { new_id, reason } => {
                counters.insert_failures += 1;
                log.warn(
                    IngestStage::Persist,
                    "ingest.record.insert_failed",
                    fields([
                        ("source", source.to_string()),
                        ("file", provenance.file.clone()),
                        ("index", provenance.index.to_string()),
                        ("new_id", new_id),
                        ("reason", reason),
                    ]),
                );
            }
        }
    }
    let summary = store.close()?;
    for (original, new_id, provenance) in inserted {
        ledger.record(&original, &new_id, &provenance.file, provenance.index);
    }

    if summary.inserted == 0 {
        counters.sources_empty += 1;
        remove_store_files(&summary.db_path)?;
        log.warn(
            IngestStage::Persist,
            "ingest.source.no_records",
            fields([
                ("source", source.to_string()),
                ("total_seen", summary.total_seen.to_string()),
            ]),
        );
        return Ok(None);
    }

    log.info(
        IngestStage::Persist,
        "ingest.source.complete",
        fields([
            ("source", source.to_string()),
            ("db", summary.db_path.display().to_string()),
            ("category", summary.category.clone()),
            ("inserted", summary.inserted.to_string()),
            ("total_seen", summary.total_seen.to_string()),
        ]),
    );
    Ok(Some(summary))
}

/// Loads every file a manifest lists. Missing, unreadable and unparsable files are
/// counted and skipped.
fn load_source_records(
    discovered: &DiscoveredManifest,
    opts: &IngestOptions,
    counters: &mut SkipCounters,
    log: &mut IngestLog,
) -> Vec<(RawRecord, String)> {
    let source = discovered.source.as_str();
    let mut out = Vec::new();
    for entry in &discovered.manifest.files {
        let Some(declared) = entry.file.as_deref() else {
            counters.files_missing += 1;
            log.warn(
                IngestStage::Load,
                "ingest.file.no_path",
                fields([("source", source.to_string())]),
            );
            continue;
        };
        let path = resolve_manifest_file(opts.base_dir.as_deref(), declared);
        if !path.is_file() {
            counters.files_missing += 1;
            log.warn(
                IngestStage::Load,
                "ingest.file.missing",
                fields([
                    ("source", source.to_string()),
                    ("file", declared.to_string()),
                ]),
            );
            continue;
        }

        let outcome = match load_records(&path, &opts.fallback_encodings) {
            Ok(outcome) => outcome,
            Err(e) => {
                counters.files_unreadable += 1;
                log.warn(
                    IngestStage::Load,
                    "ingest.file.unreadable",
                    fields([
                        ("source", source.to_string()),
                        ("file", declared.to_string()),
                        ("reason", e.0),
                    ]),
                );
                continue;
            }
        };

        let found = outcome.record_count() as u64;
        match outcome {
            LoadOutcome::Empty => log.debug(
                IngestStage::Load,
                "ingest.file.empty",
                fields([("file", declared.to_string())]),
            ),
            LoadOutcome::ParseFailed { reason, .. } => {
                counters.files_unparsable += 1;
                log.warn(
                    IngestStage::Load,
                    "ingest.file.unparsable",
                    fields([
                        ("source", source.to_string()),
                        ("file", declared.to_string()),
                        ("reason", reason),
                    ]),
                );
            }
            LoadOutcome::Parsed {
                records,
                format,
                encoding,
                skipped_lines,
            } => {
                for skipped in skipped_lines {
                    counters.lines_skipped += 1;
                    log.warn(
                        IngestStage::Load,
                        "ingest.load.line_skipped",
                        fields([
                            ("file", declared.to_string()),
                            ("line", skipped.line.to_string()),
                            ("reason", skipped.reason),
                        ]),
                    );
                }
                if encoding != TextEncoding::Utf8 {
                    log.info(
                        IngestStage::Load,
                        "ingest.file.fallback_encoding",
                        fields([
                            ("file", declared.to_string()),
                            ("encoding", encoding.as_str().to_string()),
                        ]),
                    );
                }
                log.debug(
                    IngestStage::Load,
                    "ingest.file.loaded",
                    fields([
                        ("file", declared.to_string()),
                        ("format", format.as_str().to_string()),
                        ("records", records.len().to_string()),
                    ]),
                );
                out.extend(records.into_iter().map(|r| (r, declared.to_string())));
            }
        }

        if found != entry.items {
            counters.count_mismatches += 1;
            log.warn(
                IngestStage::Load,
                "ingest.file.count_mismatch",
                fields([
                    ("source", source.to_string()),
                    ("file", declared.to_string()),
                    ("declared", entry.items.to_string()),
                    ("found", found.to_string()),
                ]),
            );
        }
    }
    out
}
