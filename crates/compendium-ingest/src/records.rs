// SPDX-License-Identifier: Apache-2.0

use compendium_model::TextEncoding;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::text::decode_text;
use crate::IngestError;

/// One raw payload and its zero-based position in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub value: Value,
    pub index: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// The whole file is one JSON value; an array contributes one record per element.
    JsonDocument,
    /// One JSON value per non-blank line. Indices are line numbers.
    Ndjson,
}

impl RecordFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JsonDocument => "json",
            Self::Ndjson => "ndjson",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Parsed {
        records: Vec<RawRecord>,
        format: RecordFormat,
        encoding: TextEncoding,
        skipped_lines: Vec<SkippedLine>,
    },
    /// Empty or whitespace-only file.
    Empty,
    /// Neither a JSON document nor any valid NDJSON line.
    ParseFailed {
        reason: String,
        skipped_lines: Vec<SkippedLine>,
    },
}

impl LoadOutcome {
    #[must_use]
    pub fn record_count(&self) -> usize {
        match self {
            Self::Parsed { records, .. } => records.len(),
            Self::Empty | Self::ParseFailed { .. } => 0,
        }
    }
}

/// Reads and parses one content file. Only I/O and decoding failures are errors.
pub fn load_records(path: &Path, fallbacks: &[TextEncoding]) -> Result<LoadOutcome, IngestError> {
    let bytes =
        fs::read(path).map_err(|e| IngestError(format!("{}: {e}", path.display())))?;
    let (text, encoding) = decode_text(&bytes, fallbacks)
        .map_err(|e| IngestError(format!("{}: {}", path.display(), e.0)))?;
    Ok(parse_records(&text, encoding))
}

pub fn parse_records(text: &str, encoding: TextEncoding) -> LoadOutcome {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return LoadOutcome::Empty;
    }

    let document_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Array(items)) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(i, value)| RawRecord {
                    value,
                    index: i as u64,
                })
                .collect();
            return LoadOutcome::Parsed {
                records,
                format: RecordFormat::JsonDocument,
                encoding,
                skipped_lines: Vec::new(),
            };
        }
        Ok(value) => {
            return LoadOutcome::Parsed {
                records: vec![RawRecord { value, index: 0 }],
                format: RecordFormat::JsonDocument,
                encoding,
                skipped_lines: Vec::new(),
            };
        }
        Err(e) => e.to_string(),
    };

    let mut records = Vec::new();
    let mut skipped_lines = Vec::new();
    for (i, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => records.push(RawRecord {
                value,
                index: i as u64,
            }),
            Err(e) => skipped_lines.push(SkippedLine {
                line: i as u64,
                reason: e.to_string(),
            }),
        }
    }

    if records.is_empty() {
        return LoadOutcome::ParseFailed {
            reason: format!("not a JSON document ({document_error}) and no valid NDJSON lines"),
            skipped_lines,
        };
    }
    LoadOutcome::Parsed {
        records,
        format: RecordFormat::Ndjson,
        encoding,
        skipped_lines,
    }
}
