// SPDX-License-Identifier: Apache-2.0

use compendium_core::sha256_hex;
use compendium_model::{ID_LENGTH_LADDER, ID_MAX_LEN};
use serde_json::{Map, Value};
use std::collections::HashSet;

const FIELD_SEPARATOR: char = '|';

/// Identifiers already handed out within one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedIdentifiers {
    ids: HashSet<String>,
}

impl UsedIdentifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns false when the identifier was already present.
    pub fn insert(&mut self, id: String) -> bool {
        self.ids.insert(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Assigns and immediately reserves an identifier.
    pub fn claim(&mut self, original: &str, source: &str, file: &str, index: u64) -> String {
        let id = assign_identifier(original, source, file, index, self);
        self.ids.insert(id.clone());
        id
    }
}

/// Pure: the same inputs and the same used set always give the same identifier.
#[must_use]
pub fn assign_identifier(
    original: &str,
    source: &str,
    file: &str,
    index: u64,
    used: &UsedIdentifiers,
) -> String {
    let base = format!(
        "{original}{FIELD_SEPARATOR}{source}{FIELD_SEPARATOR}{file}{FIELD_SEPARATOR}{index}"
    );
    let digest = sha256_hex(base.as_bytes());
    for len in ID_LENGTH_LADDER {
        let candidate = &digest[..len];
        if !used.contains(candidate) {
            return candidate.to_string();
        }
    }
    // The suffix replaces the tail of the 32-char prefix so every candidate stays distinct.
    let mut counter: u64 = 0;
    loop {
        let suffix = counter.to_string();
        let keep = ID_MAX_LEN.saturating_sub(suffix.len());
        let candidate = format!("{}{suffix}", &digest[..keep]);
        if !used.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// `_id`, then `id`, then empty. Null, zero, `false` and empty strings count as absent.
#[must_use]
pub fn original_identity(record: &Map<String, Value>) -> String {
    ["_id", "id"]
        .iter()
        .find_map(|key| record.get(*key).and_then(render_identity))
        .unwrap_or_default()
}

fn render_identity(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
