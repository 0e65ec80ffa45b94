// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hex prefix lengths tried in order before falling back to suffixed digests.
pub const ID_LENGTH_LADDER: [usize; 4] = [16, 20, 24, 32];
pub const ID_MAX_LEN: usize = 32;

pub const DEFAULT_CATEGORY: &str = "Item";
pub const DETERMINISTIC_ZERO_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Windows1252,
    Latin1,
}

impl TextEncoding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Windows1252 => "windows-1252",
            Self::Latin1 => "iso-8859-1",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    #[default]
    DeterministicZero,
    WallClock,
}

/// Maps a source name to the category label stored with each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryPolicy {
    pub by_source: BTreeMap<String, String>,
    pub fallback: String,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        let by_source = [
            ("foundry_journals.json", "JournalEntry"),
            ("monsters.json", "Actor"),
            ("spells.json", "Item"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            by_source,
            fallback: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl CategoryPolicy {
    #[must_use]
    pub fn category_for(&self, source: &str) -> &str {
        self.by_source
            .get(source)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Parses `source=Label,source2=Label2` overrides on top of the defaults.
    #[must_use]
    pub fn with_overrides(mut self, spec: &str) -> Self {
        for pair in spec.split(',') {
            let p = pair.trim();
            if p.is_empty() {
                continue;
            }
            if let Some((k, v)) = p.split_once('=') {
                let (k, v) = (k.trim(), v.trim());
                if !k.is_empty() && !v.is_empty() {
                    self.by_source.insert(k.to_string(), v.to_string());
                }
            }
        }
        self
    }
}
