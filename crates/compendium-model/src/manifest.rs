// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::serde_helpers::lenient_count;

pub const MANIFEST_FILE_PREFIX: &str = "manifest_";
pub const MANIFEST_FILE_SUFFIX: &str = ".json";

/// One source's manifest. Extra top-level keys written by the splitter are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub struct SourceManifest {
    #[serde(default)]
    pub files: Vec<ManifestFileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub struct ManifestFileEntry {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub items: u64,
}

impl ManifestFileEntry {
    #[must_use]
    pub fn new(file: impl Into<String>, items: u64) -> Self {
        Self {
            file: Some(file.into()),
            items,
        }
    }
}

impl SourceManifest {
    #[must_use]
    pub fn new(files: Vec<ManifestFileEntry>) -> Self {
        Self { files }
    }

    /// Sum of declared per-file item counts.
    #[must_use]
    pub fn declared_total(&self) -> u64 {
        self.files.iter().map(|f| f.items).sum()
    }

    #[must_use]
    pub fn is_manifest_file_name(name: &str) -> bool {
        name.starts_with(MANIFEST_FILE_PREFIX) && name.ends_with(MANIFEST_FILE_SUFFIX)
    }
}
