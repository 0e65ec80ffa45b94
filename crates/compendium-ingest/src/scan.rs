// SPDX-License-Identifier: Apache-2.0

use compendium_model::SourceManifest;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredManifest {
    pub source: String,
    pub path: PathBuf,
    pub manifest: SourceManifest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// Lazy walk over `manifest_*.json` files in sorted path order. Each call to
/// [`scan_manifests`] re-reads the filesystem.
pub struct ManifestScan {
    walker: walkdir::IntoIter,
}

#[must_use]
pub fn scan_manifests(root: &Path) -> ManifestScan {
    ManifestScan {
        walker: WalkDir::new(root).sort_by_file_name().into_iter(),
    }
}

impl Iterator for ManifestScan {
    type Item = Result<DiscoveredManifest, ScanFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(ScanFailure {
                        path: e.path().map(Path::to_path_buf),
                        reason: e.to_string(),
                    }))
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let is_manifest = entry
                .file_name()
                .to_str()
                .is_some_and(SourceManifest::is_manifest_file_name);
            if !is_manifest {
                continue;
            }
            return Some(read_manifest(entry.path()));
        }
    }
}

pub fn read_manifest(path: &Path) -> Result<DiscoveredManifest, ScanFailure> {
    let failure = |reason: String| ScanFailure {
        path: Some(path.to_path_buf()),
        reason,
    };
    let raw = fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
    let manifest: SourceManifest =
        serde_json::from_str(&raw).map_err(|e| failure(format!("invalid manifest json: {e}")))?;
    Ok(DiscoveredManifest {
        source: source_name(path),
        path: path.to_path_buf(),
        manifest,
    })
}

/// The manifest's parent directory name, or its file stem when the parent is unnamed.
#[must_use]
pub fn source_name(manifest_path: &Path) -> String {
    manifest_path
        .parent()
        .and_then(Path::file_name)
        .or_else(|| manifest_path.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Relative manifest paths are taken against `base_dir`, or the working directory when unset.
#[must_use]
pub fn resolve_manifest_file(base_dir: Option<&Path>, declared: &str) -> PathBuf {
    let declared_path = Path::new(declared);
    match base_dir {
        Some(base) if declared_path.is_relative() => base.join(declared_path),
        _ => declared_path.to_path_buf(),
    }
}
