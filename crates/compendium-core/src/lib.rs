// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod canonical;
mod config;
mod error;

use sha2::{Digest, Sha256};

pub const CRATE_NAME: &str = "compendium-core";

pub use config::{
    env_path_or, resolve_log_level, ENV_COMPENDIUM_LOG_JSON, ENV_COMPENDIUM_LOG_LEVEL,
    ENV_COMPENDIUM_OUTPUT_ROOT, ENV_COMPENDIUM_REPORTS_DIR, ENV_COMPENDIUM_RUN_DIR,
};
pub use error::{ErrorCode, ExitCode, MachineError};

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Lowercase hex test used by both the assigner's tests and the validator.
#[must_use]
pub fn is_lowercase_hex(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
