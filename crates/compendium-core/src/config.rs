// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

pub const ENV_COMPENDIUM_RUN_DIR: &str = "COMPENDIUM_RUN_DIR";
pub const ENV_COMPENDIUM_OUTPUT_ROOT: &str = "COMPENDIUM_OUTPUT_ROOT";
pub const ENV_COMPENDIUM_REPORTS_DIR: &str = "COMPENDIUM_REPORTS_DIR";
pub const ENV_COMPENDIUM_LOG_LEVEL: &str = "COMPENDIUM_LOG_LEVEL";
pub const ENV_COMPENDIUM_LOG_JSON: &str = "COMPENDIUM_LOG_JSON";

/// Explicit value, then the environment variable, then `default`. Blank values are ignored.
#[must_use]
pub fn env_path_or(explicit: Option<PathBuf>, env_key: &str, default: &str) -> PathBuf {
    if let Some(path) = explicit {
        if !path.as_os_str().is_empty() {
            return path;
        }
    }
    if let Ok(value) = std::env::var(env_key) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(default)
}

#[must_use]
pub fn resolve_log_level(quiet: bool, verbose: u8, trace: bool) -> Option<String> {
    if trace {
        return Some("trace".to_string());
    }
    if verbose > 0 {
        return Some("debug".to_string());
    }
    if quiet {
        return Some("error".to_string());
    }
    std::env::var(ENV_COMPENDIUM_LOG_LEVEL)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_default() {
        let p = env_path_or(
            Some(PathBuf::from("x/y")),
            "COMPENDIUM_TEST_UNSET_KEY",
            "fallback",
        );
        assert_eq!(p, PathBuf::from("x/y"));
    }

    #[test]
    fn missing_env_falls_back_to_default() {
        let p = env_path_or(None, "COMPENDIUM_TEST_UNSET_KEY", "fallback");
        assert_eq!(p, PathBuf::from("fallback"));
    }

    #[test]
    fn cli_flags_override_log_level() {
        assert_eq!(resolve_log_level(true, 0, true).as_deref(), Some("trace"));
        assert_eq!(resolve_log_level(true, 2, false).as_deref(), Some("debug"));
        assert_eq!(resolve_log_level(true, 0, false).as_deref(), Some("error"));
    }
}
