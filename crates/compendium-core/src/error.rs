use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Process exit status of the `compendium` binary.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    StoreMismatch = 3,
    PipelineFailure = 4,
    Output = 10,
}

/// Machine-readable failure kinds reported on stderr under `--json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Bad arguments or a missing subcommand.
    UsageError,
    /// The run directory, output root, a ledger or the run index could not be handled.
    IngestFailed,
    /// The validator could not read its inputs or write its report.
    ValidatorFailed,
    /// `--fail-on-mismatch` and at least one store disagrees with its manifests.
    StoreMismatch,
    /// A command payload could not be encoded or printed.
    OutputFailed,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UsageError => "usage_error",
            Self::IngestFailed => "ingest_failed",
            Self::ValidatorFailed => "validator_failed",
            Self::StoreMismatch => "store_mismatch",
            Self::OutputFailed => "output_failed",
        }
    }

    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        match self {
            Self::UsageError => ExitCode::Usage,
            Self::StoreMismatch => ExitCode::StoreMismatch,
            Self::IngestFailed | Self::ValidatorFailed => ExitCode::PipelineFailure,
            Self::OutputFailed => ExitCode::Output,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl MachineError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        self.code.exit_code()
    }
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for MachineError {}
