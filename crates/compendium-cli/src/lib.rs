#![forbid(unsafe_code)]

mod helpers;
mod validation;

use clap::{error::ErrorKind, ArgAction, Args, Parser, Subcommand};
use compendium_core::{
    env_path_or, resolve_log_level, ErrorCode, ExitCode, MachineError, ENV_COMPENDIUM_LOG_JSON,
    ENV_COMPENDIUM_LOG_LEVEL, ENV_COMPENDIUM_OUTPUT_ROOT, ENV_COMPENDIUM_REPORTS_DIR,
    ENV_COMPENDIUM_RUN_DIR,
};
use compendium_ingest::{
    ingest_run, IngestOptions, DEFAULT_OUTPUT_ROOT, DEFAULT_REPORTS_DIR, DEFAULT_RUN_DIR,
};
use compendium_model::{CategoryPolicy, TimestampPolicy};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::EnvFilter;

use helpers::{emit_ok, env_bool};

pub use validation::{
    validate_compendiums, ValidateOptions, ValidationOutcome, DEFAULT_SAMPLE_SIZE,
};

const COMPENDIUM_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
Usage: {usage}

Options:
{options}

Commands:
{subcommands}
{after-help}";

#[derive(Parser)]
#[command(name = "compendium")]
#[command(version)]
#[command(about = "Compendium ingestion and validation CLI")]
#[command(help_template = COMPENDIUM_HELP_TEMPLATE)]
#[command(
    after_help = "Environment:\n  COMPENDIUM_RUN_DIR       Directory scanned for manifests\n  COMPENDIUM_OUTPUT_ROOT   Root of the per-source stores\n  COMPENDIUM_REPORTS_DIR   Ledger and validation report directory\n  COMPENDIUM_LOG_LEVEL     Log verbosity override\n  COMPENDIUM_LOG_JSON      Emit logs as JSON lines"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true, default_value_t = false)]
    trace: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one store per source and write the ledger and run index.
    Ingest {
        #[command(flatten)]
        paths: PathArgs,
        /// Directory that relative manifest paths are resolved against.
        #[arg(long)]
        base_dir: Option<PathBuf>,
        /// Extra `source=Category` pairs, comma separated.
        #[arg(long, default_value = "")]
        categories: String,
        /// Stamp the run index with the current time instead of the fixed epoch.
        #[arg(long, default_value_t = false)]
        wall_clock: bool,
    },
    /// Compare produced stores with their manifests.
    Validate {
        #[command(flatten)]
        paths: PathArgs,
        #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        sample_size: usize,
        /// Exit non-zero when any source is not consistent.
        #[arg(long, default_value_t = false)]
        fail_on_mismatch: bool,
    },
    PrintConfig {
        #[command(flatten)]
        paths: PathArgs,
    },
    Version,
}

#[derive(Args, Clone, Default)]
struct PathArgs {
    #[arg(long)]
    run_dir: Option<PathBuf>,
    #[arg(long)]
    output_root: Option<PathBuf>,
    #[arg(long)]
    reports_dir: Option<PathBuf>,
}

struct ResolvedPaths {
    run_dir: PathBuf,
    output_root: PathBuf,
    reports_dir: PathBuf,
}

impl PathArgs {
    fn resolve(self) -> ResolvedPaths {
        ResolvedPaths {
            run_dir: env_path_or(self.run_dir, ENV_COMPENDIUM_RUN_DIR, DEFAULT_RUN_DIR),
            output_root: env_path_or(
                self.output_root,
                ENV_COMPENDIUM_OUTPUT_ROOT,
                DEFAULT_OUTPUT_ROOT,
            ),
            reports_dir: env_path_or(
                self.reports_dir,
                ENV_COMPENDIUM_REPORTS_DIR,
                DEFAULT_REPORTS_DIR,
            ),
        }
    }
}

#[derive(Clone, Copy)]
struct LogFlags {
    quiet: bool,
    verbose: u8,
    trace: bool,
}

#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run() -> Result<(), MachineError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(
                    MachineError::new(ErrorCode::UsageError, "invalid command line arguments")
                        .with_detail("error", err.to_string()),
                );
            }
        },
    };
    let output_mode = OutputMode { json: cli.json };
    let log_flags = LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
    };
    let command = cli
        .command
        .ok_or_else(|| MachineError::new(ErrorCode::UsageError, "missing command; see --help"))?;
    init_tracing(log_flags);

    match command {
        Commands::Ingest {
            paths,
            base_dir,
            categories,
            wall_clock,
        } => run_ingest(
            IngestCliArgs {
                paths: paths.resolve(),
                base_dir,
                categories,
                wall_clock,
            },
            output_mode,
        ),
        Commands::Validate {
            paths,
            sample_size,
            fail_on_mismatch,
        } => run_validate(paths.resolve(), sample_size, fail_on_mismatch, output_mode),
        Commands::PrintConfig { paths } => {
            print_config(paths.resolve(), log_flags, output_mode).map_err(output_failed)
        }
        Commands::Version => emit_ok(
            output_mode,
            json!({
                "name": "compendium",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        )
        .map_err(output_failed),
    }
}

/// Logs go to stderr so stdout carries only command payloads.
fn init_tracing(log_flags: LogFlags) {
    let filter = match resolve_log_level(log_flags.quiet, log_flags.verbose, log_flags.trace) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if env_bool(ENV_COMPENDIUM_LOG_JSON, false) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        eprintln!("tracing already initialised: {err}");
    }
}

struct IngestCliArgs {
    paths: ResolvedPaths,
    base_dir: Option<PathBuf>,
    categories: String,
    wall_clock: bool,
}

fn run_ingest(args: IngestCliArgs, output_mode: OutputMode) -> Result<(), MachineError> {
    let opts = IngestOptions {
        run_dir: args.paths.run_dir,
        output_root: args.paths.output_root,
        reports_dir: args.paths.reports_dir,
        base_dir: args.base_dir,
        categories: CategoryPolicy::default().with_overrides(&args.categories),
        timestamp_policy: if args.wall_clock {
            TimestampPolicy::WallClock
        } else {
            TimestampPolicy::DeterministicZero
        },
        ..IngestOptions::default()
    };
    let result = ingest_run(&opts).map_err(|e| {
        MachineError::new(ErrorCode::IngestFailed, e.to_string())
            .with_detail("run_dir", opts.run_dir.display().to_string())
    })?;
    emit_ok(
        output_mode,
        json!({
            "command": "ingest",
            "status": "ok",
            "packs": result.run_index.packs,
            "stored_total": result.stored_total(),
            "ledger": result.ledger_path,
            "ledger_entries": result.ledger_entries,
            "index": result.run_index_path,
            "skipped": result.skipped,
        }),
    )
    .map_err(output_failed)
}

fn run_validate(
    paths: ResolvedPaths,
    sample_size: usize,
    fail_on_mismatch: bool,
    output_mode: OutputMode,
) -> Result<(), MachineError> {
    let opts = ValidateOptions {
        output_root: paths.output_root,
        run_dir: paths.run_dir,
        reports_dir: paths.reports_dir,
        sample_size,
    };
    let outcome = validate_compendiums(&opts)
        .map_err(|message| MachineError::new(ErrorCode::ValidatorFailed, message))?;
    let consistent = outcome.report.is_consistent();
    emit_ok(
        output_mode,
        json!({
            "command": "validate",
            "status": if consistent { "ok" } else { "mismatch" },
            "report": outcome.report_path,
            "summary": outcome.report.summary,
        }),
    )
    .map_err(output_failed)?;
    if fail_on_mismatch && !consistent {
        return Err(
            MachineError::new(ErrorCode::StoreMismatch, "stores do not match manifests")
                .with_detail("report", outcome.report_path.display().to_string()),
        );
    }
    Ok(())
}

fn print_config(
    paths: ResolvedPaths,
    log_flags: LogFlags,
    output_mode: OutputMode,
) -> Result<(), String> {
    let defaults = IngestOptions::default();
    emit_ok(
        output_mode,
        json!({
            "run_dir": paths.run_dir,
            "output_root": paths.output_root,
            "reports_dir": paths.reports_dir,
            "categories": defaults.categories,
            "fallback_encodings": defaults.fallback_encodings,
            "timestamp_policy": defaults.timestamp_policy,
            "ledger_file_name": defaults.ledger_file_name,
            "sample_size": DEFAULT_SAMPLE_SIZE,
            "log_level": resolve_log_level(log_flags.quiet, log_flags.verbose, log_flags.trace),
            "log_level_env": ENV_COMPENDIUM_LOG_LEVEL,
            "log_json": env_bool(ENV_COMPENDIUM_LOG_JSON, false),
        }),
    )
}

fn output_failed(message: String) -> MachineError {
    MachineError::new(ErrorCode::OutputFailed, message)
}

fn emit_error(error: &MachineError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(error) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"output_failed\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.message);
    }
}
