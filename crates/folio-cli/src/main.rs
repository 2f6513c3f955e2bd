// crates/folio-cli/src/main.rs
// ============================================================================
// Module: Folio CLI Entry Point
// Description: Command dispatcher for payload validation workflows.
// Purpose: Validate catalog payloads and single references from the shell.
// Dependencies: clap, folio-core, folio-config, folio-store-sqlite, serde, thiserror.
// ============================================================================

//! ## Overview
//! The `folio` binary validates catalog payloads against the conditional
//! record schema, checks single entity references, and checks configuration.
//! Exit codes: `0` valid, `1` invalid, `2` usage or runtime error. All
//! user-facing strings are routed through the message catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use folio_cli::t;
use folio_config::AuditConfig;
use folio_config::AuditMode;
use folio_config::FolioConfig;
use folio_config::LookupConfig;
use folio_config::LookupMode;
use folio_core::AllowListLookup;
use folio_core::FileAuditSink;
use folio_core::NoopAuditSink;
use folio_core::PayloadValidator;
use folio_core::ReferenceCheckError;
use folio_core::ReferenceConstraint;
use folio_core::ReferenceLookup;
use folio_core::ReferenceSet;
use folio_core::StderrAuditSink;
use folio_core::ValidationAuditSink;
use folio_store_sqlite::SqliteReferenceStore;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Argument value selecting stdin instead of a file.
const STDIN_ARG: &str = "-";
/// Exit code for a payload that violates the schema.
const EXIT_INVALID: u8 = 1;
/// Exit code for usage and runtime failures.
const EXIT_ERROR: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "folio", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a JSON payload.
    Validate(ValidateCommand),
    /// Single-reference utilities.
    Reference {
        /// Selected reference subcommand.
        #[command(subcommand)]
        command: ReferenceCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `validate` command.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Payload file path, or `-` for stdin.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Optional config file path (defaults to folio.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Reference subcommands.
#[derive(Subcommand, Debug)]
enum ReferenceCommand {
    /// Check whether a value names an existing entity.
    Check(ReferenceCheckCommand),
}

/// Configuration for the `reference check` command.
#[derive(Args, Debug)]
struct ReferenceCheckCommand {
    /// Reference set to check against.
    #[arg(long, value_enum)]
    set: SetArg,
    /// Candidate id as JSON (e.g. `42`, `null`, `"42"`).
    #[arg(long, value_name = "JSON", allow_hyphen_values = true)]
    value: String,
    /// Optional config file path (defaults to folio.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a folio configuration file.
    Check(ConfigCheckCommand),
}

/// Configuration for the `config check` command.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to folio.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Reference set argument values.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum SetArg {
    /// Entities referenced by `zzz`.
    Zzz,
    /// Entities referenced by `yyy`.
    Yyy,
}

impl From<SetArg> for ReferenceSet {
    fn from(value: SetArg) -> Self {
        match value {
            SetArg::Zzz => Self::Zzz,
            SetArg::Yyy => Self::Yyy,
        }
    }
}

/// JSON report printed by `reference check`.
#[derive(Debug, Serialize)]
struct ReferenceReport<'a> {
    /// Reference set name.
    set: &'static str,
    /// Value that was checked.
    value: &'a Value,
    /// True when the value passed the constraint.
    valid: bool,
    /// Lookup strategy label.
    lookup: &'static str,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        let mut command = Cli::command();
        command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Reference {
            command: ReferenceCommand::Check(command),
        } => command_reference_check(&command),
        Commands::Config {
            command: ConfigCommand::Check(command),
        } => command_config_check(&command),
    }
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Validates one payload and prints the result.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let payload = read_payload(&command.input, config.limits.max_payload_bytes)?;
    let validator = build_validator(&config)?;
    let result = validator
        .validate(&payload)
        .map_err(|err| CliError::new(t!("validate.lookup_failed", error = err)))?;
    write_json(&result)?;
    if result.is_valid { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::from(EXIT_INVALID)) }
}

/// Builds the validator for the configured lookup and audit sink.
fn build_validator(config: &FolioConfig) -> CliResult<PayloadValidator> {
    let validator = PayloadValidator::new().with_audit(build_audit_sink(&config.audit)?);
    Ok(match ConfiguredLookup::open(&config.lookup)? {
        ConfiguredLookup::None => validator,
        ConfiguredLookup::AllowList(lookup) => validator.with_lookup(lookup),
        ConfiguredLookup::Sqlite(store) => validator.with_lookup(store),
    })
}

/// Builds the audit sink selected by configuration.
fn build_audit_sink(config: &AuditConfig) -> CliResult<Arc<dyn ValidationAuditSink>> {
    match (config.mode, config.path.as_deref()) {
        (AuditMode::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditMode::File, Some(path)) => {
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| CliError::new(t!("audit.open_failed", path = path, error = err)))?;
            Ok(Arc::new(sink))
        }
        (AuditMode::Off | AuditMode::File, _) => Ok(Arc::new(NoopAuditSink)),
    }
}

// ============================================================================
// SECTION: Reference Command
// ============================================================================

/// Checks one candidate id against the configured lookup.
fn command_reference_check(command: &ReferenceCheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let value: Value = serde_json::from_str(&command.value)
        .map_err(|err| CliError::new(t!("reference.value_invalid", error = err)))?;
    let set = ReferenceSet::from(command.set);
    let lookup = ConfiguredLookup::open(&config.lookup)?;
    let empty = AllowListLookup::new();
    let resolver = lookup.as_lookup().unwrap_or(&empty);
    let valid = ReferenceConstraint::new(set, resolver).check(&value).map_err(
        |err: ReferenceCheckError| CliError::new(t!("reference.check_failed", error = err)),
    )?;
    write_json(&ReferenceReport {
        set: set.as_str(),
        value: &value,
        valid,
        lookup: lookup.label(),
    })?;
    if valid { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::from(EXIT_INVALID)) }
}

/// Lookup strategy opened from configuration.
enum ConfiguredLookup {
    /// No reference checks.
    None,
    /// In-memory allow-lists.
    AllowList(AllowListLookup),
    /// `SQLite` reference store.
    Sqlite(SqliteReferenceStore),
}

impl ConfiguredLookup {
    /// Opens the lookup selected by `config`.
    fn open(config: &LookupConfig) -> CliResult<Self> {
        match (config.mode, &config.allow_list, &config.sqlite) {
            (LookupMode::AllowList, Some(lists), _) => Ok(Self::AllowList(lists.to_lookup())),
            (LookupMode::Sqlite, _, Some(store_config)) => {
                SqliteReferenceStore::new(store_config.clone()).map(Self::Sqlite).map_err(|err| {
                    CliError::new(t!(
                        "lookup.open_failed",
                        path = store_config.path.display(),
                        error = err
                    ))
                })
            }
            _ => Ok(Self::None),
        }
    }

    /// Returns the lookup as a trait object, if any.
    fn as_lookup(&self) -> Option<&dyn ReferenceLookup> {
        match self {
            Self::None => None,
            Self::AllowList(lookup) => Some(lookup),
            Self::Sqlite(store) => Some(store),
        }
    }

    /// Returns the strategy label.
    fn label(&self) -> &'static str {
        self.as_lookup().map_or("none", |lookup| lookup.strategy())
    }
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Loads configuration and reports the effective settings.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let source = config
        .source
        .as_ref()
        .map_or_else(|| t!("config.check.defaults"), |path| path.display().to_string());
    write_stdout_line(&t!(
        "config.check.ok",
        lookup = config.lookup.mode.as_str(),
        audit = config.audit.mode.as_str(),
        source = source
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration using the default resolution rules.
fn load_config(path: Option<&Path>) -> CliResult<FolioConfig> {
    FolioConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded reads.
#[derive(Debug)]
enum ReadLimitError {
    /// I/O failure.
    Io(std::io::Error),
    /// Input size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_reader_with_limit(file, max_bytes)
}

/// Reads a stream while enforcing a hard size limit.
fn read_reader_with_limit(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(read_limit).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads and parses the payload from a file or stdin.
fn read_payload(input: &Path, max_bytes: usize) -> CliResult<Value> {
    let kind = t!("input.kind.payload");
    let (label, bytes) = if input.as_os_str() == STDIN_ARG {
        let label = t!("input.stdin");
        (label, read_reader_with_limit(std::io::stdin().lock(), max_bytes))
    } else {
        (input.display().to_string(), read_bytes_with_limit(input, max_bytes))
    };
    let bytes = bytes.map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = label, error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = label,
            size = size,
            limit = limit
        )),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = label, error = err))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("validate.serialize_failed", error = err)))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns the error exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_ERROR)
}
