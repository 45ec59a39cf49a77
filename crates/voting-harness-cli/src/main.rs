// crates/voting-harness-cli/src/main.rs
// ============================================================================
// Module: Voting Harness CLI Entry Point
// Description: Command dispatcher for harness runs and configuration display.
// Purpose: Resolve settings, run the suites, and map the verdict to an exit code.
// Dependencies: clap, serde_json, thiserror, tokio, tracing-subscriber, voting-harness
// ============================================================================

//! ## Overview
//! `voting-harness run` resolves configuration (defaults, then `--config`,
//! then environment, then flags), installs logging on stderr, runs the
//! selected suites, prints one line per step and cleanup action to stdout,
//! writes artifacts when an artifacts root is configured, and exits 0 only
//! when the run passed. `voting-harness config` prints the resolved
//! configuration as JSON.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use voting_harness::Harness;
use voting_harness::HarnessConfig;
use voting_harness::NamespaceMode;
use voting_harness::RunReport;
use voting_harness::StepOutcome;
use voting_harness::SuiteId;
use voting_harness::VoteValueMode;
use voting_harness::report::CleanupOutcome;
use voting_harness::write_artifacts;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "voting-harness", version, disable_help_subcommand = true)]
struct Cli {
    /// Increase log verbosity (`-v` info, `-vv` debug, `-vvv` trace); `RUST_LOG` wins.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the integration suites against the voting platform.
    Run(RunCommand),
    /// Print the resolved configuration as JSON.
    Config(ConfigCommand),
}

/// Settings shared by every subcommand. Flags override file and environment.
#[derive(Args, Debug, Default)]
struct SettingsArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds.
    #[arg(long, value_name = "N")]
    timeout_secs: Option<u64>,
    /// Fixture namespace: `fixed`, `per-run`, or an explicit base.
    #[arg(long, value_name = "MODE")]
    namespace: Option<NamespaceMode>,
    /// Vote value interpretation: `option-id` or `option-index`.
    #[arg(long, value_name = "MODE")]
    vote_value: Option<VoteValueMode>,
    /// Wait up to N seconds for every service health check before running.
    #[arg(long, value_name = "N")]
    ready_timeout_secs: Option<u64>,
    /// Root directory for run artifacts.
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Configuration overrides.
    #[command(flatten)]
    settings: SettingsArgs,
    /// Suite to run; repeat to select several. All suites run when omitted.
    #[arg(long = "suite", value_name = "SUITE")]
    suites: Vec<SuiteId>,
}

/// Arguments for `config`.
#[derive(Args, Debug)]
struct ConfigCommand {
    /// Configuration overrides.
    #[command(flatten)]
    settings: SettingsArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a display-ready message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
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
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::Config(command) => command_config(&command),
    }
}

/// Installs the stderr log subscriber.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command.settings)?;
    let harness = Harness::from_config(config).map_err(|err| CliError::new(err.to_string()))?;
    let report = harness.run(&command.suites).await;
    for line in summary_lines(&report) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error(&err)))?;
    }
    if let Some(root) = &harness.config().run_root {
        let dir = write_artifacts(root, &report, &harness.transcript())
            .map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("artifacts: {}", dir.display()))
            .map_err(|err| CliError::new(output_error(&err)))?;
    }
    Ok(if report.passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Executes the `config` command.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command.settings)?;
    let rendered = serde_json::to_string_pretty(&config.describe())
        .map_err(|err| CliError::new(format!("failed to render configuration: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error(&err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Loads file and environment settings, then applies flag overrides.
fn resolve_config(settings: &SettingsArgs) -> CliResult<HarnessConfig> {
    let mut config = HarnessConfig::load(settings.config.as_deref())
        .map_err(|err| CliError::new(format!("configuration error: {err}")))?;
    apply_overrides(&mut config, settings)?;
    tracing::debug!(config = %config.describe(), "configuration resolved");
    Ok(config)
}

/// Applies command-line overrides on top of a resolved configuration.
fn apply_overrides(config: &mut HarnessConfig, settings: &SettingsArgs) -> CliResult<()> {
    if let Some(secs) = settings.timeout_secs {
        config.timeout = positive_seconds("--timeout-secs", secs)?;
    }
    if let Some(namespace) = settings.namespace {
        config.namespace = namespace;
    }
    if let Some(vote_value) = settings.vote_value {
        config.vote_value = vote_value;
    }
    if let Some(secs) = settings.ready_timeout_secs {
        config.ready_timeout = Some(positive_seconds("--ready-timeout-secs", secs)?);
    }
    if let Some(dir) = &settings.artifacts {
        config.run_root = Some(dir.clone());
    }
    Ok(())
}

/// Rejects zero-second timeouts.
fn positive_seconds(flag: &str, secs: u64) -> CliResult<Duration> {
    if secs == 0 {
        return Err(CliError::new(format!("{flag} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Renders one line per step and cleanup action plus the final verdict.
fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    for suite in &report.suites {
        for step in &suite.steps {
            let line = match &step.outcome {
                StepOutcome::Failed {
                    message,
                } => format!("[{}] {}: failed: {message}", suite.suite, step.name),
                other => format!("[{}] {}: {}", suite.suite, step.name, other.label()),
            };
            lines.push(line);
        }
        for entry in &suite.cleanup {
            let outcome = match &entry.outcome {
                CleanupOutcome::Deleted => "deleted".to_string(),
                CleanupOutcome::Failed {
                    message,
                } => format!("FAILED: {message}"),
            };
            lines.push(format!("[{}] cleanup {} ({}): {outcome}", suite.suite, entry.fixture, entry.id));
        }
    }
    if let Some(fatal) = &report.fatal {
        lines.push(format!("fatal: {fatal}"));
    }
    if !report.not_run.is_empty() {
        let names: Vec<&str> = report.not_run.iter().map(|suite| suite.as_str()).collect();
        lines.push(format!("not run: {}", names.join(", ")));
    }
    let (passed, failed, skipped) = report.step_counts();
    let verdict = if report.passed { "PASS" } else { "FAIL" };
    lines.push(format!(
        "verdict: {verdict} ({passed} passed, {failed} failed, {skipped} skipped, {} cleanup \
         failures)",
        report.cleanup_failures()
    ));
    lines
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a stdout write failure.
fn output_error(error: &std::io::Error) -> String {
    format!("failed to write to stdout: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
