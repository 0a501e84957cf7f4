//! Quaygate - build-pipeline quality gate CLI
//!
//! The `quaygate` command runs a suite of verification steps against a
//! workspace and reconciles their output into one pass/fail verdict.
//!
//! ## Commands
//!
//! - `run`: Execute a preset verification suite
//! - `steps`: List the builtin step catalog

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use quaygate_core::{
    full_gate, init_tracing, run_suite, verification_suite, write_report, BuiltinStep, ExecOptions,
    PresetConfig, ProcessExecutor, StepOptions, SuiteOptions, SuiteSpec, SuiteSummary,
};

#[derive(Parser)]
#[command(name = "quaygate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build-pipeline quality gate", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Unit tests then coverage
    Verify,
    /// Lint, type check, unit tests, coverage, dependency audit, doc lint
    Full,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a preset verification suite
    Run {
        /// Which preset to run
        #[arg(long, value_enum, default_value = "verify")]
        preset: Preset,

        /// Workspace directory the steps run in
        #[arg(long, default_value = ".")]
        cwd: PathBuf,

        /// Location of the structured test report written by the test runner
        #[arg(long, env = "QUAYGATE_REPORT_PATH")]
        report_path: Option<PathBuf>,

        /// Directory the coverage tool writes its artifacts to
        #[arg(long, env = "QUAYGATE_COVERAGE_DIR", default_value = "coverage")]
        coverage_dir: PathBuf,

        /// Run every step even after a failure
        #[arg(long)]
        run_all: bool,

        /// Per-step timeout in seconds (0 = no timeout)
        #[arg(long, default_value_t = 600)]
        timeout_secs: u64,

        /// Override a step command as name=command (repeatable)
        #[arg(long = "command", value_parser = parse_override)]
        overrides: Vec<(String, String)>,

        /// Write the suite report artifact to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the builtin step catalog
    Steps,
}

/// Parse a `name=command` override argument.
fn parse_override(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, command)) if !name.is_empty() && !command.is_empty() => {
            Ok((name.to_string(), command.to_string()))
        }
        _ => Err(format!("expected name=command, got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            preset,
            cwd,
            report_path,
            coverage_dir,
            run_all,
            timeout_secs,
            overrides,
            output,
        } => {
            cmd_run(
                preset,
                cwd,
                report_path,
                coverage_dir,
                run_all,
                timeout_secs,
                overrides,
                output,
                cli.verbose,
                cli.json,
            )
            .await
        }
        Commands::Steps => cmd_steps(),
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_run(
    preset: Preset,
    cwd: PathBuf,
    report_path: Option<PathBuf>,
    coverage_dir: PathBuf,
    run_all: bool,
    timeout_secs: u64,
    overrides: Vec<(String, String)>,
    output: Option<PathBuf>,
    verbose: bool,
    json: bool,
) -> Result<()> {
    let config = PresetConfig {
        report_path: report_path
            .unwrap_or_else(|| std::env::temp_dir().join("quaygate-test-report.json")),
        coverage_dir,
        command_overrides: overrides.into_iter().collect::<BTreeMap<_, _>>(),
    };

    let definitions = match preset {
        Preset::Verify => verification_suite(&config),
        Preset::Full => full_gate(&config),
    };

    let step_names: Vec<String> = definitions.iter().map(|d| d.name.clone()).collect();
    let spec = SuiteSpec::new(cwd.clone(), &step_names);

    let options = SuiteOptions {
        stop_on_failure: !run_all,
        step: StepOptions {
            verbose,
            exec: ExecOptions {
                cwd,
                env: BTreeMap::new(),
                timeout_secs,
            },
        },
    };

    let executor = ProcessExecutor;
    let summary = run_suite(&executor, &definitions, &options).await;

    if let Some(path) = output {
        write_report(&summary, &spec.steps_digest, &path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print_summary(&summary);
    }

    if !summary.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(summary: &SuiteSummary) {
    println!();
    for result in &summary.results {
        let status = if result.succeeded { "PASS" } else { "FAIL" };
        println!(
            "  {:<4} {:<20} {:>7.2}s",
            status, result.name, result.elapsed_secs
        );
        if let Some(error) = &result.error {
            println!("       {}", error);
        }
    }
    println!();
    println!(
        "  {} of {} step(s) passed in {:.2}s",
        summary.passed_steps,
        summary.total_steps,
        summary.duration_secs
    );
    if summary.unit_tests.total > 0 {
        println!(
            "  unit tests: {}/{}",
            summary.unit_tests.passed, summary.unit_tests.total
        );
    }
    if let Some(coverage) = summary.coverage_percent {
        println!("  coverage: {:.1}%", coverage);
    }
    if let Some(error) = &summary.first_error {
        println!("  first error: {}", error);
    }
    println!(
        "  verdict: {}",
        if summary.success { "PASS" } else { "FAIL" }
    );
}

fn cmd_steps() -> Result<()> {
    for step in BuiltinStep::all() {
        println!("  {:<18} {}", step.name(), step.default_command());
    }
    Ok(())
}
