//! uifix - UI test remediation CLI
//!
//! Runs a VS Code extension's ExTester suite, classifies what failed and
//! asks a model for fixes, re-running tests to verify each one.
//!
//! ## Commands
//!
//! - `generate`: propose UI tests and write one file per proposal
//! - `fix-compilation`: run the suite and fix the first failure
//! - `fix-runtime`: run each test file and fix runtime failures
//! - `run-and-fix`: `fix-compilation` followed by `fix-runtime`
//! - `parse`: parse captured test output offline

mod config;
mod terminal;

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{info, Level};

use uifix_core::{
    classify, parse_failures, DefaultDestination, DestinationChooser, Orchestrator, UifixError,
    Workspace,
};
use uifix_openai::OpenAiClient;
use uifix_runner::{GlobDiscoverer, NpmTestExecutor};

use crate::config::Settings;
use crate::terminal::{FixedDestination, StdinDestination, TerminalProgress};

#[derive(Parser)]
#[command(name = "uifix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate, run and repair VS Code extension UI tests", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and JSON summaries
    #[arg(long, global = true)]
    json: bool,

    /// Extension workspace root (default: current directory)
    #[arg(short, long, global = true, env = "UIFIX_WORKSPACE")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propose UI tests for the extension and write them to disk
    Generate {
        /// Maximum number of proposals to write (non-positive = all)
        #[arg(long, allow_negative_numbers = true)]
        max_proposals: Option<f64>,
    },

    /// Run the whole suite and fix the first reported failure
    FixCompilation(FixArgs),

    /// Run each test file on its own and fix its runtime failures
    FixRuntime(FixArgs),

    /// Fix compilation issues, then runtime failures
    RunAndFix(FixArgs),

    /// Parse captured test output and print failures with their classification
    Parse {
        /// Output file to parse (default: stdin)
        input: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FixArgs {
    /// Workspace-relative path for fixes whose failure names no file
    #[arg(long)]
    destination: Option<String>,

    /// Never prompt; use the default destination when none is known
    #[arg(long)]
    no_input: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    uifix_core::init_tracing(cli.json, level);

    let command = match cli.command {
        Commands::Parse { input } => return cmd_parse(input.as_deref()),
        other => other,
    };

    let root = resolve_workspace(cli.workspace.as_deref())?;
    let settings = Settings::load(&root)?;
    info!(root = %root.display(), "workspace resolved");

    let ok = match command {
        Commands::Generate { max_proposals } => {
            let orchestrator = build_orchestrator(&root, &settings, max_proposals, None)?;
            let summary = orchestrator.generate_proposals().await?;
            print_summary(&summary, cli.json)?;
            summary.outcome == uifix_core::ProposalOutcome::Completed && summary.failed.is_empty()
        }
        Commands::FixCompilation(args) => {
            let orchestrator = build_orchestrator(&root, &settings, None, Some(&args))?;
            let summary = orchestrator.fix_compilation_issues().await?;
            print_summary(&summary, cli.json)?;
            summary.is_success()
        }
        Commands::FixRuntime(args) => {
            let orchestrator = build_orchestrator(&root, &settings, None, Some(&args))?;
            let summary = orchestrator.fix_runtime_failures().await?;
            print_summary(&summary, cli.json)?;
            summary.is_success()
        }
        Commands::RunAndFix(args) => {
            let orchestrator = build_orchestrator(&root, &settings, None, Some(&args))?;
            let summary = orchestrator.run_and_fix().await?;
            print_summary(&summary, cli.json)?;
            summary.compilation.is_success()
                && summary.runtime.as_ref().map(|r| r.is_success()).unwrap_or(false)
        }
        Commands::Parse { .. } => true,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn resolve_workspace(flag: Option<&Path>) -> Result<PathBuf> {
    let root = match flag {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    if !root.is_dir() {
        return Err(UifixError::NoWorkspace)
            .with_context(|| format!("{} is not a directory", root.display()));
    }
    root.canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))
}

fn chooser_for(args: Option<&FixArgs>) -> Arc<dyn DestinationChooser> {
    match args {
        Some(FixArgs {
            destination: Some(dest),
            ..
        }) => Arc::new(FixedDestination(dest.clone())),
        Some(FixArgs { no_input: false, .. }) if std::io::stdin().is_terminal() => {
            Arc::new(StdinDestination)
        }
        _ => Arc::new(DefaultDestination),
    }
}

fn build_orchestrator(
    root: &Path,
    settings: &Settings,
    max_proposals: Option<f64>,
    fix_args: Option<&FixArgs>,
) -> Result<Orchestrator> {
    let executor = NpmTestExecutor::new(root, settings.runner.clone());
    let discoverer = GlobDiscoverer::new(root, &settings.discovery)
        .context("Invalid [discovery] patterns")?;
    let generator =
        OpenAiClient::new(settings.openai.clone()).context("Failed to build OpenAI client")?;

    Ok(Orchestrator::new(
        Workspace::new(root),
        Arc::new(executor),
        Arc::new(discoverer),
        Arc::new(generator),
    )
    .with_config(settings.repair_config(max_proposals))
    .with_progress(Arc::new(TerminalProgress))
    .with_chooser(chooser_for(fix_args)))
}

fn print_summary<S>(summary: &S, json: bool) -> Result<()>
where
    S: Serialize + std::fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn cmd_parse(input: Option<&Path>) -> Result<ExitCode> {
    let output = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let parsed = parse_failures(&output);
    let report: Vec<_> = parsed
        .failures
        .iter()
        .map(|failure| {
            let classification = classify(failure);
            json!({
                "failure": failure,
                "classification": classification,
                "remediation": classification.remediation(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}
