//! Release publisher entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse arguments** with `clap`; a missing required argument exits
//!    before any work begins.
//! 2. **Wire observability**: `tracing-subscriber` with human-readable or JSON
//!    output, plus an OTLP span exporter when one is configured.
//! 3. **Load configuration** from `.publisher/config.toml` (or `--config`)
//!    and `GH_TOKEN`, and validate it.
//! 4. **Construct infrastructure** (`GithubClient`, `FileManifestEditor`,
//!    `GitCommitter`, `GradleRunner`) and inject it into a `Publisher`.
//! 5. **Run** the selected workflow and, with `--json`, print the run report
//!    to stdout.

mod config;
mod observability;
mod observers;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use github::GithubClient;
use pipeline::{IssueNumber, VersionName};
use toolchain::{FileManifestEditor, GitCommitter, GradleRunner};
use workflow::{Ports, Publisher, RunReport, WorkflowKind};

#[derive(Debug, Parser)]
#[command(name = "release-publisher")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bump, build, and publish Android releases to GitHub", long_about = None)]
struct Cli {
    /// Repository checkout to operate on
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Config file (default: <repo>/.publisher/config.toml, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON log lines and print the run report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a test release for an issue and comment on it
    Prerelease {
        /// Issue number, e.g. 812 or #812
        issue: IssueNumber,
    },

    /// Build and publish a store release for a version
    Release {
        /// Version name, e.g. 3.0.0
        version: VersionName,
    },

    /// Increment the build counter and commit the manifest, without building
    Bump {
        /// New version name (default: keep the manifest's)
        version: Option<VersionName>,
    },
}

impl Command {
    fn workflow(&self) -> WorkflowKind {
        match self {
            Command::Prerelease { issue } => WorkflowKind::PreRelease(*issue),
            Command::Release { version } => WorkflowKind::FinalRelease(*version),
            Command::Bump { version } => WorkflowKind::VersionBump(*version),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match observability::init(cli.json, cli.verbose) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(&cli).await {
        Ok(report) => {
            if report.has_warnings() {
                warn!("run completed with warnings");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("run failed: {e:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(cli: &Cli) -> Result<RunReport> {
    let token = std::env::var(config::TOKEN_ENV).ok();
    let config = config::load(&cli.repo, cli.config.as_deref(), token)?;

    let github = Arc::new(GithubClient::new(&config.github).context("cannot create GitHub client")?);
    let ports = Ports {
        variables: github.clone(),
        issues: github.clone(),
        pull_requests: github.clone(),
        releases: github,
        manifest: Arc::new(FileManifestEditor::for_syntax(
            config.versioning.manifest_syntax,
        )),
        vcs: Arc::new(GitCommitter::new(&config)),
        build: Arc::new(GradleRunner::new(&config)),
    };

    let publisher = Publisher::new(config, ports)
        .with_output_observer(observers::build_output())
        .with_progress_observer(observers::upload_progress());

    let kind = cli.command.workflow();
    let report = publisher
        .run(kind)
        .await
        .with_context(|| format!("{} failed", kind.name()))?;

    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    }
    Ok(report)
}
