//! flatmirror - mirror a project's important files into a flat directory.
//!
//! Usage:
//!   flatmirror [PATH]           Sync once, then watch for changes
//!   flatmirror sync [PATH]      Run one sync pass and exit
//!   flatmirror watch [PATH]     Sync once, then watch for changes
//!   flatmirror --help           Show help

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use flatmirror_core::{SyncConfig, SyncReport};
use flatmirror_engine::SyncEngine;

#[derive(Parser)]
#[command(
    name = "flatmirror",
    version,
    about = "Mirror a project's important files into a flat directory",
    long_about = "flatmirror copies the source, config, and mock-data files of a \
                  project tree into one flat directory and keeps that mirror in \
                  sync as the tree changes.\n\n\
                  Run `flatmirror [PATH]` to sync once and keep watching, or use \
                  `flatmirror sync` for a single pass."
)]
struct Cli {
    /// Source tree to mirror (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one sync pass and exit
    Sync {
        /// Source tree to mirror
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Destination directory name under the source root
        #[arg(short, long, default_value = "flat_mirror")]
        dest: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Sync once, then watch for changes until interrupted
    Watch {
        /// Source tree to mirror
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Destination directory name under the source root
        #[arg(short, long, default_value = "flat_mirror")]
        dest: String,

        /// Debounce window in milliseconds
        #[arg(long, default_value = "2000")]
        debounce_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Sync { path, dest, format }) => run_sync(&path, &dest, format),
        Some(Command::Watch {
            path,
            dest,
            debounce_ms,
        }) => run_watch(&path, &dest, debounce_ms),
        None => run_watch(&cli.path, "flat_mirror", 2000),
    }
}

/// Build an engine from CLI arguments.
fn build_engine(path: &Path, dest: &str, debounce_ms: u64) -> Result<SyncEngine> {
    let path = path.canonicalize().context("Invalid path")?;
    let config = SyncConfig::builder()
        .source_root(path)
        .dest_name(dest)
        .debounce_ms(debounce_ms)
        .build()
        .context("Invalid configuration")?;
    Ok(SyncEngine::new(config))
}

/// Run a single pass and print its report.
fn run_sync(path: &Path, dest: &str, format: OutputFormat) -> Result<()> {
    let engine = build_engine(path, dest, 2000)?;

    eprintln!("Syncing {}...", engine.config().source_root.display());
    let report = engine.sync_once().context("Sync failed")?;
    print_report(&report, format)
}

fn print_report(report: &SyncReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", report.stats);
            println!(
                " ({} copied, {} updated, {} unchanged, {} removed in {:.2}s)",
                report.stats.copied,
                report.stats.updated,
                report.stats.unchanged,
                report.stats.removed,
                report.duration.as_secs_f64()
            );
            if !report.warnings.is_empty() {
                println!(
                    "{} warning(s); the mirror may be incomplete",
                    report.warnings.len()
                );
                for warning in &report.warnings {
                    println!("  {}: {}", warning.path.display(), warning.message);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

/// Run the initial pass, then hand over to the watch loop until Ctrl-C.
fn run_watch(path: &Path, dest: &str, debounce_ms: u64) -> Result<()> {
    let engine = Arc::new(build_engine(path, dest, debounce_ms)?);

    eprintln!(
        "Initial sync of {}...",
        engine.config().source_root.display()
    );
    let report = engine.sync_once().context("Initial sync failed")?;
    print_report(&report, OutputFormat::Text)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    runtime.block_on(async {
        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_token.cancel();
            }
        });

        eprintln!("Watching for changes (Ctrl-C to stop)...");
        flatmirror_watch::watch(engine, shutdown).await
    })?;

    eprintln!("Watcher stopped.");
    Ok(())
}
