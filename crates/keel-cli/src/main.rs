#![forbid(unsafe_code)]

mod cmd;
mod events_file;
mod output;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use keel_core::{EventStore, StoreConfig};
use output::OutputMode;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "keel: event-sourced projection engine for strategy dashboards",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Event log fixture to load (JSON Lines).
    #[arg(long, global = true)]
    events: Option<PathBuf>,

    /// Config file (defaults to ./keel.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Generate a demonstration event log",
        after_help = "EXAMPLES:\n    # Print the fixture to stdout\n    keel seed\n\n    # Write it to a file\n    keel seed --out events.jsonl"
    )]
    Seed(cmd::seed::SeedArgs),

    #[command(
        about = "Show one projection slice",
        after_help = "EXAMPLES:\n    # List teams from a fixture\n    keel --events events.jsonl show teams\n\n    # One kanban board, as JSON\n    keel --events events.jsonl show kanban --board board-product --json\n\n    # Catalog including tombstoned rows\n    keel --events events.jsonl show initiatives --include-deleted"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        about = "Report event counts and cache states",
        after_help = "EXAMPLES:\n    keel --events events.jsonl stats --json"
    )]
    Stats,

    #[command(
        about = "Verify that live projections match a full replay",
        after_help = "EXAMPLES:\n    keel --events events.jsonl check"
    )]
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mode = cli.output_mode();
    match &cli.command {
        Commands::Seed(args) => cmd::seed::run_seed(args),
        Commands::Show(args) => {
            let store = build_store(&cli)?;
            cmd::show::run_show(&store, args, mode)
        }
        Commands::Stats => {
            let store = build_store(&cli)?;
            cmd::stats::run_stats(&store, mode)
        }
        Commands::Check => {
            let store = build_store(&cli)?;
            if cmd::check::run_check(&store, mode)? {
                Ok(())
            } else {
                std::process::exit(1)
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Resolve configuration: explicit flag, then `./keel.toml`, then the user
/// config directory, then defaults.
fn resolve_config(flag: Option<&PathBuf>) -> Result<StoreConfig> {
    if let Some(path) = flag {
        return StoreConfig::load(path);
    }
    let local = PathBuf::from("keel.toml");
    if local.exists() {
        return StoreConfig::load(&local);
    }
    if let Some(dir) = dirs::config_dir() {
        let user = dir.join("keel").join("config.toml");
        if user.exists() {
            return StoreConfig::load(&user);
        }
    }
    Ok(StoreConfig::default())
}

/// Build a store and replay the fixture through the live append path.
fn build_store(cli: &Cli) -> Result<EventStore> {
    let config = resolve_config(cli.config.as_ref()).context("load configuration")?;
    let store = EventStore::with_config(config);

    if let Some(path) = &cli.events {
        let events = events_file::load(path)?;
        if !events.is_empty() {
            let stats = store.append(events).map_err(|e| {
                let hint = e.code().hint().unwrap_or_default();
                anyhow!("invalid event log: {e} [{}] {hint}", e.code())
            })?;
            if stats.handler_errors > 0 {
                tracing::warn!(
                    errors = stats.handler_errors,
                    "some projections fell behind while loading; run `keel check`"
                );
            }
        }
    }

    Ok(store)
}
