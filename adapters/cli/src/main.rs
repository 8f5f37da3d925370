#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Catacomb session.

mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use catacomb_config::ConfigStore;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use session::Session;

/// Runs the dungeon simulation without a window and reports what happened.
#[derive(Debug, Parser)]
#[command(name = "catacomb", version, long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for level generation; system entropy when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Milliseconds simulated per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Directory holding raw RGBA textures named after their texture key.
    #[arg(long, value_name = "DIR", default_value = "assets")]
    assets: PathBuf,
}

/// Entry point for the Catacomb command-line interface.
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let store = match &cli.config {
        Some(path) => ConfigStore::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ConfigStore::new(),
    };

    let mut session = Session::new(
        store,
        cli.seed,
        Duration::from_millis(cli.tick_ms),
        cli.assets,
    );
    let report = session.run(cli.ticks);
    info!(
        ticks = report.ticks,
        chunks = report.chunks,
        spawned = report.spawned,
        shots = report.shots,
        kills = report.kills,
        "session finished"
    );
    println!("{report}");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
