use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};

mod cli;
mod config;
mod core;
mod error;

use cli::Cli;
use core::Engine;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    debug!("Starting makedoc v{}", env!("CARGO_PKG_VERSION"));

    let engine = Engine::new();
    cli.execute(engine)
}
