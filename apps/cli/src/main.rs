//! ExecScout CLI: find the people behind small-business websites.
//!
//! Reads saved company pages, runs the discovery pipeline, and prints
//! executive profiles with a company quality grade as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
