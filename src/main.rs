#![deny(unsafe_code)]

mod common;
mod config;
mod input;
mod overlay;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "cad-cheatsheet")]
#[command(version)]
#[command(about = "Always-on-top CAD command cheat sheet", long_about = None)]
struct Cli {
    /// Configuration file to use instead of the per-user default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.unwrap_or_else(Config::path);
    overlay::run_overlay(config_path)
}
