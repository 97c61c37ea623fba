//! Catpoint control panel
//!
//! # Usage
//! ```bash
//! catpoint [--config catpoint.toml] [--store catpoint.json] [--verbose] <COMMAND>
//! catpoint sensor add "Front Door" door
//! catpoint arm home
//! catpoint scan camera.jpg
//! catpoint panel
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use catpoint_core::{CatpointConfig, SecurityService};

mod commands;
mod panel;

use commands::Commands;
use panel::ConsoleStatusListener;

/// Catpoint - home security panel with cat detection
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Security store location, overrides the configuration
    #[arg(short, long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CatpointConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => CatpointConfig::default(),
    };
    if let Some(store) = cli.store {
        config = config.with_store_path(store);
    }
    config.validate()?;

    init_tracing(&config, cli.verbose);

    let repository = config
        .open_repository()
        .with_context(|| format!("failed to open store {}", config.store_path.display()))?;
    let analyzer = config.build_analyzer()?;
    tracing::debug!(
        "Store {} opened, cat probability {}",
        config.store_path.display(),
        analyzer.cat_probability()
    );

    let mut service = SecurityService::new(repository, analyzer);
    service.add_status_listener(Arc::new(ConsoleStatusListener));

    match cli.command {
        Commands::Panel => {
            let stdin = std::io::stdin();
            panel::run(&mut service, stdin.lock())?;
        }
        command => commands::execute(&mut service, command)?,
    }

    Ok(())
}

fn init_tracing(config: &CatpointConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}
