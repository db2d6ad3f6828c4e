mod cli;
mod commands;

use anyhow::Result;
use parcelmap::{DashboardConfig, DatasetCache};
use tracing_subscriber::{fmt, EnvFilter};

use cli::{Cli, Commands};
use commands::{home, lookup, status, subset};

/// Logs go to stderr so stdout carries only JSON.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (if any), then command-line / environment overrides.
fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_yaml_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(parcels) = &cli.parcels {
        config.sources.parcels = parcels.clone();
    }
    if let Some(assessments) = &cli.assessments {
        config.sources.assessments = assessments.clone();
    }
    Ok(config)
}

pub fn run() -> Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let cache = DatasetCache::from_config(config.sources.clone());

    match &cli.command {
        Commands::Lookup(args) => lookup::run(&cache, args),
        Commands::Subset(args) => subset::run(&cache, &config, args),
        Commands::Home => home::run(&cache, &config),
        Commands::Status => status::run(&cache),
    }
}

fn main() -> Result<()> { run() }
