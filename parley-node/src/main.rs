//! # Parley CLI
//!
//! Offline tools over the Parley service layer. Commands that need stored
//! state read and write a JSON snapshot of the document store (`--store`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parley_core::config::{ConfigLoader, ParleyConfig};
use std::path::PathBuf;
use tracing::debug;

mod commands;

/// CLI structure
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Parley - AI service layer tools for the creator inbox")]
#[command(version)]
struct Cli {
    /// Config file (default: $PARLEY_CONFIG, ./parley.toml, user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the cache key and TTL for a piece of content
    CacheKey(commands::analyze::CacheKeyArgs),

    /// Score a categorized message
    Score(commands::analyze::ScoreArgs),

    /// Creator health score with burnout risk and recommendations
    Health(commands::analyze::HealthArgs),

    /// Burnout risk only
    Burnout(commands::analyze::HealthArgs),

    /// Render a boundary message template
    Template(commands::analyze::TemplateArgs),

    /// Assign an A/B variant
    Variant(commands::state::VariantArgs),

    /// Show (or sweep) rate-limit windows
    RateLimit(commands::state::RateLimitArgs),

    /// Send a message, categorize and score it against the live endpoint
    Run(commands::run::RunArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ParleyConfig> {
    let loader = match path {
        Some(p) => ConfigLoader::with_path(p),
        None => ConfigLoader::new(),
    };
    debug!("config path: {}", loader.config_path().display());
    loader.load().context("failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    debug!("Running command: {:?}", cli.command);

    match cli.command {
        Commands::CacheKey(args) => commands::analyze::cache_key(&args),
        Commands::Score(args) => commands::analyze::score(&config, &args),
        Commands::Health(args) => commands::analyze::health(&args),
        Commands::Burnout(args) => commands::analyze::burnout(&args),
        Commands::Template(args) => commands::analyze::template(&args),
        Commands::Variant(args) => commands::state::variant(&args).await,
        Commands::RateLimit(args) => commands::state::rate_limit(&args).await,
        Commands::Run(args) => commands::run::run(&config, &args).await,
    }
}
