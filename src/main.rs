use clap::Parser;
use eyre::{Context, Result};
use log::info;

mod cli;
mod commands;

use cli::{Cli, Commands};
use flog::config::Config;

fn setup_logging(config: &Config, verbose: bool) {
    // RUST_LOG env var takes precedence, otherwise use config status level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(config.status.as_filter());
    }

    builder.target(env_logger::Target::Stderr).init();

    info!(
        "Status level: {} (from {})",
        config.status.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Plugins { format } => commands::plugins::run(cli::OutputFormat::resolve(format)),
        Commands::Callables => commands::callables::run(),
        Commands::Check => commands::check::run(&config),
        Commands::Emit {
            level,
            target,
            context,
            message,
        } => commands::emit::run(level.into(), &target, context, &message.join(" "), &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config, cli.verbose);

    info!("Starting flog with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
