// ABOUTME: Entry point for the cutover CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use cutover::config::{self, Config};
use cutover::error::Result;
use cutover::output::{Output, OutputMode};
use cutover::tasks::Group;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = OutputMode::from_flags(cli.quiet, cli.json);

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);

    match cli.command {
        Commands::Init { host, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, host.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Deploy { destination } => {
            let config = load_config(&cli.config)?;
            let group = Group::select(&config, destination.as_deref())?;
            commands::deploy(group, output).await
        }
        Commands::Rollback { destination } => {
            let config = load_config(&cli.config)?;
            let group = Group::select(&config, destination.as_deref())?;
            commands::rollback(group, output).await
        }
        Commands::Releases { destination } => {
            let config = load_config(&cli.config)?;
            let group = Group::select(&config, destination.as_deref())?;
            commands::releases(group, output).await
        }
        Commands::Tasks => {
            let config = load_config(&cli.config)?;
            commands::list_tasks(&config, &output)
        }
        Commands::Run { task } => {
            let config = load_config(&cli.config)?;
            commands::run_task(&config, &task, output).await
        }
    }
}

/// The `--config` file if given, otherwise the one found in the working directory.
fn load_config(path: &Option<std::path::PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::discover(&env::current_dir()?),
    }
}
