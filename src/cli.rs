// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cutover")]
#[command(about = "Timestamped releases over SSH with an atomic current symlink")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: cutover.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a cutover.yml in the current directory
    Init {
        /// Server to put in the template, as [user@]host[:port]
        #[arg(long)]
        host: Option<String>,

        /// Overwrite an existing cutover.yml
        #[arg(short, long)]
        force: bool,
    },

    /// Deploy a new release to every server
    Deploy {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Retire the latest release and switch back to the one before it
    Rollback {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// List the active releases on every server
    Releases {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// List the available task names
    Tasks,

    /// Run a task by name, e.g. `staging:deployer:deploy`
    Run {
        /// Task name
        task: String,
    },
}
