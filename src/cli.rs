// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "renova")]
#[command(about = "In-place server update with backup, rollback, and cascading restart")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new renova.yml configuration file
    Init {
        /// Service name
        #[arg(short, long)]
        service: Option<String>,

        /// Deployment target directory
        #[arg(short, long)]
        target: Option<String>,

        /// Source repository clone URL
        #[arg(short, long)]
        repo: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Run the update pipeline against the configured target
    Update {
        /// Emit the final report as JSON
        #[arg(long)]
        json: bool,

        /// Only print the final result
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show configuration and deployment state
    Status,
}
