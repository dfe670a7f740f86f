// ABOUTME: Entry point for the renova CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use renova::config::{self, Config};
use renova::error::{Error, Result};
use renova::output::{Output, OutputMode};
use renova::sync::git;
use renova::update::Orchestrator;
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
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init {
            service,
            target,
            repo,
            force,
        } => {
            let cwd = env::current_dir().expect("Failed to get current directory");
            config::init_config(
                &cwd,
                service.as_deref(),
                target.as_deref(),
                repo.as_deref(),
                force,
            )
        }
        Commands::Update { json, quiet } => {
            let cwd = env::current_dir().expect("Failed to get current directory");
            let config = Config::discover(&cwd)?;

            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Normal
            };

            update(config, mode, &cwd).await
        }
        Commands::Status => {
            let cwd = env::current_dir().expect("Failed to get current directory");
            Config::discover(&cwd).map(|config| {
                println!("Service: {}", config.service);
                println!("Target:  {}", config.target.display());
                println!("Repo:    {} ({})", config.repo, config.branch);
                println!("Backups: {}", config.backup_dir().display());
                if !config.target.exists() {
                    println!("State:   target missing");
                } else if git::is_repo(&config.target) {
                    println!("State:   checkout (fast path)");
                } else {
                    println!("State:   plain directory (merge path)");
                }
            })
        }
    }
}

/// Run the full update pipeline and print the report.
async fn update(config: Config, mode: OutputMode, project_dir: &std::path::Path) -> Result<()> {
    let output = Output::new(mode);
    output.progress(&format!(
        "Updating {} at {}",
        config.service,
        config.target.display()
    ));

    let orchestrator = Orchestrator::new(config, Output::new(mode), project_dir);
    let report = orchestrator.run().await?;

    output.report(&report);

    if report.success() {
        Ok(())
    } else {
        Err(Error::UpdateFailed("one or more stages failed".to_string()))
    }
}
