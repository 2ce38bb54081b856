//! components-generator CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use components_generator::config::GeneratorConfig;
use components_generator::error::GeneratorError;
use components_generator::{observability, Generator};
use components_generator_cli_lib::{BuildCommand, RefreshCommand, StatusCommand, TypesCommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "components-generator")]
#[command(version)]
#[command(about = "Build WordPress starter themes from a component library", long_about = None)]
struct Cli {
    /// Generator config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the component library if the cache is stale
    Refresh {
        /// Fetch even if the cache is fresh
        #[arg(short, long)]
        force: bool,
        /// Use a local zip instead of downloading
        #[arg(long, value_name = "FILE")]
        archive: Option<PathBuf>,
    },
    /// List the available theme types
    Types,
    /// Build a theme type
    Build {
        /// Theme type id (e.g. `blog`, `business-plus`)
        #[arg(value_name = "TYPE")]
        type_id: String,
        /// Print the base copy plan without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Use the cached library even if it is stale
        #[arg(long)]
        skip_refresh: bool,
    },
    /// Show cache freshness and fetch details
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let fatal = e
                .chain()
                .filter_map(|cause| cause.downcast_ref::<GeneratorError>())
                .any(GeneratorError::is_fatal);
            if fatal {
                tracing::error!(error = %e, "fatal error, stopping");
            }
            eprintln!("{} {e:#}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GeneratorConfig::load().context("Failed to load configuration")?,
    };
    observability::init(&config).context("Failed to initialize logging")?;

    let generator = Generator::new(config);

    match cli.command {
        Commands::Refresh { force, archive } => {
            RefreshCommand::new(force, archive).execute(&generator)?;
        }
        Commands::Types => TypesCommand::execute(&generator),
        Commands::Build {
            type_id,
            dry_run,
            skip_refresh,
        } => {
            BuildCommand::new(type_id, dry_run, skip_refresh).execute(&generator)?;
        }
        Commands::Status => StatusCommand::execute(&generator),
    }

    Ok(())
}
