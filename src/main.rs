//! entity-usage - Reverse-reference usage reports for content entities
//!
//! Loads an entity catalog and lists every page that uses a given entity,
//! following nested components and links back to their host pages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use entity_usage::cli::{self, ConfigSubcommand, OutputFormat};
use entity_usage::config::ConfigLoader;
use std::path::PathBuf;

/// entity-usage - Reverse-reference usage reports for content entities
#[derive(Parser, Debug)]
#[command(name = "entity-usage")]
#[command(about = "Find every page that uses a content entity", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Show where an entity is used
    Report {
        /// Entity type (e.g., "media", "node")
        entity_type: String,
        /// Entity id
        entity_id: String,
        /// Catalog file (YAML or JSON); defaults to the 'catalog' config key
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Site name for site-specific config
        #[arg(long)]
        site: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List entity types a report can be requested for
    Types {
        /// Catalog file (YAML or JSON); defaults to the 'catalog' config key
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Site name for site-specific config
        #[arg(long)]
        site: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    match args.command {
        Command::Report {
            entity_type,
            entity_id,
            catalog,
            site,
            format,
        } => {
            let config =
                ConfigLoader::load(site.as_deref()).context("Failed to load configuration")?;
            cli::handle_report_command(
                &config,
                &entity_type,
                &entity_id,
                catalog.as_deref(),
                format,
            )
            .await
        }
        Command::Types { catalog, site } => {
            let config =
                ConfigLoader::load(site.as_deref()).context("Failed to load configuration")?;
            cli::handle_types_command(&config, catalog.as_deref()).await
        }
        Command::Config { subcommand } => cli::handle_config_command(subcommand).await,
        Command::Version => {
            cli::display_version();
            Ok(())
        }
    }
}
