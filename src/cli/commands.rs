//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{paths, ConfigLoader};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "limits.maxDepth", "links.view")
        key: Option<String>,
        /// Site name for site-specific config
        #[arg(long)]
        site: Option<String>,
    },
    /// Set configuration value
    Set {
        /// Configuration key (e.g., "limits.maxDepth", "links.view")
        key: String,
        /// Configuration value
        value: String,
        /// Site name for site-specific config
        #[arg(long)]
        site: Option<String>,
    },
    /// List all configuration
    List {
        /// Site name for site-specific config
        #[arg(long)]
        site: Option<String>,
    },
    /// Show configuration file path
    Path {
        /// Site name for site-specific config
        #[arg(long)]
        site: Option<String>,
    },
    /// Validate configuration
    Validate {
        /// Site name for site-specific config
        #[arg(long)]
        site: Option<String>,
    },
}

/// Handle configuration subcommands
pub async fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key, site } => {
            let config =
                ConfigLoader::load(site.as_deref()).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = crate::config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value, site } => {
            // Only the key being set lands in the file; other layers stay visible
            let path = match site.as_deref() {
                Some(site) => paths::site_config_path(site),
                None => paths::root_config_path(),
            };
            ConfigLoader::set_in_file(&path, &key, &value)
                .with_context(|| format!("Failed to save {}", path.display()))?;

            match site {
                Some(site_name) => println!("Configuration saved for site: {}", site_name),
                None => println!("Configuration saved"),
            }
        }
        ConfigSubcommand::List { site } => {
            let config =
                ConfigLoader::load(site.as_deref()).context("Failed to load configuration")?;

            let yaml =
                serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Path { site } => {
            let config_path = match site.as_deref() {
                Some(site) => paths::site_config_path(site),
                None => paths::root_config_path(),
            };
            println!("{}", config_path.display());
        }
        ConfigSubcommand::Validate { site } => match ConfigLoader::validate(site.as_deref()) {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
