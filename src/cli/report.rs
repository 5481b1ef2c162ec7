//! Report and entity type listing commands

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output;
use crate::repository::{Catalog, MemoryRepository};
use crate::usage::UsageReporter;

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Catalog file from the command line, else from configuration
pub fn resolve_catalog(flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.catalog.clone())
        .context("No catalog given: pass --catalog or set the 'catalog' configuration key")
}

async fn open_repository(path: &Path) -> Result<MemoryRepository> {
    let catalog = Catalog::load(path)
        .await
        .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
    Ok(MemoryRepository::from_catalog(catalog))
}

/// Print the usage report of one entity
pub async fn handle_report_command(
    config: &Config,
    entity_type: &str,
    entity_id: &str,
    catalog: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let path = resolve_catalog(catalog, config)?;
    let repo = open_repository(&path).await?;

    let report = UsageReporter::new(&repo, config)
        .report(entity_type, entity_id)
        .await
        .with_context(|| format!("Failed to build usage report for {}:{}", entity_type, entity_id))?;

    match format {
        OutputFormat::Text => print!("{}", output::format_text(&report)),
        OutputFormat::Json => println!("{}", output::to_json(&report)?),
        OutputFormat::Yaml => print!("{}", output::to_yaml(&report)?),
    }

    Ok(())
}

/// List entity types a report can be requested for
pub async fn handle_types_command(config: &Config, catalog: Option<&Path>) -> Result<()> {
    let path = resolve_catalog(catalog, config)?;
    let repo = open_repository(&path).await?;

    let types = UsageReporter::new(&repo, config)
        .eligible_entity_types()
        .await
        .context("Failed to list entity types")?;

    if types.is_empty() {
        println!("No entity types with a '{}' page", config.links.view);
        return Ok(());
    }

    for info in types {
        let enabled = config.entity_types.is_empty() || config.entity_types.contains(&info.id);
        let marker = if enabled { "*" } else { " " };
        if info.label.is_empty() {
            println!("{} {}", marker, info.id);
        } else {
            println!("{} {} ({})", marker, info.id, info.label);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_catalog_prefers_flag() {
        let config = Config {
            catalog: Some(PathBuf::from("/etc/site.yaml")),
            ..Default::default()
        };
        let flag = PathBuf::from("local.yaml");
        assert_eq!(
            resolve_catalog(Some(flag.as_path()), &config).unwrap(),
            PathBuf::from("local.yaml")
        );
        assert_eq!(
            resolve_catalog(None, &config).unwrap(),
            PathBuf::from("/etc/site.yaml")
        );
    }

    #[test]
    fn test_resolve_catalog_missing() {
        let err = resolve_catalog(None, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("--catalog"));
    }
}
