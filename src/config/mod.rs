//! Configuration system for entity-usage
//!
//! Layered YAML configuration: built-in defaults, a root config file, an
//! optional per-site config file and environment overrides.

mod defaults;
pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    Config, FieldsConfig, LimitsConfig, LinksConfig, ReportConfig, SiblingOrder, TitleConfig,
};

use anyhow::Context;

/// Split a comma-separated list, dropping blanks
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a list value given either as a YAML array or comma-separated
fn parse_list(key: &str, value: &str) -> anyhow::Result<Vec<String>> {
    if value.trim_start().starts_with('[') {
        serde_yaml::from_str(value)
            .with_context(|| format!("{} must be a YAML array (e.g., ['node', 'media'])", key))
    } else {
        Ok(split_list(value))
    }
}

/// Get a configuration value by key (dot notation)
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "entityTypes" => Ok(config.entity_types.join(",")),
        "catalog" => Ok(config
            .catalog
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()),
        "fields.referenceTypes" => Ok(config.fields.reference_types.join(",")),
        "fields.linkTypes" => Ok(config.fields.link_types.join(",")),
        "links.view" => Ok(config.links.view.clone()),
        "links.edit" => Ok(config.links.edit.clone()),
        "title.fields" => Ok(config.title.fields.join(",")),
        "title.adminField" => Ok(config.title.admin_field.clone()),
        "title.nameField" => Ok(config.title.name_field.clone()),
        "report.routeSeparator" => Ok(config.report.route_separator.clone()),
        "report.locationBreak" => Ok(config.report.location_break.clone()),
        "report.directFieldLabel" => Ok(config.report.direct_field_label.to_string()),
        "report.siblingOrder" => Ok(config.report.sibling_order.as_str().to_string()),
        "limits.maxDepth" => Ok(config.limits.max_depth.to_string()),
        "limits.maxNodes" => Ok(config.limits.max_nodes.to_string()),
        "limits.timeoutSecs" => Ok(config.limits.timeout_secs.to_string()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key (dot notation)
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "entityTypes" => {
            config.entity_types = parse_list(key, value)?;
        }
        "catalog" => {
            if value.is_empty() {
                config.catalog = None;
            } else {
                config.catalog = Some(value.into());
            }
        }
        "fields.referenceTypes" => {
            config.fields.reference_types = parse_list(key, value)?;
        }
        "fields.linkTypes" => {
            config.fields.link_types = parse_list(key, value)?;
        }
        "links.view" => {
            config.links.view = value.to_string();
        }
        "links.edit" => {
            config.links.edit = value.to_string();
        }
        "title.fields" => {
            config.title.fields = parse_list(key, value)?;
        }
        "title.adminField" => {
            config.title.admin_field = value.to_string();
        }
        "title.nameField" => {
            config.title.name_field = value.to_string();
        }
        "report.routeSeparator" => {
            config.report.route_separator = value.to_string();
        }
        "report.locationBreak" => {
            config.report.location_break = value.to_string();
        }
        "report.directFieldLabel" => {
            config.report.direct_field_label = value
                .parse()
                .context("report.directFieldLabel must be 'true' or 'false'")?;
        }
        "report.siblingOrder" => {
            config.report.sibling_order = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        "limits.maxDepth" => {
            config.limits.max_depth = value.parse().context("limits.maxDepth must be a number")?;
        }
        "limits.maxNodes" => {
            config.limits.max_nodes = value.parse().context("limits.maxNodes must be a number")?;
        }
        "limits.timeoutSecs" => {
            config.limits.timeout_secs = value
                .parse()
                .context("limits.timeoutSecs must be a number")?;
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    Ok(())
}
