//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Site-specific config
    /// 3. Root config
    /// 4. Built-in defaults
    ///
    /// File layers are merged key by key: a site file setting only
    /// `limits.maxDepth` keeps every other root setting.
    pub fn load(site: Option<&str>) -> Result<Config> {
        let mut merged = serde_yaml::to_value(Self::load_defaults())
            .context("Failed to serialize default configuration")?;

        if let Some(root) = Self::load_optional(&paths::root_config_path())? {
            merge_values(&mut merged, root);
        }

        if let Some(site_name) = site {
            if let Some(site_layer) = Self::load_optional(&paths::site_config_path(site_name))? {
                merge_values(&mut merged, site_layer);
            }
        }

        let config: Config =
            serde_yaml::from_value(merged).context("Failed to merge configuration layers")?;
        let config = Self::apply_env_overrides(config);

        tracing::debug!(
            "Configuration loaded: site={:?}, entityTypes={:?}, maxDepth={}",
            site,
            config.entity_types,
            config.limits.max_depth
        );

        Ok(config)
    }

    /// Raw contents of a config file, checked against the schema
    ///
    /// Only the keys present in the file are returned, so that layering
    /// does not reset lower layers to their defaults.
    pub fn load_layer(path: &Path) -> Result<Value> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let value: Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        let value = match value {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        };

        serde_yaml::from_value::<Config>(value.clone())
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(value)
    }

    /// Load a layer if its file exists; a present but broken file is an error
    fn load_optional(path: &Path) -> Result<Option<Value>> {
        if path.exists() {
            Self::load_layer(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Validate configuration by loading and checking for errors
    ///
    /// This performs strict validation - it will fail on:
    /// - Invalid YAML syntax
    /// - Invalid value types
    /// - Empty link relations or separators
    /// - A zero depth or node budget
    pub fn validate(site: Option<&str>) -> Result<()> {
        let config = Self::load(site).context("Failed to load merged configuration")?;
        Self::check(&config)
    }

    /// Check semantic constraints of an already parsed configuration
    pub fn check(config: &Config) -> Result<()> {
        if config.links.view.trim().is_empty() {
            return Err(anyhow::anyhow!("links.view must not be empty"));
        }
        if config.fields.reference_types.is_empty() && config.fields.link_types.is_empty() {
            return Err(anyhow::anyhow!(
                "fields.referenceTypes and fields.linkTypes cannot both be empty"
            ));
        }
        if config.report.location_break.is_empty() {
            return Err(anyhow::anyhow!("report.locationBreak must not be empty"));
        }
        if config.limits.max_depth == 0 {
            return Err(anyhow::anyhow!("limits.maxDepth must be at least 1"));
        }
        if config.limits.max_nodes == 0 {
            return Err(anyhow::anyhow!("limits.maxNodes must be at least 1"));
        }
        Ok(())
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        // ENTITY_USAGE_CATALOG override
        if let Ok(catalog) = std::env::var("ENTITY_USAGE_CATALOG") {
            if !catalog.is_empty() {
                config.catalog = Some(PathBuf::from(catalog));
            }
        }

        // ENTITY_USAGE_MAX_DEPTH override
        if let Ok(depth) = std::env::var("ENTITY_USAGE_MAX_DEPTH") {
            match depth.parse::<usize>() {
                Ok(val) => config.limits.max_depth = val,
                Err(_) => tracing::warn!("Ignoring invalid ENTITY_USAGE_MAX_DEPTH: {}", depth),
            }
        }

        // ENTITY_USAGE_ENTITY_TYPES override (comma-separated)
        if let Ok(types) = std::env::var("ENTITY_USAGE_ENTITY_TYPES") {
            config.entity_types = super::split_list(&types);
        }

        config
    }

    /// Set one key in the config file at `path`, leaving its other keys alone
    ///
    /// The value is validated against the file's own view of the
    /// configuration (defaults plus the file) before anything is written.
    pub fn set_in_file(path: &Path, key: &str, value: &str) -> Result<()> {
        let mut layer = if path.exists() {
            Self::load_layer(path)?
        } else {
            Value::Mapping(Mapping::new())
        };

        let mut view = serde_yaml::to_value(Self::load_defaults())
            .context("Failed to serialize default configuration")?;
        merge_values(&mut view, layer.clone());
        let mut config: Config =
            serde_yaml::from_value(view).context("Failed to read configuration")?;

        super::set_config_value(&mut config, key, value)
            .with_context(|| format!("Failed to set {} = {}", key, value))?;
        Self::check(&config).with_context(|| format!("Refusing to save {} = {}", key, value))?;

        let full = serde_yaml::to_value(&config).context("Failed to serialize configuration")?;
        let segments: Vec<&str> = key.split('.').collect();
        match lookup(&full, &segments) {
            Some(new_value) => insert_at(&mut layer, &segments, new_value.clone()),
            None => remove_at(&mut layer, &segments),
        }

        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let yaml = serde_yaml::to_string(&layer).context("Failed to serialize configuration")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

/// Deep-merge `overlay` into `base`; mappings merge per key, anything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn lookup<'v>(value: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| current.get(*segment))
}

fn insert_at(value: &mut Value, segments: &[&str], new_value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = value;
    for segment in parents {
        if !current.is_mapping() {
            *current = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(map) = current else {
            return;
        };
        current = map
            .entry(Value::from(*segment))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }
    if !current.is_mapping() {
        *current = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = current {
        map.insert(Value::from(*last), new_value);
    }
}

fn remove_at(value: &mut Value, segments: &[&str]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = value;
    for segment in parents {
        match current.get_mut(*segment) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Value::Mapping(map) = current {
        map.remove(*last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ReportConfig, SiblingOrder};

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.entity_types.is_empty());
        assert_eq!(config.links.edit, "edit-form");
    }

    #[test]
    fn test_merge_values_is_per_key() {
        let mut base = serde_yaml::to_value(Config {
            entity_types: vec!["node".to_string()],
            catalog: Some(PathBuf::from("/srv/catalog.yaml")),
            ..Default::default()
        })
        .unwrap();
        let mut report = ReportConfig::default();
        report.sibling_order = SiblingOrder::CreatedDesc;
        let mut root = Config::default();
        root.report = report;
        merge_values(&mut base, serde_yaml::to_value(root).unwrap());

        let site: Value = serde_yaml::from_str("report:\n  routeSeparator: ' / '\n").unwrap();
        merge_values(&mut base, site);

        let merged: Config = serde_yaml::from_value(base).unwrap();
        assert_eq!(merged.entity_types, vec!["node"]);
        assert_eq!(merged.catalog, Some(PathBuf::from("/srv/catalog.yaml")));
        assert_eq!(merged.report.sibling_order, SiblingOrder::CreatedDesc);
        assert_eq!(merged.report.route_separator, " / ");
    }

    #[test]
    fn test_set_in_file_writes_only_that_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites").join("intranet").join("config.yaml");

        ConfigLoader::set_in_file(&path, "limits.maxDepth", "4").unwrap();
        ConfigLoader::set_in_file(&path, "report.siblingOrder", "createdDesc").unwrap();

        let layer = ConfigLoader::load_layer(&path).unwrap();
        let expected: Value =
            serde_yaml::from_str("limits:\n  maxDepth: 4\nreport:\n  siblingOrder: createdDesc\n")
                .unwrap();
        assert_eq!(layer, expected);

        assert!(ConfigLoader::set_in_file(&path, "limits.maxNodes", "0").is_err());
        assert!(ConfigLoader::set_in_file(&path, "ui.skin", "dark").is_err());
        assert_eq!(ConfigLoader::load_layer(&path).unwrap(), expected);

        ConfigLoader::set_in_file(&path, "catalog", "/srv/site.yaml").unwrap();
        ConfigLoader::set_in_file(&path, "catalog", "").unwrap();
        assert_eq!(ConfigLoader::load_layer(&path).unwrap(), expected);
    }

    #[test]
    fn test_empty_layer_is_an_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();

        assert_eq!(
            ConfigLoader::load_layer(&path).unwrap(),
            Value::Mapping(Mapping::new())
        );

        std::fs::write(&path, "limits:\n  maxDepth: deep\n").unwrap();
        let err = ConfigLoader::load_layer(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_check_rejects_zero_budgets() {
        let mut config = Config::default();
        config.limits.max_depth = 0;
        assert!(ConfigLoader::check(&config).is_err());

        let mut config = Config::default();
        config.links.view = " ".to_string();
        assert!(ConfigLoader::check(&config).is_err());

        assert!(ConfigLoader::check(&Config::default()).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // No other test in this crate reads these variables.
        unsafe {
            std::env::set_var("ENTITY_USAGE_MAX_DEPTH", "5");
            std::env::set_var("ENTITY_USAGE_ENTITY_TYPES", "node, media,");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.limits.max_depth, 5);
        assert_eq!(config.entity_types, vec!["node", "media"]);

        // SAFETY: same as above
        unsafe {
            std::env::remove_var("ENTITY_USAGE_MAX_DEPTH");
            std::env::remove_var("ENTITY_USAGE_ENTITY_TYPES");
        }
    }
}
