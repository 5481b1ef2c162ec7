//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Entity types a usage report may be requested for (empty = all)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<String>,

    /// Default catalog file served by the CLI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Field kinds considered during referrer discovery
    #[serde(default)]
    pub fields: FieldsConfig,

    /// Link relations used for the view/edit columns
    #[serde(default)]
    pub links: LinksConfig,

    /// Title resolution
    #[serde(default)]
    pub title: TitleConfig,

    /// Row rendering
    #[serde(default)]
    pub report: ReportConfig,

    /// Traversal budgets
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Field kinds configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldsConfig {
    /// Field kinds holding typed entity references
    #[serde(default = "default_reference_types")]
    pub reference_types: Vec<String>,

    /// Field kinds holding free-form link URIs
    #[serde(default = "default_link_types")]
    pub link_types: Vec<String>,
}

/// Link relation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinksConfig {
    /// Relation marking a standalone page; also fills the view column
    #[serde(default = "default_view_rel")]
    pub view: String,

    /// Relation filling the edit column
    #[serde(default = "default_edit_rel")]
    pub edit: String,
}

/// Title resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitleConfig {
    /// Display title fields tried in order for intermediate entities
    #[serde(default = "default_title_fields")]
    pub fields: Vec<String>,

    /// Field holding an editorial admin title for row entities
    #[serde(default = "default_admin_field")]
    pub admin_field: String,

    /// Field holding the name used in the report heading
    #[serde(default = "default_name_field")]
    pub name_field: String,
}

/// Row rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    /// Separator between breadcrumb segments
    #[serde(default = "default_route_separator")]
    pub route_separator: String,

    /// Separator between merged locations of one row
    #[serde(default = "default_location_break")]
    pub location_break: String,

    /// Use the referencing field label as location for direct referrers
    #[serde(default = "default_false")]
    pub direct_field_label: bool,

    /// Order of sibling referrers
    #[serde(default)]
    pub sibling_order: SiblingOrder,
}

/// Order in which referrers of one entity are listed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SiblingOrder {
    /// Whatever order the repository returns
    #[default]
    Collaborator,
    /// Newest first by creation time
    CreatedDesc,
}

impl SiblingOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiblingOrder::Collaborator => "collaborator",
            SiblingOrder::CreatedDesc => "createdDesc",
        }
    }
}

impl std::str::FromStr for SiblingOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collaborator" => Ok(SiblingOrder::Collaborator),
            "createdDesc" => Ok(SiblingOrder::CreatedDesc),
            _ => Err(format!(
                "Unknown sibling order: {} (expected collaborator or createdDesc)",
                s
            )),
        }
    }
}

/// Traversal budget configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Longest referrer chain expanded
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of nodes in one usage graph
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Wall-clock budget for one traversal, in seconds (0 = unlimited)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_reference_types() -> Vec<String> {
    vec![
        "entity_reference".to_string(),
        "entity_reference_revisions".to_string(),
    ]
}

fn default_link_types() -> Vec<String> {
    vec!["link".to_string(), "teaser_link".to_string()]
}

fn default_view_rel() -> String {
    "canonical".to_string()
}

fn default_edit_rel() -> String {
    "edit-form".to_string()
}

fn default_title_fields() -> Vec<String> {
    vec![
        "field_twm_title".to_string(),
        "field_hss_title".to_string(),
        "field_title".to_string(),
        "title".to_string(),
    ]
}

fn default_admin_field() -> String {
    "field_admin_title".to_string()
}

fn default_name_field() -> String {
    "name".to_string()
}

fn default_route_separator() -> String {
    " -> ".to_string()
}

fn default_location_break() -> String {
    "\n".to_string()
}

fn default_false() -> bool {
    false
}

fn default_max_depth() -> usize {
    64
}

fn default_max_nodes() -> usize {
    10_000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entity_types: Vec::new(), // Empty means every type is reportable
            catalog: None,
            fields: FieldsConfig::default(),
            links: LinksConfig::default(),
            title: TitleConfig::default(),
            report: ReportConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            reference_types: default_reference_types(),
            link_types: default_link_types(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            view: default_view_rel(),
            edit: default_edit_rel(),
        }
    }
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            fields: default_title_fields(),
            admin_field: default_admin_field(),
            name_field: default_name_field(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            route_separator: default_route_separator(),
            location_break: default_location_break(),
            direct_field_label: default_false(),
            sibling_order: SiblingOrder::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_nodes: default_max_nodes(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.entity_types.is_empty());
        assert_eq!(config.links.view, "canonical");
        assert_eq!(config.report.route_separator, " -> ");
        assert_eq!(config.title.fields[0], "field_twm_title");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("referenceTypes"));
        assert!(yaml.contains("routeSeparator"));
        assert!(!yaml.contains("entityTypes"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
entityTypes: [node, media]
report:
  siblingOrder: createdDesc
limits:
  maxDepth: 8
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.entity_types, vec!["node", "media"]);
        assert_eq!(config.report.sibling_order, SiblingOrder::CreatedDesc);
        assert_eq!(config.report.route_separator, " -> ");
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.max_nodes, 10_000);
    }
}
