//! Field definitions and query match modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage-level definition of a field on an entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Entity type the field is attached to
    pub entity_type: String,
    /// Machine name of the field
    pub name: String,
    /// Human label, used in breadcrumbs
    #[serde(default)]
    pub label: String,
    /// Field kind (`entity_reference`, `link`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Target entity type for reference fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

impl FieldDefinition {
    pub fn new(
        entity_type: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            name: name.into(),
            label: String::new(),
            kind: kind.into(),
            target_type: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_target(mut self, target_type: impl Into<String>) -> Self {
        self.target_type = Some(target_type.into());
        self
    }

    /// Label, falling back to the machine name
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// How a field value is compared in a referrer query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    /// Value equals the query value (reference fields)
    Exact,
    /// Value ends with the query value (link field URIs)
    EndsWith,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::EndsWith => "endsWith",
        }
    }

    pub fn matches(&self, stored: &str, query: &str) -> bool {
        match self {
            MatchMode::Exact => stored == query,
            MatchMode::EndsWith => stored.ends_with(query),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(MatchMode::Exact),
            "endsWith" | "ends_with" => Ok(MatchMode::EndsWith),
            _ => Err(format!("Unknown match mode: {}", s)),
        }
    }
}
