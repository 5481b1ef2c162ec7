//! Entity catalog files
//!
//! A catalog is a static snapshot of an entity store: entity types, field
//! definitions and entity records. It is read from YAML (or JSON) and served
//! by `MemoryRepository`. Primarily used for the CLI and for testing.

use super::RepositoryError;
use crate::models::{EntityKey, EntityRecord, EntityTypeInfo, FieldDefinition};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Static snapshot of an entity store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub entity_types: Vec<EntityTypeInfo>,

    #[serde(default)]
    pub fields: Vec<FieldDefinition>,

    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

impl Catalog {
    /// Parse a catalog from YAML
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_yaml::from_str(contents).context("Failed to parse catalog YAML")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from JSON
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_json::from_str(contents).context("Failed to parse catalog JSON")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read a catalog file, choosing the format from the extension
    pub async fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Reading catalog from file: {:?}", path);

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let catalog = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
        .with_context(|| format!("Invalid catalog file: {}", path.display()))?;

        tracing::debug!(
            "Loaded catalog: {} entity types, {} fields, {} entities",
            catalog.entity_types.len(),
            catalog.fields.len(),
            catalog.entities.len()
        );

        Ok(catalog)
    }

    /// Check structural consistency
    ///
    /// Entity keys must be unique and non-empty; field names must be unique
    /// per entity type.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        let mut keys: HashSet<EntityKey> = HashSet::new();
        for record in &self.entities {
            if record.entity_type.is_empty() || record.id.is_empty() {
                return Err(RepositoryError::Catalog(format!(
                    "entity with empty type or id: {}",
                    record.key()
                )));
            }
            if !keys.insert(record.key()) {
                return Err(RepositoryError::Catalog(format!(
                    "duplicate entity: {}",
                    record.key()
                )));
            }
        }

        let mut fields: HashSet<(&str, &str)> = HashSet::new();
        for field in &self.fields {
            if !fields.insert((field.entity_type.as_str(), field.name.as_str())) {
                return Err(RepositoryError::Catalog(format!(
                    "duplicate field: {}.{}",
                    field.entity_type, field.name
                )));
            }
        }

        Ok(())
    }
}
