//! In-memory entity repository

use super::{Catalog, EntityRepository, RepositoryError, RepositoryResult};
use crate::models::{EntityKey, EntityRecord, EntityTypeInfo, FieldDefinition, MatchMode};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

/// Entity repository serving a `Catalog` from memory
///
/// Query results follow catalog order, which makes reports over the same
/// catalog reproducible.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    catalog: Catalog,
    index: HashMap<EntityKey, usize>,
    known_types: BTreeSet<String>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository over an existing catalog
    pub fn from_catalog(catalog: Catalog) -> Self {
        let mut repo = Self::new();
        for info in catalog.entity_types {
            repo = repo.with_entity_type(info);
        }
        for field in catalog.fields {
            repo = repo.with_field(field);
        }
        for record in catalog.entities {
            repo = repo.with_entity(record);
        }
        repo
    }

    /// Register an entity type
    pub fn with_entity_type(mut self, info: EntityTypeInfo) -> Self {
        self.known_types.insert(info.id.clone());
        self.catalog.entity_types.retain(|t| t.id != info.id);
        self.catalog.entity_types.push(info);
        self
    }

    /// Register a field definition
    ///
    /// The field's entity type is not implicitly registered: a field on an
    /// undeclared type is what a broken field configuration looks like.
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.catalog
            .fields
            .retain(|f| !(f.entity_type == field.entity_type && f.name == field.name));
        self.catalog.fields.push(field);
        self
    }

    /// Add or replace an entity
    pub fn with_entity(mut self, record: EntityRecord) -> Self {
        let key = record.key();
        self.known_types.insert(record.entity_type.clone());
        match self.index.get(&key) {
            Some(&idx) => self.catalog.entities[idx] = record,
            None => {
                self.index.insert(key, self.catalog.entities.len());
                self.catalog.entities.push(record);
            }
        }
        self
    }

    pub fn get(&self, key: &EntityKey) -> Option<&EntityRecord> {
        self.index.get(key).map(|&idx| &self.catalog.entities[idx])
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn ensure_known(&self, entity_type: &str) -> RepositoryResult<()> {
        if self.known_types.contains(entity_type) {
            Ok(())
        } else {
            Err(RepositoryError::UnknownEntityType(entity_type.to_string()))
        }
    }
}

#[async_trait]
impl EntityRepository for MemoryRepository {
    async fn entity_types(&self) -> RepositoryResult<Vec<EntityTypeInfo>> {
        // Types only seen through entities get a bare definition
        let mut types = self.catalog.entity_types.clone();
        for id in &self.known_types {
            if !types.iter().any(|t| &t.id == id) {
                types.push(EntityTypeInfo {
                    id: id.clone(),
                    label: id.clone(),
                    link_templates: Vec::new(),
                });
            }
        }
        Ok(types)
    }

    async fn field_definitions(&self) -> RepositoryResult<Vec<FieldDefinition>> {
        Ok(self.catalog.fields.clone())
    }

    async fn query_entities(
        &self,
        entity_type: &str,
        field: &str,
        value: &str,
        mode: MatchMode,
    ) -> RepositoryResult<Vec<String>> {
        self.ensure_known(entity_type)?;

        let ids = self
            .catalog
            .entities
            .iter()
            .filter(|record| record.entity_type == entity_type)
            .filter(|record| {
                record
                    .field_values(field)
                    .iter()
                    .any(|stored| mode.matches(stored, value))
            })
            .map(|record| record.id.clone())
            .collect::<Vec<_>>();

        tracing::debug!(
            "Query {}.{} {} {:?}: {} match(es)",
            entity_type,
            field,
            mode,
            value,
            ids.len()
        );

        Ok(ids)
    }

    async fn load_entities(
        &self,
        entity_type: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<EntityRecord>> {
        self.ensure_known(entity_type)?;

        Ok(ids
            .iter()
            .filter_map(|id| self.get(&EntityKey::new(entity_type, id.as_str())))
            .cloned()
            .collect())
    }
}
