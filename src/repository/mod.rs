//! Entity store seam
//!
//! The usage engine never talks to a storage system directly. Everything it
//! needs (field discovery, field-value queries, entity loading) goes through
//! the `EntityRepository` trait so any host store can back a report.

mod catalog;
mod memory;

pub use catalog::Catalog;
pub use memory::MemoryRepository;

use crate::models::{EntityRecord, EntityTypeInfo, FieldDefinition, MatchMode};
use async_trait::async_trait;

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Query failed on {entity_type}.{field}: {message}")]
    Query {
        entity_type: String,
        field: String,
        message: String,
    },

    #[error("Failed to load {entity_type} entities: {message}")]
    Load {
        entity_type: String,
        message: String,
    },

    #[error("Invalid catalog: {0}")]
    Catalog(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Read-only access to the host entity store
///
/// Implementations must be side-effect free: one report issues many queries
/// and assumes they all observe the same data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// All entity types known to the store
    async fn entity_types(&self) -> RepositoryResult<Vec<EntityTypeInfo>>;

    /// All field storage definitions, in a stable order
    async fn field_definitions(&self) -> RepositoryResult<Vec<FieldDefinition>>;

    /// Ids of `entity_type` entities whose `field` has a value matching `value`
    async fn query_entities(
        &self,
        entity_type: &str,
        field: &str,
        value: &str,
        mode: MatchMode,
    ) -> RepositoryResult<Vec<String>>;

    /// Load entities by id; unknown ids are skipped
    async fn load_entities(
        &self,
        entity_type: &str,
        ids: &[String],
    ) -> RepositoryResult<Vec<EntityRecord>>;
}
