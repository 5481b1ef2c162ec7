//! Entity usage library
//!
//! This library provides the core functionality for the entity-usage CLI:
//! given a content entity, find every entity with its own page that uses it,
//! directly or through chains of nested components and links.
//! It can be used both as a binary and as a library for testing.

pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod repository;
pub mod usage;

// Re-export commonly used types for convenience
pub use models::{EntityKey, EntityRecord, FieldDefinition};
pub use repository::{Catalog, EntityRepository, MemoryRepository, RepositoryError};
pub use usage::{UsageError, UsageReport, UsageReporter, UsageRow};
