use crate::models::EntityKey;
use crate::repository::RepositoryError;
use thiserror::Error;

/// Errors that abort a usage report
///
/// Failures of individual referrer lookups never surface here; they are
/// logged and the affected entity type is skipped.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("Entity not found: {0}")]
    NotFound(EntityKey),

    #[error("Usage reports are not enabled for entity type: {0}")]
    NotEnabled(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
