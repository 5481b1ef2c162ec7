//! Usage reports
//!
//! The one operation exposed to callers: given an entity, list every entity
//! with its own page that uses it, directly or through nested components.

use super::builder::UsageGraphBuilder;
use super::error::UsageError;
use super::graph::Truncation;
use super::index::ReferenceIndex;
use super::render::{UsageRow, UsageRowRenderer};
use super::title::ucwords;
use crate::config::Config;
use crate::models::{EntityKey, EntityRecord, EntityTypeInfo};
use crate::repository::{EntityRepository, RepositoryError};
use serde::Serialize;

/// Shown instead of rows when nothing uses the entity
pub const EMPTY_MESSAGE: &str = "This entity is not referenced by any other entity.";

/// Result of a usage report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub target: EntityKey,
    pub title: String,
    pub rows: Vec<UsageRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
}

impl UsageReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Produces usage reports against one repository
pub struct UsageReporter<'a, R: EntityRepository + ?Sized> {
    repo: &'a R,
    config: &'a Config,
}

impl<'a, R: EntityRepository + ?Sized> UsageReporter<'a, R> {
    pub fn new(repo: &'a R, config: &'a Config) -> Self {
        Self { repo, config }
    }

    /// Report every displayable entity using `entity_type:entity_id`
    pub async fn report(&self, entity_type: &str, entity_id: &str) -> Result<UsageReport, UsageError> {
        let key = EntityKey::new(entity_type, entity_id);

        if !self.config.entity_types.is_empty()
            && !self.config.entity_types.iter().any(|t| t == entity_type)
        {
            return Err(UsageError::NotEnabled(entity_type.to_string()));
        }

        let target = self.load_target(&key).await?;

        let mut index = ReferenceIndex::load(
            self.repo,
            &self.config.fields,
            self.config.report.sibling_order,
        )
        .await?;

        let graph = UsageGraphBuilder::new(&mut index, self.config)
            .build(&target)
            .await;

        let renderer = UsageRowRenderer::new(self.config, index.field_catalog());
        let rows = renderer.render(&graph).into_rows();

        let type_label = self.type_label(entity_type).await;
        let title = report_title(&target, &type_label, &self.config.title.name_field);

        tracing::info!(
            "Usage report for {}: {} row(s), {} node(s), {} repository queries",
            key,
            rows.len(),
            graph.len(),
            index.query_count()
        );

        Ok(UsageReport {
            target: key,
            title,
            rows,
            truncation: graph.truncation(),
        })
    }

    /// Entity types that can get a report: those with a standalone page
    pub async fn eligible_entity_types(&self) -> Result<Vec<EntityTypeInfo>, UsageError> {
        let view = &self.config.links.view;
        Ok(self
            .repo
            .entity_types()
            .await?
            .into_iter()
            .filter(|info| info.has_link_template(view))
            .collect())
    }

    async fn load_target(&self, key: &EntityKey) -> Result<EntityRecord, UsageError> {
        let records = match self
            .repo
            .load_entities(&key.entity_type, std::slice::from_ref(&key.id))
            .await
        {
            Ok(records) => records,
            Err(RepositoryError::UnknownEntityType(_)) => {
                return Err(UsageError::NotFound(key.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        records
            .into_iter()
            .find(|r| r.id == key.id)
            .ok_or_else(|| UsageError::NotFound(key.clone()))
    }

    /// Human label of an entity type; the capitalised machine name when unknown
    async fn type_label(&self, entity_type: &str) -> String {
        match self.repo.entity_types().await {
            Ok(types) => types
                .into_iter()
                .find(|info| info.id == entity_type && !info.label.is_empty())
                .map(|info| info.label)
                .unwrap_or_else(|| ucwords(entity_type)),
            Err(e) => {
                tracing::debug!("Cannot list entity types: {}", e);
                ucwords(entity_type)
            }
        }
    }
}

/// `Entity usage of <Bundle> "<name>" (<Type>)`
///
/// The name comes from `name_field`, falling back to the literal `entity`.
pub fn report_title(target: &EntityRecord, type_label: &str, name_field: &str) -> String {
    let bundle = target
        .bundle_label
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(&target.bundle);
    let bundle = if bundle.is_empty() {
        &target.entity_type
    } else {
        bundle
    };
    let name = target.field_value(name_field).unwrap_or("entity");
    format!(
        "Entity usage of {} \"{}\" ({})",
        ucwords(bundle),
        name,
        ucwords(type_label)
    )
}
