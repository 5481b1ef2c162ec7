//! Referrer discovery
//!
//! Finds the entities whose reference or link fields point at a given entity.
//! A lookup never fails as a whole: when querying one referring entity type
//! fails, that type is logged and skipped.

use super::fields::FieldCatalog;
use crate::config::{FieldsConfig, SiblingOrder};
use crate::models::{EntityKey, EntityRecord, MatchMode};
use crate::repository::{EntityRepository, RepositoryResult};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Referrer lookups for one traversal
///
/// Results are memoised per entity: the repository is treated as a
/// consistent read-only snapshot for the lifetime of the index.
pub struct ReferenceIndex<'r, R: EntityRepository + ?Sized> {
    repo: &'r R,
    fields: FieldCatalog,
    reference_kinds: Vec<String>,
    link_kinds: Vec<String>,
    sibling_order: SiblingOrder,
    referrers: HashMap<EntityKey, Vec<Arc<EntityRecord>>>,
    records: HashMap<EntityKey, Arc<EntityRecord>>,
    queries: usize,
}

impl<'r, R: EntityRepository + ?Sized> ReferenceIndex<'r, R> {
    /// Create an index, loading the store's field definitions once
    pub async fn load(
        repo: &'r R,
        fields: &FieldsConfig,
        sibling_order: SiblingOrder,
    ) -> RepositoryResult<Self> {
        let definitions = repo.field_definitions().await?;
        tracing::debug!("Loaded {} field definition(s)", definitions.len());

        Ok(Self {
            repo,
            fields: FieldCatalog::new(definitions),
            reference_kinds: fields.reference_types.clone(),
            link_kinds: fields.link_types.clone(),
            sibling_order,
            referrers: HashMap::new(),
            records: HashMap::new(),
            queries: 0,
        })
    }

    pub fn field_catalog(&self) -> &FieldCatalog {
        &self.fields
    }

    /// Number of repository queries issued so far
    pub fn query_count(&self) -> usize {
        self.queries
    }

    /// Entities directly referencing `target`, in sibling order
    pub async fn find_referrers(&mut self, target: &EntityRecord) -> Vec<Arc<EntityRecord>> {
        let key = target.key();
        if let Some(cached) = self.referrers.get(&key) {
            return cached.clone();
        }

        let referrers = self.lookup(target).await;
        self.referrers.insert(key, referrers.clone());
        referrers
    }

    async fn lookup(&mut self, target: &EntityRecord) -> Vec<Arc<EntityRecord>> {
        let uris = all_uris(target);

        // Reference-field types first, then types only holding link fields
        let reference_groups = self
            .fields
            .referencing_fields(&target.entity_type, &self.reference_kinds);
        let link_groups = self.fields.link_fields(&self.link_kinds);

        let mut entity_types: Vec<&str> = reference_groups.iter().map(|(t, _)| *t).collect();
        for &(entity_type, _) in &link_groups {
            if !entity_types.contains(&entity_type) {
                entity_types.push(entity_type);
            }
        }

        // (entity type, field, value, mode) per type, borrowed out of the catalog
        let mut plans: Vec<(String, Vec<(String, String, MatchMode)>)> = Vec::new();
        for entity_type in entity_types {
            let mut conditions = Vec::new();
            if let Some((_, fields)) = reference_groups.iter().find(|(t, _)| *t == entity_type) {
                for field in fields {
                    conditions.push((field.name.clone(), target.id.clone(), MatchMode::Exact));
                }
            }
            if let Some((_, fields)) = link_groups.iter().find(|(t, _)| *t == entity_type) {
                for field in fields {
                    for uri in &uris {
                        conditions.push((field.name.clone(), uri.clone(), MatchMode::EndsWith));
                    }
                }
            }
            plans.push((entity_type.to_string(), conditions));
        }

        let mut referrers = Vec::new();
        for (entity_type, conditions) in plans {
            match self.query_type(&entity_type, &conditions).await {
                Ok(records) => referrers.extend(records),
                Err(e) => {
                    tracing::warn!(
                        "Skipping {} referrers of {}: {}",
                        entity_type,
                        target.key(),
                        e
                    );
                }
            }
        }

        sort_siblings(&mut referrers, self.sibling_order);

        tracing::debug!("Found {} referrer(s) of {}", referrers.len(), target.key());

        referrers
    }

    /// Run every condition for one entity type and load the matches
    async fn query_type(
        &mut self,
        entity_type: &str,
        conditions: &[(String, String, MatchMode)],
    ) -> RepositoryResult<Vec<Arc<EntityRecord>>> {
        let mut ids: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (field, value, mode) in conditions {
            self.queries += 1;
            let matches = self
                .repo
                .query_entities(entity_type, field, value, *mode)
                .await?;
            for id in matches {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| {
                !self
                    .records
                    .contains_key(&EntityKey::new(entity_type, id.as_str()))
            })
            .cloned()
            .collect();

        if !missing.is_empty() {
            for record in self.repo.load_entities(entity_type, &missing).await? {
                self.records.insert(record.key(), Arc::new(record));
            }
        }

        Ok(ids
            .iter()
            .filter_map(|id| {
                self.records
                    .get(&EntityKey::new(entity_type, id.as_str()))
                    .cloned()
            })
            .collect())
    }
}

/// Every URI form a link field may use to point at `record`
///
/// `entity:<type>/<id>` always; for attached files also the stream URI, the
/// absolute URL, the URL path and `internal:<path>`.
pub fn all_uris(record: &EntityRecord) -> Vec<String> {
    let mut uris = vec![record.key().entity_uri()];
    let mut push = |uri: String| {
        if !uri.is_empty() && !uris.contains(&uri) {
            uris.push(uri);
        }
    };

    for file in &record.files {
        push(file.uri.clone());

        let Some(absolute) = &file.url else {
            continue;
        };
        push(absolute.clone());

        match url::Url::parse(absolute) {
            Ok(parsed) => {
                let path = parsed.path();
                // A bare "/" would suffix-match every link
                if path.len() > 1 {
                    push(path.to_string());
                    push(format!("internal:{}", path));
                }
            }
            Err(e) => {
                tracing::debug!("Cannot parse file URL {:?} of {}: {}", absolute, record.key(), e);
            }
        }
    }

    uris
}

/// Stable sibling ordering; entities without a creation time sort last
fn sort_siblings(records: &mut [Arc<EntityRecord>], order: SiblingOrder) {
    if order == SiblingOrder::CreatedDesc {
        records.sort_by(|a, b| match (a.created, b.created) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}
