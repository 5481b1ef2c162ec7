//! Referrer tree construction
//!
//! Expands referrer lookups into a `UsageGraph` with an explicit work stack
//! instead of recursion. A node whose entity already sits on its own path to
//! the target is kept but not expanded; entities reached through separate
//! branches are expanded independently. Entities with a standalone page end
//! their branch: their own referrers never show up in a report.

use super::graph::{CutReason, NodeId, UsageGraph};
use super::index::ReferenceIndex;
use crate::config::Config;
use crate::models::EntityRecord;
use crate::repository::EntityRepository;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

/// Builds referrer trees on top of a `ReferenceIndex`
pub struct UsageGraphBuilder<'i, 'r, R: EntityRepository + ?Sized> {
    index: &'i mut ReferenceIndex<'r, R>,
    view_link: String,
    max_depth: usize,
    max_nodes: usize,
    timeout: Option<Duration>,
}

impl<'i, 'r, R: EntityRepository + ?Sized> UsageGraphBuilder<'i, 'r, R> {
    pub fn new(index: &'i mut ReferenceIndex<'r, R>, config: &Config) -> Self {
        let limits = &config.limits;
        Self {
            index,
            view_link: config.links.view.clone(),
            max_depth: limits.max_depth.max(1),
            max_nodes: limits.max_nodes.max(1),
            timeout: (limits.timeout_secs > 0).then(|| Duration::from_secs(limits.timeout_secs)),
        }
    }

    /// Build the referrer tree of `target`
    pub async fn build(&mut self, target: &EntityRecord) -> UsageGraph {
        let started = Instant::now();
        let deadline = self.timeout.map(|t| started + t);
        let mut graph = UsageGraph::new(target.key());

        let direct = self.index.find_referrers(target).await;
        if !self.attach(&mut graph, None, direct) {
            return self.finish(graph, started);
        }

        let mut stack: Vec<NodeId> = graph.roots().iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if graph.repeats_on_path(id) {
                tracing::debug!("Cycle at {}, not expanding", graph.node(id).key());
                graph.cut(id, CutReason::Cycle);
                continue;
            }

            if graph.node(id).entity.has_link(&self.view_link) {
                continue;
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                graph.cut(id, CutReason::Deadline);
                graph.truncate(CutReason::Deadline);
                break;
            }

            let entity = Arc::clone(&graph.node(id).entity);
            let referrers = self.index.find_referrers(&entity).await;

            if graph.node(id).depth >= self.max_depth {
                if !referrers.is_empty() {
                    graph.cut(id, CutReason::DepthLimit);
                    graph.truncate(CutReason::DepthLimit);
                }
                continue;
            }

            if !self.attach(&mut graph, Some(id), referrers) {
                break;
            }

            stack.extend(graph.node(id).parents.iter().rev().copied());
        }

        self.finish(graph, started)
    }

    /// Add `referrers` under `child`; false once the node budget is spent
    fn attach(
        &self,
        graph: &mut UsageGraph,
        child: Option<NodeId>,
        referrers: Vec<Arc<EntityRecord>>,
    ) -> bool {
        for referrer in referrers {
            if graph.len() >= self.max_nodes {
                if let Some(c) = child {
                    graph.cut(c, CutReason::NodeLimit);
                }
                graph.truncate(CutReason::NodeLimit);
                return false;
            }
            graph.add_node(referrer, child);
        }
        true
    }

    fn finish(&self, graph: UsageGraph, started: Instant) -> UsageGraph {
        match graph.truncation() {
            Some(truncation) => tracing::warn!(
                "Usage graph of {} truncated by {} at {} node(s)",
                graph.target(),
                truncation.reason,
                truncation.nodes
            ),
            None => tracing::debug!(
                "Usage graph of {}: {} node(s), {} root(s) in {:?}",
                graph.target(),
                graph.len(),
                graph.roots().len(),
                started.elapsed()
            ),
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitsConfig, SiblingOrder};
    use crate::models::{EntityKey, EntityTypeInfo, FieldDefinition, MatchMode};
    use crate::repository::{MemoryRepository, RepositoryResult};
    use async_trait::async_trait;

    /// node:N references node:N-1 through field_ref, down to node:0
    fn chain(len: usize) -> MemoryRepository {
        let mut repo = MemoryRepository::new().with_field(
            FieldDefinition::new("node", "field_ref", "entity_reference").with_target("node"),
        );
        repo = repo.with_entity(EntityRecord::new("node", "0"));
        for i in 1..=len {
            repo = repo.with_entity(
                EntityRecord::new("node", i.to_string()).with_field("field_ref", [(i - 1).to_string()]),
            );
        }
        repo
    }

    async fn build<R: EntityRepository>(repo: &R, target: EntityRecord, limits: LimitsConfig) -> UsageGraph {
        let config = Config {
            limits,
            ..Default::default()
        };
        let mut index = ReferenceIndex::load(repo, &config.fields, SiblingOrder::default())
            .await
            .unwrap();
        UsageGraphBuilder::new(&mut index, &config).build(&target).await
    }

    fn target(repo: &MemoryRepository, id: &str) -> EntityRecord {
        repo.get(&EntityKey::new("node", id)).unwrap().clone()
    }

    /// Delegates to a `MemoryRepository`, sleeping before every query
    struct SlowRepository {
        inner: MemoryRepository,
        delay: Duration,
    }

    #[async_trait]
    impl EntityRepository for SlowRepository {
        async fn entity_types(&self) -> RepositoryResult<Vec<EntityTypeInfo>> {
            self.inner.entity_types().await
        }

        async fn field_definitions(&self) -> RepositoryResult<Vec<FieldDefinition>> {
            self.inner.field_definitions().await
        }

        async fn query_entities(
            &self,
            entity_type: &str,
            field: &str,
            value: &str,
            mode: MatchMode,
        ) -> RepositoryResult<Vec<String>> {
            tokio::time::sleep(self.delay).await;
            self.inner.query_entities(entity_type, field, value, mode).await
        }

        async fn load_entities(
            &self,
            entity_type: &str,
            ids: &[String],
        ) -> RepositoryResult<Vec<EntityRecord>> {
            self.inner.load_entities(entity_type, ids).await
        }
    }

    #[tokio::test]
    async fn test_chain_is_linear() {
        let repo = chain(3);
        let graph = build(&repo, target(&repo, "0"), LimitsConfig::default()).await;

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.roots().len(), 1);
        assert!(graph.truncation().is_none());
        let deepest = graph.nodes().iter().max_by_key(|n| n.depth).unwrap();
        assert_eq!(deepest.key(), EntityKey::new("node", "3"));
        assert_eq!(deepest.depth, 3);
    }

    #[tokio::test]
    async fn test_depth_limit_truncates() {
        let repo = chain(5);
        let limits = LimitsConfig {
            max_depth: 2,
            ..Default::default()
        };
        let graph = build(&repo, target(&repo, "0"), limits).await;

        assert_eq!(graph.len(), 2);
        let truncation = graph.truncation().unwrap();
        assert_eq!(truncation.reason, CutReason::DepthLimit);
    }

    #[tokio::test]
    async fn test_depth_limit_at_end_of_chain_is_not_truncation() {
        let repo = chain(2);
        let limits = LimitsConfig {
            max_depth: 2,
            ..Default::default()
        };
        let graph = build(&repo, target(&repo, "0"), limits).await;

        assert_eq!(graph.len(), 2);
        assert!(graph.truncation().is_none());
    }

    #[tokio::test]
    async fn test_node_limit_truncates() {
        let repo = chain(10);
        let limits = LimitsConfig {
            max_nodes: 4,
            ..Default::default()
        };
        let graph = build(&repo, target(&repo, "0"), limits).await;

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.truncation().unwrap().reason, CutReason::NodeLimit);
    }

    #[tokio::test]
    async fn test_page_is_not_expanded() {
        // node:1 has a page; node:2 references it but can never be shown
        let repo = chain(2);
        let repo = repo.with_entity(
            EntityRecord::new("node", "1")
                .with_field("field_ref", ["0"])
                .with_link("canonical", "/node/1"),
        );

        let graph = build(&repo, target(&repo, "0"), LimitsConfig::default()).await;

        assert_eq!(graph.len(), 1);
        assert!(graph.node(graph.roots()[0]).parents.is_empty());
        assert!(graph.truncation().is_none());
    }

    #[tokio::test]
    async fn test_page_at_depth_limit_is_not_truncation() {
        let repo = chain(3).with_entity(
            EntityRecord::new("node", "1")
                .with_field("field_ref", ["0"])
                .with_link("canonical", "/node/1"),
        );
        let limits = LimitsConfig {
            max_depth: 1,
            ..Default::default()
        };

        let graph = build(&repo, target(&repo, "0"), limits).await;

        assert_eq!(graph.len(), 1);
        assert!(graph.truncation().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cuts_expansion() {
        let inner = chain(3);
        let start = target(&inner, "0");
        let repo = SlowRepository {
            inner,
            delay: Duration::from_secs(2),
        };
        let limits = LimitsConfig {
            timeout_secs: 1,
            ..Default::default()
        };

        let graph = build(&repo, start, limits).await;

        assert_eq!(graph.len(), 1);
        let root = graph.node(graph.roots()[0]);
        assert_eq!(root.key(), EntityKey::new("node", "1"));
        assert_eq!(root.cut, Some(CutReason::Deadline));
        let truncation = graph.truncation().unwrap();
        assert_eq!(truncation.reason, CutReason::Deadline);
        assert_eq!(truncation.nodes, 1);
    }
}
