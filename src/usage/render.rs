//! Row rendering
//!
//! Flattens a referrer tree into report rows. Entities with a standalone page
//! ("breakable") end a branch and become a row; everything between the target
//! and such an entity is folded into the row's breadcrumb.

use super::fields::FieldCatalog;
use super::graph::{NodeId, UsageGraph};
use super::title::TitleFormatter;
use crate::config::Config;
use crate::models::{EntityKey, EntityRecord};
use serde::Serialize;
use std::collections::HashMap;

/// One line of a usage report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRow {
    pub entity: EntityKey,
    /// The entity's own label
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_title: Option<String>,
    /// Breadcrumb(s) from the row entity down towards the target
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,
}

impl UsageRow {
    /// Title as shown to editors: admin title first when present
    pub fn display_title(&self) -> String {
        match &self.admin_title {
            Some(admin) => format!("{} (Public title: {})", admin, self.title),
            None => self.title.clone(),
        }
    }
}

/// Merge two locations of the same row
///
/// Containment in either direction keeps the longer one; otherwise both are
/// kept, separated by `location_break`.
pub fn merge_location(existing: &str, new: &str, location_break: &str) -> String {
    if existing.contains(new) {
        existing.to_string()
    } else if new.contains(existing) {
        new.to_string()
    } else {
        format!("{}{}{}", existing, location_break, new)
    }
}

/// Rows keyed by entity, in first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    rows: Vec<UsageRow>,
    index: HashMap<EntityKey, usize>,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row, merging it into an existing row for the same entity
    ///
    /// The first title and links win; locations are combined with
    /// `merge_location`.
    pub fn insert(&mut self, row: UsageRow, location_break: &str) {
        match self.index.get(&row.entity) {
            Some(&idx) => {
                let existing = &mut self.rows[idx];
                existing.location =
                    merge_location(&existing.location, &row.location, location_break);
            }
            None => {
                self.index.insert(row.entity.clone(), self.rows.len());
                self.rows.push(row);
            }
        }
    }

    /// Merge every row of `other` into this set, in order
    pub fn merge(&mut self, other: RowSet, location_break: &str) {
        for row in other.rows {
            self.insert(row, location_break);
        }
    }

    pub fn get(&self, key: &EntityKey) -> Option<&UsageRow> {
        self.index.get(key).map(|&idx| &self.rows[idx])
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UsageRow> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<UsageRow> {
        self.rows
    }
}

/// Turns a `UsageGraph` into rows
pub struct UsageRowRenderer<'a> {
    config: &'a Config,
    fields: &'a FieldCatalog,
    titles: TitleFormatter,
}

impl<'a> UsageRowRenderer<'a> {
    pub fn new(config: &'a Config, fields: &'a FieldCatalog) -> Self {
        Self {
            config,
            fields,
            titles: TitleFormatter::from_config(&config.title),
        }
    }

    /// An entity with a standalone page ends its branch
    pub fn is_breakable(&self, record: &EntityRecord) -> bool {
        record.has_link(&self.config.links.view)
    }

    /// Roots without a page and without referrers can never be displayed
    pub fn should_show(&self, graph: &UsageGraph, id: NodeId) -> bool {
        let node = graph.node(id);
        self.is_breakable(&node.entity) || !node.parents.is_empty()
    }

    /// Breadcrumb title of an intermediate entity
    pub fn format_title(&self, record: &EntityRecord) -> String {
        self.titles.format_title(record, self.fields)
    }

    /// Rows for every root of `graph`, merged by entity
    pub fn render(&self, graph: &UsageGraph) -> RowSet {
        let mut rows = RowSet::new();
        for &root in graph.roots() {
            if !self.should_show(graph, root) {
                tracing::debug!("Hiding unreachable {}", graph.node(root).key());
                continue;
            }
            rows.merge(self.render_root(graph, root), &self.config.report.location_break);
        }
        rows
    }

    /// Rows reachable from one root
    ///
    /// Depth-first, parents in sibling order. A breakable node emits its row
    /// and is not descended into; a transparent node is skipped over.
    pub fn render_root(&self, graph: &UsageGraph, root: NodeId) -> RowSet {
        let location_break = &self.config.report.location_break;
        let mut rows = RowSet::new();
        let mut stack: Vec<(NodeId, Vec<NodeId>)> = vec![(root, Vec::new())];

        while let Some((id, mut route)) = stack.pop() {
            route.push(id);
            let node = graph.node(id);

            if self.is_breakable(&node.entity) {
                let intermediate = &route[..route.len() - 1];
                rows.insert(self.build_row(graph, id, intermediate), location_break);
                continue;
            }

            for &parent in node.parents.iter().rev() {
                stack.push((parent, route.clone()));
            }
        }

        rows
    }

    /// Row for node `id`, reached from a root through `intermediate`
    fn build_row(&self, graph: &UsageGraph, id: NodeId, intermediate: &[NodeId]) -> UsageRow {
        let entity = &graph.node(id).entity;

        let mut location = intermediate
            .iter()
            .rev()
            .map(|&id| self.format_title(&graph.node(id).entity))
            .collect::<Vec<_>>()
            .join(&self.config.report.route_separator);

        if intermediate.is_empty() && self.config.report.direct_field_label {
            let target = graph.target();
            if let Some(field) = self.fields.referencing_field_on(
                entity,
                &target.entity_type,
                &target.id,
                &self.config.fields.reference_types,
            ) {
                location = field.display_label().to_string();
            }
        }

        let admin_title = entity
            .field_value(&self.config.title.admin_field)
            .map(str::to_string);

        UsageRow {
            entity: entity.key(),
            title: entity.label.clone(),
            admin_title,
            location,
            view: entity.link(&self.config.links.view).map(str::to_string),
            edit: entity.link(&self.config.links.edit).map(str::to_string),
        }
    }
}
