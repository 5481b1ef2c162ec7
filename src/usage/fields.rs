//! Field discovery over the repository's field definitions

use crate::models::{EntityRecord, FieldDefinition};

/// Field definitions of one store, with the lookups referrer discovery needs
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    definitions: Vec<FieldDefinition>,
}

/// Fields grouped by the entity type they live on, in definition order
pub type FieldsByType<'a> = Vec<(&'a str, Vec<&'a FieldDefinition>)>;

impl FieldCatalog {
    pub fn new(definitions: Vec<FieldDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    pub fn get(&self, entity_type: &str, field: &str) -> Option<&FieldDefinition> {
        self.definitions
            .iter()
            .find(|d| d.entity_type == entity_type && d.name == field)
    }

    /// Human label of a field, falling back to its machine name
    pub fn label(&self, entity_type: &str, field: &str) -> Option<&str> {
        self.get(entity_type, field).map(FieldDefinition::display_label)
    }

    /// Reference fields able to point at `target_type`, grouped by entity type
    pub fn referencing_fields<'a>(
        &'a self,
        target_type: &str,
        reference_kinds: &[String],
    ) -> FieldsByType<'a> {
        group_by_type(self.definitions.iter().filter(|d| {
            reference_kinds.contains(&d.kind) && d.target_type.as_deref() == Some(target_type)
        }))
    }

    /// Link fields of every entity type, grouped by entity type
    pub fn link_fields<'a>(&'a self, link_kinds: &[String]) -> FieldsByType<'a> {
        group_by_type(
            self.definitions
                .iter()
                .filter(|d| link_kinds.contains(&d.kind)),
        )
    }

    /// First reference field on `record` whose values contain `target_id`
    pub fn referencing_field_on<'a>(
        &'a self,
        record: &EntityRecord,
        target_type: &str,
        target_id: &str,
        reference_kinds: &[String],
    ) -> Option<&'a FieldDefinition> {
        self.definitions.iter().find(|d| {
            d.entity_type == record.entity_type
                && reference_kinds.contains(&d.kind)
                && d.target_type.as_deref() == Some(target_type)
                && record.field_values(&d.name).iter().any(|v| v == target_id)
        })
    }
}

fn group_by_type<'a>(defs: impl Iterator<Item = &'a FieldDefinition>) -> FieldsByType<'a> {
    let mut groups: FieldsByType<'a> = Vec::new();
    for def in defs {
        match groups
            .iter_mut()
            .find(|(entity_type, _)| *entity_type == def.entity_type)
        {
            Some((_, fields)) => fields.push(def),
            None => groups.push((def.entity_type.as_str(), vec![def])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldDefinition::new("paragraph", "field_media", "entity_reference")
                .with_label("Media")
                .with_target("media"),
            FieldDefinition::new("node", "field_body", "entity_reference_revisions")
                .with_label("Body")
                .with_target("paragraph"),
            FieldDefinition::new("node", "field_hero", "entity_reference").with_target("media"),
            FieldDefinition::new("node", "field_cta", "link").with_label("Call to action"),
            FieldDefinition::new("paragraph", "field_link", "teaser_link"),
        ])
    }

    #[test]
    fn test_referencing_fields_grouped_in_definition_order() {
        let catalog = catalog();
        let groups = catalog
            .referencing_fields("media", &kinds(&["entity_reference", "entity_reference_revisions"]));
        let summary: Vec<(&str, Vec<&str>)> = groups
            .iter()
            .map(|(t, fields)| (*t, fields.iter().map(|f| f.name.as_str()).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![("paragraph", vec!["field_media"]), ("node", vec!["field_hero"])]
        );
    }

    #[test]
    fn test_unconfigured_kinds_are_ignored() {
        let catalog = catalog();
        assert!(
            catalog
                .referencing_fields("paragraph", &kinds(&["entity_reference"]))
                .is_empty()
        );
        let links = catalog.link_fields(&kinds(&["link"]));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, "node");
    }

    #[test]
    fn test_label_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.label("node", "field_body"), Some("Body"));
        assert_eq!(catalog.label("node", "field_hero"), Some("field_hero"));
        assert_eq!(catalog.label("node", "missing"), None);
    }

    #[test]
    fn test_referencing_field_on_record() {
        let catalog = catalog();
        let record = EntityRecord::new("paragraph", "3").with_field("field_media", ["7"]);
        let field = catalog
            .referencing_field_on(&record, "media", "7", &kinds(&["entity_reference"]))
            .unwrap();
        assert_eq!(field.label, "Media");
        assert!(
            catalog
                .referencing_field_on(&record, "media", "8", &kinds(&["entity_reference"]))
                .is_none()
        );
    }
}
