//! Display titles for intermediate entities
//!
//! Intermediate entities only show up as breadcrumb text, so their title is
//! derived through an ordered list of strategies. The first strategy that
//! yields a non-empty string wins.

use super::fields::FieldCatalog;
use crate::config::TitleConfig;
use crate::models::EntityRecord;

/// One way of deriving a title from an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleStrategy {
    /// Value of a designated display title field
    Field(String),
    /// The entity type's own title accessor
    TitleAccessor,
    /// `"<host field label> (<component type>)"` for sub-structures
    HostField,
    /// Component type label of a sub-structure
    ComponentType,
    /// Generic entity label
    Label,
}

impl TitleStrategy {
    pub fn resolve(&self, record: &EntityRecord, fields: &FieldCatalog) -> Option<String> {
        let title = match self {
            TitleStrategy::Field(name) => record.field_value(name).map(str::to_string),
            TitleStrategy::TitleAccessor => record
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            TitleStrategy::HostField => {
                let host = record.host.as_ref()?;
                let label = fields.label(&host.entity_type, &host.field)?;
                Some(match component_label(record) {
                    Some(component) => format!("{} ({})", label, component),
                    None => label.to_string(),
                })
            }
            TitleStrategy::ComponentType => {
                record.host.as_ref()?;
                component_label(record)
            }
            TitleStrategy::Label => Some(record.label.trim().to_string()),
        };
        title.filter(|t| !t.is_empty())
    }

    /// Whether a title found by this strategy is suffixed with the component type
    fn decorates(&self) -> bool {
        matches!(self, TitleStrategy::Field(_) | TitleStrategy::TitleAccessor)
    }
}

/// Ordered title strategy chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFormatter {
    strategies: Vec<TitleStrategy>,
}

impl TitleFormatter {
    pub fn new(strategies: Vec<TitleStrategy>) -> Self {
        Self { strategies }
    }

    /// Title fields from config, then accessor, host field, component type, label
    pub fn from_config(config: &TitleConfig) -> Self {
        let mut strategies: Vec<TitleStrategy> = config
            .fields
            .iter()
            .map(|f| TitleStrategy::Field(f.clone()))
            .collect();
        strategies.extend([
            TitleStrategy::TitleAccessor,
            TitleStrategy::HostField,
            TitleStrategy::ComponentType,
            TitleStrategy::Label,
        ]);
        Self::new(strategies)
    }

    pub fn strategies(&self) -> &[TitleStrategy] {
        &self.strategies
    }

    /// Title of `record`; empty when every strategy comes up empty
    pub fn format_title(&self, record: &EntityRecord, fields: &FieldCatalog) -> String {
        for strategy in &self.strategies {
            let Some(title) = strategy.resolve(record, fields) else {
                continue;
            };
            if strategy.decorates() && record.host.is_some() {
                if let Some(component) = component_label(record) {
                    return format!("{} ({})", title, component);
                }
            }
            return title;
        }
        String::new()
    }
}

/// Component type label: the bundle label, else the capitalised bundle name
fn component_label(record: &EntityRecord) -> Option<String> {
    record
        .bundle_label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ucwords)
        .or_else(|| (!record.bundle.is_empty()).then(|| ucwords(&record.bundle)))
}

/// Uppercase the first character of each whitespace-separated word
pub fn ucwords(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldDefinition;

    fn formatter() -> TitleFormatter {
        TitleFormatter::from_config(&TitleConfig::default())
    }

    fn fields() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldDefinition::new("node", "field_body", "entity_reference_revisions")
                .with_label("Body")
                .with_target("paragraph"),
        ])
    }

    #[test]
    fn test_ucwords() {
        assert_eq!(ucwords("basic page"), "Basic Page");
        assert_eq!(ucwords("node"), "Node");
        assert_eq!(ucwords(""), "");
    }

    #[test]
    fn test_title_field_priority() {
        let record = EntityRecord::new("node", "1")
            .with_label("Label")
            .with_field("title", ["Plain title"])
            .with_field("field_hss_title", ["Display title"]);
        assert_eq!(formatter().format_title(&record, &fields()), "Display title");
    }

    #[test]
    fn test_empty_title_field_falls_through() {
        let record = EntityRecord::new("node", "1")
            .with_label("Label")
            .with_field("field_title", [""])
            .with_title("Accessor title");
        assert_eq!(formatter().format_title(&record, &fields()), "Accessor title");
    }

    #[test]
    fn test_host_field_label_for_components() {
        let record = EntityRecord::new("paragraph", "3")
            .with_bundle("text")
            .with_bundle_label("component")
            .with_label("Text #3")
            .with_host("node", "1", "field_body");
        assert_eq!(formatter().format_title(&record, &fields()), "Body (Component)");
    }

    #[test]
    fn test_component_title_is_decorated() {
        let record = EntityRecord::new("paragraph", "3")
            .with_bundle("hero")
            .with_field("field_title", ["Welcome"])
            .with_host("node", "1", "field_body");
        assert_eq!(formatter().format_title(&record, &fields()), "Welcome (Hero)");
    }

    #[test]
    fn test_unknown_host_field_uses_component_type() {
        let record = EntityRecord::new("paragraph", "3")
            .with_bundle_label("Gallery")
            .with_label("Gallery #3")
            .with_host("node", "1", "field_unknown");
        assert_eq!(formatter().format_title(&record, &fields()), "Gallery");
    }

    #[test]
    fn test_label_fallback_and_empty() {
        let record = EntityRecord::new("block", "9").with_label("Footer");
        assert_eq!(formatter().format_title(&record, &fields()), "Footer");

        let record = EntityRecord::new("block", "10");
        assert_eq!(formatter().format_title(&record, &fields()), "");
    }
}
