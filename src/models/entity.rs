//! Entity identity and entity data snapshots
//!
//! `EntityKey` identifies a node in a usage traversal. `EntityRecord` is the
//! read-only view of an entity handed out by an `EntityRepository`: everything
//! the report needs (label, links, field values, host relation) without any
//! access back into the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Typed `(entity type, entity id)` pair
///
/// Two keys with equal type and id refer to the same logical node. Displays
/// as `type:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityKey {
    pub entity_type: String,
    pub id: String,
}

impl EntityKey {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// The `entity:<type>/<id>` URI form used by link fields
    pub fn entity_uri(&self) -> String {
        format!("entity:{}/{}", self.entity_type, self.id)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

impl FromStr for EntityKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((entity_type, id)) if !entity_type.is_empty() && !id.is_empty() => {
                Ok(EntityKey::new(entity_type, id))
            }
            _ => Err(format!("Invalid entity key (expected type:id): {}", s)),
        }
    }
}

/// Relation from a sub-structure (component, paragraph) to the entity that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRef {
    /// Entity type of the owning entity
    pub entity_type: String,
    /// Id of the owning entity
    pub id: String,
    /// Field on the owning entity that holds this sub-structure
    pub field: String,
}

impl HostRef {
    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.entity_type, &self.id)
    }
}

/// A file attached to an entity (media source files)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Stream URI, e.g. `public://docs/report.pdf`
    pub uri: String,
    /// Absolute URL the file is served from, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Read-only snapshot of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    #[serde(rename = "type")]
    pub entity_type: String,

    pub id: String,

    #[serde(default)]
    pub bundle: String,

    /// Human label of the bundle ("Component", "Basic page")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_label: Option<String>,

    /// Generic entity label
    #[serde(default)]
    pub label: String,

    /// Value of a type-specific title accessor, when the entity type has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// Link templates keyed by relation (`canonical`, `edit-form`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,

    /// Raw field values, multi-valued
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<String>>,

    /// Owning entity for sub-structures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRef>,
}

impl EntityRecord {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            bundle: String::new(),
            bundle_label: None,
            label: String::new(),
            title: None,
            created: None,
            links: BTreeMap::new(),
            fields: BTreeMap::new(),
            host: None,
            files: Vec::new(),
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.entity_type, &self.id)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All values of a field, empty when the field is absent
    pub fn field_values(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First non-empty value of a field
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.field_values(name)
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).map(String::as_str)
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.links.contains_key(rel)
    }

    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = bundle.into();
        self
    }

    pub fn with_bundle_label(mut self, label: impl Into<String>) -> Self {
        self.bundle_label = Some(label.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
        self.links.insert(rel.into(), href.into());
        self
    }

    pub fn with_field<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_host(
        mut self,
        entity_type: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.host = Some(HostRef {
            entity_type: entity_type.into(),
            id: id.into(),
            field: field.into(),
        });
        self
    }

    pub fn with_file(mut self, uri: impl Into<String>, url: Option<&str>) -> Self {
        self.files.push(FileRef {
            uri: uri.into(),
            url: url.map(str::to_string),
        });
        self
    }
}

/// Entity type definition as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeInfo {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Link relations entities of this type expose
    #[serde(default)]
    pub link_templates: Vec<String>,
}

impl EntityTypeInfo {
    pub fn has_link_template(&self, rel: &str) -> bool {
        self.link_templates.iter().any(|t| t == rel)
    }
}
