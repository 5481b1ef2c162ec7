//! Entity Usage Model Layer
//!
//! Plain data types shared by the repository seam and the usage engine.
//!
//! Structure:
//! - `entity.rs` - Entity keys, entity snapshots, entity type info
//! - `field.rs` - Field definitions and query match modes

pub mod entity;
pub mod field;

pub use entity::{EntityKey, EntityRecord, EntityTypeInfo, FileRef, HostRef};
pub use field::{FieldDefinition, MatchMode};
