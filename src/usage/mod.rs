//! Entity usage engine
//!
//! Referrer discovery (`index`), tree construction (`builder`, `graph`) and
//! flattening into report rows (`render`, `title`), tied together by
//! `UsageReporter`.

pub mod builder;
mod error;
pub mod fields;
pub mod graph;
pub mod index;
pub mod render;
mod report;
pub mod title;

pub use builder::UsageGraphBuilder;
pub use error::UsageError;
pub use fields::FieldCatalog;
pub use graph::{CutReason, NodeId, Truncation, UsageGraph, UsageNode};
pub use index::{all_uris, ReferenceIndex};
pub use render::{merge_location, RowSet, UsageRow, UsageRowRenderer};
pub use report::{report_title, UsageReport, UsageReporter, EMPTY_MESSAGE};
pub use title::{TitleFormatter, TitleStrategy};
