//! Docsync core: pure data model and text transforms, no I/O.
mod config;
mod manifest;
mod path_map;
mod result;
mod sections;

pub use config::{PageSpec, PathRules, SelectorRules, SourceSpec, SyncConfig};
pub use manifest::{Manifest, MANIFEST_FILENAME};
pub use path_map::PathMapper;
pub use result::{OutputDocument, SourceDocument, SyncResult, SyncStatus, SyncSummary};
pub use sections::{parse_sections, Sections};
