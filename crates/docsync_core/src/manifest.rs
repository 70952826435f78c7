use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Snapshot of one sync run, written next to the synced files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    pub synced_at: String,
    pub file_count: usize,
    pub files: Vec<String>,
    /// Output path -> short content hash, for documents that carry one.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hashes: BTreeMap<String, String>,
}

impl Manifest {
    /// Builds a manifest; `files` is sorted and deduplicated so output is deterministic.
    pub fn new(
        source: impl Into<String>,
        synced_at: impl Into<String>,
        files: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut files: Vec<String> = files.into_iter().collect();
        files.sort();
        files.dedup();
        Self {
            source: source.into(),
            source_path: None,
            commit: None,
            synced_at: synced_at.into(),
            file_count: files.len(),
            files,
            hashes: BTreeMap::new(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
