use std::fmt;

/// Raw document as produced by an acquirer or by splitting an `llms.txt` blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub logical_path: String,
    pub raw_content: String,
}

impl SourceDocument {
    pub fn new(logical_path: impl Into<String>, raw_content: impl Into<String>) -> Self {
        Self {
            logical_path: logical_path.into(),
            raw_content: raw_content.into(),
        }
    }
}

/// Markdown ready to be written under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub output_path: String,
    pub title: String,
    pub content: String,
    pub size_bytes: u64,
    pub content_hash: Option<String>,
}

impl OutputDocument {
    pub fn new(output_path: String, title: String, content: String) -> Self {
        let size_bytes = content.len() as u64;
        Self {
            output_path,
            title,
            content,
            size_bytes,
            content_hash: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    Created,
    Updated,
    Unchanged,
    /// Nothing was written: dry-run preview.
    Skipped,
    /// Fetch, conversion or write failed for this document only.
    Failed,
}

impl SyncStatus {
    /// True when the document ended up on disk.
    pub fn is_written(self) -> bool {
        matches!(self, SyncStatus::Created | SyncStatus::Updated | SyncStatus::Unchanged)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncStatus::Created => "created",
            SyncStatus::Updated => "updated",
            SyncStatus::Unchanged => "unchanged",
            SyncStatus::Skipped => "skipped",
            SyncStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub output_path: String,
    pub title: String,
    pub status: SyncStatus,
    pub size_bytes: u64,
    /// Failure reason, or a note such as "dry run".
    pub detail: Option<String>,
}

impl SyncResult {
    pub fn written(document: &OutputDocument, status: SyncStatus) -> Self {
        Self {
            output_path: document.output_path.clone(),
            title: document.title.clone(),
            status,
            size_bytes: document.size_bytes,
            detail: None,
        }
    }

    pub fn skipped(document: &OutputDocument, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::written(document, SyncStatus::Skipped)
        }
    }

    pub fn failed(output_path: String, title: String, reason: impl Into<String>) -> Self {
        Self {
            output_path,
            title,
            status: SyncStatus::Failed,
            size_bytes: 0,
            detail: Some(reason.into()),
        }
    }
}

/// Per-status counts over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl SyncSummary {
    pub fn from_results(results: &[SyncResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.status {
                SyncStatus::Created => summary.created += 1,
                SyncStatus::Updated => summary.updated += 1,
                SyncStatus::Unchanged => summary.unchanged += 1,
                SyncStatus::Skipped => summary.skipped += 1,
                SyncStatus::Failed => summary.failed += 1,
            }
            if result.status.is_written() {
                summary.bytes += result.size_bytes;
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.skipped + self.failed
    }

    pub fn written(&self) -> usize {
        self.created + self.updated + self.unchanged
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} skipped, {} failed ({} bytes written)",
            self.created, self.updated, self.unchanged, self.skipped, self.failed, self.bytes
        )
    }
}
