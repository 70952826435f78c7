use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use docsync_core::{
    parse_sections, Manifest, OutputDocument, PathMapper, PathRules, SyncConfig, SyncResult,
    SyncStatus, SyncSummary,
};
use sync_logging::{sync_debug, sync_info, sync_warn};
use thiserror::Error;

use crate::acquire::{
    acquirer_for, AcquireError, AcquiredItem, Acquirer, ContentForm, ItemFailure,
    RepositoryCloner,
};
use crate::fetch::{Fetcher, ProgressSink};
use crate::frontmatter::{document_title, with_source_line};
use crate::hash::content_hash;
use crate::persist::{ensure_output_dir, DocumentWriter, PersistError};
use crate::transform::HtmlTransform;
use crate::types::{Clock, ItemProgress, Stage, SyncEvent};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error(transparent)]
    Output(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub results: Vec<SyncResult>,
    pub summary: SyncSummary,
    /// What was written, or what would have been written on a dry run.
    pub manifest: Manifest,
    /// `None` on a dry run.
    pub manifest_path: Option<PathBuf>,
}

/// Acquire → transform → map → write, for one configured source.
pub struct SyncPipeline {
    output_dir: PathBuf,
    rules: PathRules,
    mapper: PathMapper,
    transform: HtmlTransform,
    acquirer: Box<dyn Acquirer>,
    clock: Clock,
}

/// A document that made it through acquisition, or the reason it did not.
type Prepared = Result<OutputDocument, SyncResult>;

impl SyncPipeline {
    pub fn from_config(
        config: &SyncConfig,
        fetcher: Arc<dyn Fetcher>,
        cloner: Arc<dyn RepositoryCloner>,
        clock: Clock,
    ) -> Self {
        let acquirer = acquirer_for(config, fetcher, cloner, clock.clone());
        Self::with_acquirer(config, acquirer, clock)
    }

    pub fn with_acquirer(config: &SyncConfig, acquirer: Box<dyn Acquirer>, clock: Clock) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            rules: config.path_rules.clone(),
            mapper: PathMapper::new(config.path_rules.strip_prefix.as_deref()),
            transform: HtmlTransform::new(&config.selectors),
            acquirer,
            clock,
        }
    }

    pub async fn run(&self, dry_run: bool, sink: &dyn ProgressSink) -> Result<SyncReport, SyncError> {
        let acquisition = self.acquirer.acquire(sink).await?;
        let synced_at = (self.clock)();

        let mut prepared = Vec::new();
        for item in acquisition.items {
            match item {
                Ok(item) => prepared.extend(self.prepare(item, &synced_at).into_iter().map(Ok)),
                Err(failure) => prepared.push(Err(self.failed(failure))),
            }
        }
        let prepared = last_write_wins(prepared);

        let writer = if dry_run {
            None
        } else {
            ensure_output_dir(&self.output_dir)?;
            Some(DocumentWriter::new(self.output_dir.clone()))
        };

        let mut results = Vec::with_capacity(prepared.len());
        let mut hashes = Vec::new();
        for (index, entry) in prepared.into_iter().enumerate() {
            let hash = entry.as_ref().ok().and_then(|doc| doc.content_hash.clone());
            let result = match entry {
                Err(failed) => failed,
                Ok(document) => match &writer {
                    None => SyncResult::skipped(&document, "dry run"),
                    Some(writer) => {
                        sink.emit(SyncEvent::Progress(ItemProgress {
                            item: index,
                            stage: Stage::Writing,
                            bytes: Some(document.size_bytes),
                        }));
                        match writer.write(&document.output_path, &document.content) {
                            Ok(status) => SyncResult::written(&document, status),
                            Err(err) => {
                                sync_warn!("{}", err);
                                SyncResult::failed(
                                    document.output_path.clone(),
                                    document.title.clone(),
                                    err.to_string(),
                                )
                            }
                        }
                    }
                },
            };
            if let Some(hash) = hash.filter(|_| listed(&result, dry_run)) {
                hashes.push((result.output_path.clone(), hash));
            }
            sync_debug!("{} {}", result.status, result.output_path);
            sink.emit(SyncEvent::ItemCompleted(result.clone()));
            results.push(result);
        }

        let mut manifest = Manifest::new(
            acquisition.source,
            synced_at,
            results
                .iter()
                .filter(|r| listed(r, dry_run))
                .map(|r| r.output_path.clone()),
        );
        manifest.source_path = acquisition.source_path;
        manifest.commit = acquisition.commit;
        manifest.hashes = hashes.into_iter().collect();

        let manifest_path = match &writer {
            Some(writer) => Some(writer.write_manifest(&manifest)?),
            None => None,
        };

        let summary = SyncSummary::from_results(&results);
        sync_info!("{}", summary);
        Ok(SyncReport {
            results,
            summary,
            manifest,
            manifest_path,
        })
    }

    /// Turns one acquired item into zero or more output documents.
    fn prepare(&self, item: AcquiredItem, synced_at: &str) -> Vec<OutputDocument> {
        let AcquiredItem {
            document,
            form,
            origin_url,
            title,
            content_hash: hash,
        } = item;
        let origin = origin_url.as_deref().unwrap_or(&document.logical_path);

        let (content, title) = match form {
            ContentForm::Markdown | ContentForm::Rendered => (document.raw_content, title),
            ContentForm::FetchedMarkdown => (with_source_line(origin, &document.raw_content), title),
            ContentForm::Html => {
                let output_path = self.mapper.map(&document.logical_path);
                let rendered = self.transform.render(
                    &document.raw_content,
                    origin,
                    title.as_deref(),
                    file_stem(&output_path),
                    synced_at,
                );
                (rendered.markdown, Some(rendered.title))
            }
            ContentForm::Sectioned => {
                let sections = parse_sections(&document.raw_content);
                sync_info!(
                    "split {} into {} sections",
                    document.logical_path,
                    sections.len()
                );
                return sections
                    .iter()
                    .filter(|(path, _)| self.rules.includes_section(path))
                    .map(|(path, body)| {
                        let section_hash = hash.as_ref().map(|_| content_hash(body));
                        self.output_document(path, body.to_string(), None, section_hash)
                    })
                    .collect();
            }
        };
        vec![self.output_document(&document.logical_path, content, title, hash)]
    }

    fn output_document(
        &self,
        logical_path: &str,
        content: String,
        title: Option<String>,
        hash: Option<String>,
    ) -> OutputDocument {
        let output_path = self.mapper.map(logical_path);
        let title = title.unwrap_or_else(|| document_title(&content, &output_path));
        let mut document = OutputDocument::new(output_path, title, content);
        document.content_hash = hash;
        document
    }

    fn failed(&self, failure: ItemFailure) -> SyncResult {
        let output_path = self.mapper.map(&failure.logical_path);
        let title = failure
            .title
            .unwrap_or_else(|| file_stem(&output_path).to_string());
        SyncResult::failed(output_path, title, failure.error.to_string())
    }
}

/// Whether a result appears in the manifest. Dry runs list would-be files so the
/// reported manifest previews the real one.
fn listed(result: &SyncResult, dry_run: bool) -> bool {
    result.status.is_written() || (dry_run && result.status == SyncStatus::Skipped)
}

/// Later documents replace earlier ones that map to the same output path.
fn last_write_wins(prepared: Vec<Prepared>) -> Vec<Prepared> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Prepared> = Vec::with_capacity(prepared.len());
    for entry in prepared {
        let path = match &entry {
            Ok(document) => document.output_path.clone(),
            Err(result) => result.output_path.clone(),
        };
        match position.get(&path) {
            Some(&index) => {
                sync_warn!("{} produced more than once; keeping the last", path);
                kept[index] = entry;
            }
            None => {
                position.insert(path, kept.len());
                kept.push(entry);
            }
        }
    }
    kept
}

fn file_stem(output_path: &str) -> &str {
    output_path.strip_suffix(".md").unwrap_or(output_path)
}
