//! Acquirers obtain raw documentation from one origin.
//!
//! Individual item failures are carried inside [`Acquisition::items`]; an `Err` from
//! [`Acquirer::acquire`] means the whole source could not be read.
mod direct;
mod repository;
mod scrape;

use std::path::PathBuf;
use std::sync::Arc;

use docsync_core::{SourceDocument, SourceSpec, SyncConfig};

use crate::fetch::{Fetcher, ProgressSink};
use crate::types::{Clock, FetchError};

pub use direct::DirectFetchAcquirer;
pub use repository::{GitCloner, RepositoryAcquirer, RepositoryCloner};
pub use scrape::HtmlScrapeAcquirer;

/// What an acquired body still needs before it can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentForm {
    /// Markdown to be written as-is (repository files).
    Markdown,
    /// Markdown fetched from a URL; gets a one-line source header.
    FetchedMarkdown,
    /// Final markdown, header already attached.
    Rendered,
    /// HTML that still needs extraction and conversion.
    Html,
    /// An `llms.txt` blob to be split into sections.
    Sectioned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredItem {
    pub document: SourceDocument,
    pub form: ContentForm,
    pub origin_url: Option<String>,
    pub title: Option<String>,
    pub content_hash: Option<String>,
}

impl AcquiredItem {
    pub fn markdown(document: SourceDocument) -> Self {
        Self {
            document,
            form: ContentForm::Markdown,
            origin_url: None,
            title: None,
            content_hash: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub logical_path: String,
    pub title: Option<String>,
    pub error: FetchError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    /// Origin recorded as the manifest `source`.
    pub source: String,
    pub source_path: Option<String>,
    pub commit: Option<String>,
    pub items: Vec<Result<AcquiredItem, ItemFailure>>,
}

impl Acquisition {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_path: None,
            commit: None,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("could not create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
    #[error("git {action} failed for {repo}: {message}")]
    Git {
        action: &'static str,
        repo: String,
        message: String,
    },
    #[error("source directory {0} does not exist in the repository")]
    MissingSourceDir(PathBuf),
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("invalid base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

#[async_trait::async_trait]
pub trait Acquirer: Send + Sync {
    async fn acquire(&self, sink: &dyn ProgressSink) -> Result<Acquisition, AcquireError>;
}

/// Picks the acquirer variant named by `config.source`.
pub fn acquirer_for(
    config: &SyncConfig,
    fetcher: Arc<dyn Fetcher>,
    cloner: Arc<dyn RepositoryCloner>,
    clock: Clock,
) -> Box<dyn Acquirer> {
    match &config.source {
        SourceSpec::Repository {
            url,
            reference,
            subdir,
        } => Box::new(RepositoryAcquirer::new(
            url.clone(),
            reference.clone(),
            subdir.clone(),
            config.path_rules.clone(),
            cloner,
        )),
        SourceSpec::DirectFetch {
            base_url,
            paths,
            sectioned,
        } => Box::new(DirectFetchAcquirer::new(
            base_url.clone(),
            paths.clone(),
            *sectioned,
            fetcher,
        )),
        SourceSpec::HtmlScrape { pages } => Box::new(HtmlScrapeAcquirer::new(
            pages.clone(),
            &config.selectors,
            fetcher,
            clock,
        )),
    }
}
