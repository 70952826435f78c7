//! Docsync engine: acquisition, HTML conversion and output persistence.
mod acquire;
mod convert;
mod decode;
mod extract;
mod fetch;
mod frontmatter;
mod hash;
mod persist;
mod pipeline;
mod transform;
mod types;

pub use acquire::{
    acquirer_for, AcquireError, AcquiredItem, Acquirer, Acquisition, ContentForm,
    DirectFetchAcquirer, GitCloner, HtmlScrapeAcquirer, ItemFailure, RepositoryAcquirer,
    RepositoryCloner,
};
pub use convert::{FencedMarkdownConverter, MarkdownConverter};
pub use decode::{decode_body, decode_fetched, DecodeError, DecodedText};
pub use extract::{ContentTree, Extractor, SelectorExtractor};
pub use fetch::{FetchSettings, Fetcher, NullProgressSink, ProgressSink, ReqwestFetcher};
pub use frontmatter::{document_title, with_metadata_header, with_source_line};
pub use hash::content_hash;
pub use persist::{ensure_output_dir, DocumentWriter, PersistError};
pub use pipeline::{SyncError, SyncPipeline, SyncReport};
pub use transform::{HtmlTransform, RenderedPage};
pub use types::{
    utc_clock, Clock, FailureKind, FetchError, FetchMetadata, FetchOutput, ItemId, ItemProgress,
    Stage, SyncEvent,
};
