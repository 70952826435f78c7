use std::fmt;
use std::sync::Arc;

use docsync_core::SyncResult;

/// Position of an item within one acquisition, in fetch order.
pub type ItemId = usize;

/// Produces the ISO-8601 timestamp recorded in headers and the manifest.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

pub fn utc_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Cloning,
    Scanning,
    Downloading,
    Converting,
    Writing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProgress {
    pub item: ItemId,
    pub stage: Stage,
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Progress(ItemProgress),
    ItemCompleted(SyncResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

impl FetchMetadata {
    /// True when the server labelled the body as HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(media_type)
            .is_some_and(|ct| ct == "text/html" || ct == "application/xhtml+xml")
    }
}

/// `text/html; charset=utf-8` -> `text/html`.
pub(crate) fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Why fetching or decoding one item failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    /// Body exceeded `max_bytes`; `actual` is the declared or received length.
    TooLarge { max_bytes: u64, actual: u64 },
    UnsupportedContentType { content_type: String },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => f.write_str("invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http {code}"),
            FailureKind::Timeout => f.write_str("timed out"),
            FailureKind::RedirectLimitExceeded => f.write_str("too many redirects"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "body of {actual} bytes exceeds limit of {max_bytes}")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "content type {content_type} not accepted")
            }
            FailureKind::Decode => f.write_str("undecodable body"),
            FailureKind::Network => f.write_str("network error"),
        }
    }
}
