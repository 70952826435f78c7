use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use sync_logging::{sync_debug, sync_trace};

use crate::types::media_type;
use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput, ItemId, ItemProgress, Stage, SyncEvent};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    /// Whole-request budget, body included.
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Media types accepted when the server sends a Content-Type. Empty accepts anything.
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
            allowed_content_types: [
                "text/html",
                "application/xhtml+xml",
                "text/plain",
                "text/markdown",
                "text/x-markdown",
            ]
            .iter()
            .map(|ct| ct.to_string())
            .collect(),
            user_agent: concat!("docsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Receives progress and completion events while a source is synced.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: SyncEvent) {}
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// One GET of `url`; `item` tags the progress events sent to `sink`.
    async fn fetch(
        &self,
        item: ItemId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError>;
}

/// Single-attempt HTTP GET with a size cap, a content-type allow-list and a bounded
/// number of redirects.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    /// A client whose redirect policy records the hop count into `hops`.
    fn client(&self, hops: Arc<AtomicUsize>) -> Result<Client, FetchError> {
        let limit = self.settings.redirect_limit;
        let policy = Policy::custom(move |attempt| {
            let previous = attempt.previous().len();
            hops.store(previous, Ordering::Relaxed);
            if previous < limit {
                attempt.follow()
            } else {
                attempt.error("redirect limit exceeded")
            }
        });

        Client::builder()
            .user_agent(self.settings.user_agent.as_str())
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(FetchError::from)
    }

    /// Status, declared length and content type; returns the Content-Type header if any.
    fn check_head(&self, url: &str, response: &Response) -> Result<Option<String>, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{url} returned {status}"),
            ));
        }
        if let Some(declared) = response.content_length() {
            self.check_size(declared)?;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        match content_type.as_deref() {
            Some(ct) if !self.accepts(ct) => Err(FetchError::new(
                FailureKind::UnsupportedContentType {
                    content_type: media_type(ct),
                },
                format!("{url} served {ct}"),
            )),
            _ => Ok(content_type),
        }
    }

    fn accepts(&self, content_type: &str) -> bool {
        let wanted = media_type(content_type);
        let allowed = &self.settings.allowed_content_types;
        allowed.is_empty() || allowed.iter().any(|ct| ct.eq_ignore_ascii_case(&wanted))
    }

    fn check_size(&self, len: u64) -> Result<(), FetchError> {
        let max_bytes = self.settings.max_bytes;
        if len <= max_bytes {
            return Ok(());
        }
        Err(FetchError::new(
            FailureKind::TooLarge {
                max_bytes,
                actual: len,
            },
            "response too large",
        ))
    }

    /// Streams the body, giving up as soon as it grows past the cap.
    async fn read_body(
        &self,
        item: ItemId,
        response: Response,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<u8>, FetchError> {
        let report = |bytes: usize| {
            sink.emit(SyncEvent::Progress(ItemProgress {
                item,
                stage: Stage::Downloading,
                bytes: Some(bytes as u64),
            }))
        };

        report(0);
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            self.check_size((body.len() + chunk.len()) as u64)?;
            body.extend_from_slice(&chunk);
            report(body.len());
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        item: ItemId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        let target = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{url}: {err}")))?;
        let hops = Arc::new(AtomicUsize::new(0));
        let client = self.client(hops.clone())?;

        sync_debug!("GET {}", target);
        let response = client.get(target).send().await?;
        let content_type = self.check_head(url, &response)?;
        let final_url = response.url().to_string();
        let bytes = self.read_body(item, response, sink).await?;
        sync_trace!("{} -> {} bytes", final_url, bytes.len());

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url,
                redirect_count: hops.load(Ordering::Relaxed),
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_redirect() {
            FailureKind::RedirectLimitExceeded
        } else {
            FailureKind::Network
        };
        FetchError::new(kind, err.to_string())
    }
}
