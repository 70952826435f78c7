use std::sync::Arc;

use docsync_core::SourceDocument;
use sync_logging::{sync_debug, sync_info, sync_warn};
use url::Url;

use super::{AcquireError, AcquiredItem, Acquirer, Acquisition, ContentForm, ItemFailure};
use crate::decode::decode_fetched;
use crate::fetch::{Fetcher, ProgressSink};
use crate::hash::content_hash;

/// Fetches each configured path relative to a base URL, one request per path.
pub struct DirectFetchAcquirer {
    base_url: String,
    paths: Vec<String>,
    sectioned: bool,
    fetcher: Arc<dyn Fetcher>,
}

impl DirectFetchAcquirer {
    pub fn new(
        base_url: String,
        paths: Vec<String>,
        sectioned: bool,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            base_url,
            paths,
            sectioned,
            fetcher,
        }
    }

    fn item_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn acquire_one(
        &self,
        index: usize,
        path: &str,
        sink: &dyn ProgressSink,
    ) -> Result<AcquiredItem, ItemFailure> {
        let url = self.item_url(path);
        let failure = |error| ItemFailure {
            logical_path: path.to_string(),
            title: None,
            error,
        };
        sync_debug!("fetching {}", url);
        let output = self
            .fetcher
            .fetch(index, &url, sink)
            .await
            .map_err(failure)?;
        let text = decode_fetched(&output).map_err(failure)?;

        let form = if self.sectioned {
            ContentForm::Sectioned
        } else if output.metadata.is_html() {
            ContentForm::Html
        } else {
            ContentForm::FetchedMarkdown
        };
        Ok(AcquiredItem {
            content_hash: Some(content_hash(&text.text)),
            document: SourceDocument::new(path, text.text),
            form,
            origin_url: Some(output.metadata.final_url),
            title: None,
        })
    }
}

#[async_trait::async_trait]
impl Acquirer for DirectFetchAcquirer {
    async fn acquire(&self, sink: &dyn ProgressSink) -> Result<Acquisition, AcquireError> {
        Url::parse(&self.base_url).map_err(|err| AcquireError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: err.to_string(),
        })?;

        let mut acquisition = Acquisition::new(self.base_url.clone());
        for (index, path) in self.paths.iter().enumerate() {
            let item = self.acquire_one(index, path, sink).await;
            if let Err(failure) = &item {
                sync_warn!("{} failed: {}", path, failure.error);
            }
            acquisition.items.push(item);
        }

        let fetched = acquisition.items.iter().filter(|i| i.is_ok()).count();
        sync_info!("fetched {}/{} paths from {}", fetched, self.paths.len(), self.base_url);
        Ok(acquisition)
    }
}
