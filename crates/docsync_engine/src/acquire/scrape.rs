use std::path::Path;
use std::sync::Arc;

use docsync_core::{PageSpec, SelectorRules, SourceDocument};
use sync_logging::{sync_info, sync_warn};

use super::{AcquireError, AcquiredItem, Acquirer, Acquisition, ContentForm, ItemFailure};
use crate::decode::decode_fetched;
use crate::fetch::{Fetcher, ProgressSink};
use crate::frontmatter::split_metadata_header;
use crate::hash::content_hash;
use crate::transform::HtmlTransform;
use crate::types::{Clock, ItemProgress, Stage, SyncEvent};

/// Fetches an explicit page list and renders each page's main content to markdown.
pub struct HtmlScrapeAcquirer {
    pages: Vec<PageSpec>,
    transform: HtmlTransform,
    fetcher: Arc<dyn Fetcher>,
    clock: Clock,
}

impl HtmlScrapeAcquirer {
    pub fn new(
        pages: Vec<PageSpec>,
        selectors: &SelectorRules,
        fetcher: Arc<dyn Fetcher>,
        clock: Clock,
    ) -> Self {
        Self {
            pages,
            transform: HtmlTransform::new(selectors),
            fetcher,
            clock,
        }
    }

    async fn acquire_page(
        &self,
        index: usize,
        page: &PageSpec,
        sink: &dyn ProgressSink,
    ) -> Result<AcquiredItem, ItemFailure> {
        let configured_title = Some(page.title.trim()).filter(|t| !t.is_empty());
        let failure = |error| ItemFailure {
            logical_path: page.output_path.clone(),
            title: configured_title.map(str::to_string),
            error,
        };
        let output = self
            .fetcher
            .fetch(index, &page.url, sink)
            .await
            .map_err(failure)?;
        let html = decode_fetched(&output).map_err(failure)?;

        sink.emit(SyncEvent::Progress(ItemProgress {
            item: index,
            stage: Stage::Converting,
            bytes: Some(output.metadata.byte_len),
        }));
        let fallback = Path::new(&page.output_path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| page.output_path.clone());
        let rendered = self.transform.render(
            &html.text,
            &page.url,
            configured_title,
            &fallback,
            &(self.clock)(),
        );

        Ok(AcquiredItem {
            content_hash: Some(content_hash(
                split_metadata_header(&rendered.markdown)
                    .map_or(rendered.markdown.as_str(), |(_, body)| body),
            )),
            document: SourceDocument::new(page.output_path.clone(), rendered.markdown),
            form: ContentForm::Rendered,
            origin_url: Some(page.url.clone()),
            title: Some(rendered.title),
        })
    }
}

#[async_trait::async_trait]
impl Acquirer for HtmlScrapeAcquirer {
    async fn acquire(&self, sink: &dyn ProgressSink) -> Result<Acquisition, AcquireError> {
        let mut acquisition = Acquisition::new(
            self.pages
                .first()
                .map(|page| page.url.clone())
                .unwrap_or_default(),
        );
        for (index, page) in self.pages.iter().enumerate() {
            let item = self.acquire_page(index, page, sink).await;
            if let Err(failure) = &item {
                sync_warn!("{} failed: {}", page.url, failure.error);
            }
            acquisition.items.push(item);
        }
        sync_info!(
            "scraped {}/{} pages",
            acquisition.items.iter().filter(|i| i.is_ok()).count(),
            self.pages.len()
        );
        Ok(acquisition)
    }
}
