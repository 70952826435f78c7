use docsync_core::SelectorRules;

use crate::convert::{FencedMarkdownConverter, MarkdownConverter};
use crate::extract::{Extractor, SelectorExtractor};
use crate::frontmatter::with_metadata_header;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub title: String,
    /// Markdown including the metadata header.
    pub markdown: String,
}

/// Extractor + converter + header, applied to one HTML page.
#[derive(Debug, Clone)]
pub struct HtmlTransform {
    extractor: SelectorExtractor,
    converter: FencedMarkdownConverter,
}

impl HtmlTransform {
    pub fn new(selectors: &SelectorRules) -> Self {
        Self {
            extractor: SelectorExtractor::new(&selectors.candidates, &selectors.remove),
            converter: FencedMarkdownConverter,
        }
    }

    /// `title` wins over the page's own title; `fallback_title` is used when neither exists.
    pub fn render(
        &self,
        html: &str,
        source_url: &str,
        title: Option<&str>,
        fallback_title: &str,
        synced: &str,
    ) -> RenderedPage {
        let tree = self.extractor.extract(html);
        let body = self.converter.to_markdown(&tree, Some(source_url));
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or(tree.title())
            .unwrap_or(fallback_title)
            .to_string();
        let markdown = with_metadata_header(&title, source_url, synced, &body);
        RenderedPage { title, markdown }
    }
}
