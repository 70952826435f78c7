use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use sync_logging::{sync_trace, sync_warn};

/// Parsed page plus the node chosen as its main content.
#[derive(Debug)]
pub struct ContentTree {
    document: Html,
    root: NodeId,
    title: Option<String>,
}

impl ContentTree {
    pub fn root(&self) -> ElementRef<'_> {
        self.document
            .tree
            .get(self.root)
            .and_then(ElementRef::wrap)
            .unwrap_or_else(|| self.document.root_element())
    }

    /// `<title>` text, or the first `<h1>` under the content root.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn inner_html(&self) -> String {
        self.root().inner_html()
    }
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> ContentTree;
}

/// Picks the first matching candidate selector as content root (else `<body>`, else the
/// whole document) and detaches everything under it matching a remove selector.
#[derive(Debug, Clone, Default)]
pub struct SelectorExtractor {
    candidates: Vec<String>,
    remove: Vec<String>,
}

impl SelectorExtractor {
    /// Selectors that fail to parse are reported once here and ignored afterwards.
    pub fn new(candidates: &[String], remove: &[String]) -> Self {
        Self {
            candidates: valid_selectors(candidates),
            remove: valid_selectors(remove),
        }
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str) -> ContentTree {
        let mut document = Html::parse_document(html);
        let candidates = parse_all(&self.candidates);
        let removals = parse_all(&self.remove);

        let root = candidates
            .iter()
            .find_map(|sel| document.select(sel).next())
            .or_else(|| {
                let body = Selector::parse("body").ok()?;
                document.select(&body).next()
            })
            .unwrap_or_else(|| document.root_element())
            .id();

        let doomed: Vec<NodeId> = match document.tree.get(root).and_then(ElementRef::wrap) {
            Some(root_el) => removals
                .iter()
                .flat_map(|sel| root_el.select(sel).map(|el| el.id()))
                .collect(),
            None => Vec::new(),
        };
        sync_trace!("detaching {} boilerplate nodes", doomed.len());
        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let title = page_title(&document, root);
        ContentTree {
            document,
            root,
            title,
        }
    }
}

fn page_title(document: &Html, root: NodeId) -> Option<String> {
    let text_of = |el: ElementRef<'_>| {
        let text = el.text().collect::<Vec<_>>().join(" ");
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    };

    let title_sel = Selector::parse("title").ok()?;
    if let Some(title) = document.select(&title_sel).next().and_then(text_of) {
        return Some(title);
    }
    let h1 = Selector::parse("h1").ok()?;
    document
        .tree
        .get(root)
        .and_then(ElementRef::wrap)?
        .select(&h1)
        .next()
        .and_then(text_of)
}

fn valid_selectors(raw: &[String]) -> Vec<String> {
    raw.iter()
        .filter(|s| match Selector::parse(s) {
            Ok(_) => true,
            Err(err) => {
                sync_warn!("ignoring invalid selector '{}': {}", s, err);
                false
            }
        })
        .cloned()
        .collect()
}

fn parse_all(raw: &[String]) -> Vec<Selector> {
    raw.iter().filter_map(|s| Selector::parse(s).ok()).collect()
}
