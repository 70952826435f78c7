use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Everything one sync run needs to know about a documentation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Short name used in logs and for `--source` selection.
    pub name: String,
    /// Directory that receives the markdown files and `manifest.json`.
    pub output_dir: PathBuf,
    pub source: SourceSpec,
    #[serde(default)]
    pub path_rules: PathRules,
    #[serde(default)]
    pub selectors: SelectorRules,
}

/// Which acquirer to use and where it points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSpec {
    /// Shallow clone of a git repository, reading markdown under `subdir`.
    Repository {
        url: String,
        #[serde(default)]
        reference: Option<String>,
        #[serde(default)]
        subdir: String,
    },
    /// One GET per path under `base_url`. `sectioned` marks an `llms.txt` style blob.
    DirectFetch {
        base_url: String,
        paths: Vec<String>,
        #[serde(default)]
        sectioned: bool,
    },
    /// HTML pages converted to markdown.
    HtmlScrape { pages: Vec<PageSpec> },
}

impl SourceSpec {
    /// Origin recorded as `source` in the manifest.
    pub fn locator(&self) -> String {
        match self {
            SourceSpec::Repository { url, .. } => url.clone(),
            SourceSpec::DirectFetch { base_url, .. } => base_url.clone(),
            SourceSpec::HtmlScrape { pages } => pages
                .first()
                .map(|page| page.url.clone())
                .unwrap_or_default(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceSpec::Repository { .. } => "repository",
            SourceSpec::DirectFetch { .. } => "direct-fetch",
            SourceSpec::HtmlScrape { .. } => "html-scrape",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub url: String,
    pub output_path: String,
    /// Overrides the page's own title when non-empty.
    #[serde(default)]
    pub title: String,
}

/// Path filtering and flattening rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRules {
    /// Prefix removed from logical paths before flattening.
    pub strip_prefix: Option<String>,
    /// File extensions (without dot) picked up from repositories.
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    /// File names never picked up.
    pub skip_files: Vec<String>,
    /// When non-empty, only `llms.txt` sections whose path starts with one of these are kept.
    pub include_prefixes: Vec<String>,
}

impl Default for PathRules {
    fn default() -> Self {
        Self {
            strip_prefix: None,
            extensions: vec!["md".to_string(), "mdx".to_string()],
            skip_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                ".github".to_string(),
            ],
            skip_files: Vec::new(),
            include_prefixes: Vec::new(),
        }
    }
}

impl PathRules {
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    pub fn includes_section(&self, path: &str) -> bool {
        self.include_prefixes.is_empty()
            || self
                .include_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// CSS selectors steering main-content extraction for HTML pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorRules {
    /// Tried in order; the first match becomes the content root.
    pub candidates: Vec<String>,
    /// Every match under the content root is removed.
    pub remove: Vec<String>,
}

impl Default for SelectorRules {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            candidates: strings(&[
                "main article",
                "article",
                "main",
                "[role=\"main\"]",
                ".content",
                "#content",
            ]),
            remove: strings(&[
                "nav",
                "header",
                "footer",
                "aside",
                "script",
                "style",
                "noscript",
                ".sidebar",
                ".breadcrumbs",
            ]),
        }
    }
}
