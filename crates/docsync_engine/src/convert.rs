use std::collections::HashMap;

use html2md::common::get_tag_attr;
use html2md::lists::ListItemHandler;
use html2md::{Handle, NodeData, StructuredPrinter, TagHandler, TagHandlerFactory};
use url::Url;

use crate::extract::ContentTree;

pub trait MarkdownConverter: Send + Sync {
    fn to_markdown(&self, tree: &ContentTree, base_url: Option<&str>) -> String;
}

/// `html2md` with ATX headings, language-tagged code fences and links resolved
/// against the page URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct FencedMarkdownConverter;

impl MarkdownConverter for FencedMarkdownConverter {
    fn to_markdown(&self, tree: &ContentTree, base_url: Option<&str>) -> String {
        let base = base_url.and_then(|b| Url::parse(b).ok());
        let markdown = html2md::parse_html_custom(&tree.inner_html(), &handlers(base));
        if markdown.is_empty() {
            markdown
        } else {
            markdown + "\n"
        }
    }
}

type Factories = HashMap<String, Box<dyn TagHandlerFactory>>;

struct Factory<F>(F);

impl<F> TagHandlerFactory for Factory<F>
where
    F: Fn() -> Box<dyn TagHandler>,
{
    fn instantiate(&self) -> Box<dyn TagHandler> {
        (self.0)()
    }
}

fn handlers(base: Option<Url>) -> Factories {
    let mut factories: Factories = HashMap::new();
    let mut register = |tags: &[&str], make: fn(Option<Url>) -> Box<dyn TagHandler>| {
        for tag in tags {
            let base = base.clone();
            factories.insert(tag.to_string(), Box::new(Factory(move || make(base.clone()))));
        }
    };

    register(&["h1", "h2", "h3", "h4", "h5", "h6"], |_| {
        Box::new(AtxHeading::default())
    });
    register(&["pre"], |_| Box::new(FencedBlock));
    register(&["p"], |_| Box::new(Paragraph::default()));
    register(&["li"], |_| Box::new(DashListItem::default()));
    register(&["a"], |base| Box::new(Link::new(base)));
    register(&["img"], |base| Box::new(Image { base }));
    register(
        &["script", "style", "noscript", "iframe", "template", "svg"],
        |_| Box::new(Dropped),
    );
    factories
}

fn tag_name(handle: &Handle) -> String {
    match handle.data {
        NodeData::Element { ref name, .. } => name.local.to_string(),
        _ => String::new(),
    }
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { ref contents } = handle.data {
        out.push_str(&contents.borrow().to_string());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn first_descendant(handle: &Handle, name: &str) -> Option<Handle> {
    handle.children.borrow().iter().find_map(|child| {
        if tag_name(child) == name {
            Some(child.clone())
        } else {
            first_descendant(child, name)
        }
    })
}

/// `#`..`######` on a single line; `<br>` and newlines inside become spaces.
#[derive(Default)]
struct AtxHeading {
    block_start: usize,
    text_start: usize,
}

impl TagHandler for AtxHeading {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        let level = tag_name(tag)
            .strip_prefix('h')
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(1);
        self.block_start = printer.data.len();
        printer.append_str("\n\n");
        printer.append_str(&"#".repeat(level));
        printer.append_str(" ");
        self.text_start = printer.data.len();
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        let text = printer.data.split_off(self.text_start);
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            printer.data.truncate(self.block_start);
            return;
        }
        printer.append_str(&text);
        printer.append_str("\n\n");
    }
}

/// Fenced code block whose info string comes from `language-*`, then `data-lang`.
struct FencedBlock;

impl FencedBlock {
    fn language(pre: &Handle, code: Option<&Handle>) -> String {
        let from_class = code
            .and_then(|code| get_tag_attr(code, "class"))
            .and_then(|classes| {
                classes
                    .split_whitespace()
                    .find_map(|class| class.strip_prefix("language-"))
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_string)
            });
        from_class
            .or_else(|| code.and_then(|code| get_tag_attr(code, "data-lang")))
            .or_else(|| get_tag_attr(pre, "data-lang"))
            .map(|lang| lang.trim().to_string())
            .unwrap_or_default()
    }
}

impl TagHandler for FencedBlock {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        let code = first_descendant(tag, "code");
        let language = Self::language(tag, code.as_ref());
        let mut body = String::new();
        collect_text(code.as_ref().unwrap_or(tag), &mut body);
        let body = body.trim();

        let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);
        printer.append_str("\n\n");
        printer.append_str(&fence);
        printer.append_str(&language);
        printer.insert_newline();
        if !body.is_empty() {
            printer.append_str(body);
            printer.insert_newline();
        }
        printer.append_str(&fence);
        printer.append_str("\n\n");
    }

    fn after_handle(&mut self, _printer: &mut StructuredPrinter) {}

    fn skip_descendants(&self) -> bool {
        true
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c: char| c != '`').map(str::len).max().unwrap_or(0)
}

/// Paragraph that also escapes a leading `1.` / `1)` so it stays plain text.
#[derive(Default)]
struct Paragraph {
    start: usize,
}

impl TagHandler for Paragraph {
    fn handle(&mut self, _tag: &Handle, printer: &mut StructuredPrinter) {
        printer.append_str("\n\n");
        self.start = printer.data.len();
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        let text = &printer.data[self.start..];
        let indent = text.len() - text.trim_start().len();
        let digits = text[indent..].bytes().take_while(u8::is_ascii_digit).count();
        let marker = indent + digits;
        let is_marker = (1..=9).contains(&digits)
            && matches!(text.as_bytes().get(marker), Some(b'.' | b')'))
            && text.as_bytes().get(marker + 1).is_none_or(u8::is_ascii_whitespace);
        if is_marker {
            printer.insert_str(self.start + marker, "\\");
        }
        printer.append_str("\n\n");
    }
}

/// `html2md` list items with `-` instead of `*` bullets.
#[derive(Default)]
struct DashListItem {
    inner: ListItemHandler,
}

impl TagHandler for DashListItem {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        let before = printer.data.len();
        self.inner.handle(tag, printer);
        if printer.data[before..].ends_with("* ") {
            let bullet = printer.data.len() - 2;
            printer.data.replace_range(bullet..bullet + 1, "-");
        }
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        self.inner.after_handle(printer);
    }
}

/// `[text](url)` with the target resolved; unresolvable anchors keep only their text.
struct Link {
    base: Option<Url>,
    target: Option<String>,
    start: usize,
}

impl Link {
    fn new(base: Option<Url>) -> Self {
        Self {
            base,
            target: None,
            start: 0,
        }
    }
}

impl TagHandler for Link {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        self.target =
            get_tag_attr(tag, "href").and_then(|href| resolve_url(&href, self.base.as_ref()));
        self.start = printer.data.len();
    }

    fn after_handle(&mut self, printer: &mut StructuredPrinter) {
        let Some(target) = self.target.take() else {
            return;
        };
        let text = printer.data.split_off(self.start);
        let label = text.trim();
        let label = if label.is_empty() { target.as_str() } else { label };
        let leading = if text.starts_with(char::is_whitespace) { " " } else { "" };
        let trailing = if text.ends_with(char::is_whitespace) { " " } else { "" };
        printer.append_str(&format!("{leading}[{label}]({target}){trailing}"));
    }
}

struct Image {
    base: Option<Url>,
}

impl TagHandler for Image {
    fn handle(&mut self, tag: &Handle, printer: &mut StructuredPrinter) {
        let Some(src) = get_tag_attr(tag, "src").and_then(|src| resolve_url(&src, self.base.as_ref()))
        else {
            return;
        };
        let alt = get_tag_attr(tag, "alt").unwrap_or_default();
        printer.append_str(&format!("![{}]({})", alt.trim(), src.replace(' ', "%20")));
    }

    fn after_handle(&mut self, _printer: &mut StructuredPrinter) {}
}

/// Emits nothing for the element or anything inside it.
struct Dropped;

impl TagHandler for Dropped {
    fn handle(&mut self, _tag: &Handle, _printer: &mut StructuredPrinter) {}

    fn after_handle(&mut self, _printer: &mut StructuredPrinter) {}

    fn skip_descendants(&self) -> bool {
        true
    }
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    let lower = trimmed.to_ascii_lowercase();
    if trimmed.is_empty() || lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    match base {
        Some(base) => base.join(trimmed).ok().map(Into::into),
        None => Some(trimmed.to_string()),
    }
}
