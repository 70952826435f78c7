use std::path::Path;

/// Prefix `body` with a `---` delimited `title/source/synced` header.
pub fn with_metadata_header(title: &str, source: &str, synced: &str, body: &str) -> String {
    format!(
        "---\ntitle: {title}\nsource: {source}\nsynced: {synced}\n---\n\n{body}",
        title = yaml_scalar(title),
        source = yaml_scalar(source),
        synced = synced,
        body = body
    )
}

/// Prefix `body` with a single `<!-- source: URL -->` line.
pub fn with_source_line(source: &str, body: &str) -> String {
    format!("<!-- source: {source} -->\n\n{body}")
}

/// Splits a document carrying the header from [`with_metadata_header`] into its
/// `title`/`source` lines and its body, leaving out the `synced:` stamp.
/// Any other leading `---` block yields `None`.
pub fn split_metadata_header(markdown: &str) -> Option<(&str, &str)> {
    let rest = markdown.strip_prefix("---\n")?;
    let source_end = keyed_line_end(rest, "title: ")?;
    let synced_start = source_end + keyed_line_end(&rest[source_end..], "source: ")?;
    let synced_end = synced_start + keyed_line_end(&rest[synced_start..], "synced: ")?;
    let body = rest[synced_end..].strip_prefix("---\n")?;
    Some((&rest[..synced_start], body.strip_prefix('\n').unwrap_or(body)))
}

fn keyed_line_end(text: &str, key: &str) -> Option<usize> {
    if !text.starts_with(key) {
        return None;
    }
    text.find('\n').map(|idx| idx + 1)
}

/// Body without a leading `---` header block, or the input unchanged if there is none.
pub fn strip_frontmatter(markdown: &str) -> &str {
    let prefix = "---\n";
    if let Some(rest) = markdown.strip_prefix(prefix) {
        if let Some(idx) = rest.find("\n---") {
            let mut after = &rest[idx + "\n---".len()..];
            if after.starts_with('\n') {
                after = &after[1..];
            }
            return after.trim_start_matches('\n');
        }
    }
    markdown
}

/// Title for a document: header `title:`, else first `# ` heading, else the file stem.
pub fn document_title(markdown: &str, output_path: &str) -> String {
    header_field(markdown, "title")
        .or_else(|| first_heading(strip_frontmatter(markdown)))
        .unwrap_or_else(|| {
            Path::new(output_path)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| output_path.to_string())
        })
}

fn header_field(markdown: &str, key: &str) -> Option<String> {
    let rest = markdown.strip_prefix("---\n")?;
    let header = &rest[..rest.find("\n---")?];
    header.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        let value = v.trim().trim_matches('"');
        (k.trim() == key && !value.is_empty()).then(|| value.to_string())
    })
}

fn first_heading(markdown: &str) -> Option<String> {
    let mut in_fence = false;
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("# ") {
            let text = text.trim().trim_end_matches('#').trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.contains(": ")
        || value.contains('#')
        || value.starts_with(['"', '\'', '[', '{', '&', '*', '!', '|', '>', '%', '@', '`', '-', '?']);
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
