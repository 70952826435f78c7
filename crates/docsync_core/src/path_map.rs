/// Maps a document's logical path to a flat output filename.
///
/// `docs/guides/setup.mdx` with prefix `docs/` becomes `guides-setup.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMapper {
    strip_prefix: Option<String>,
}

impl PathMapper {
    pub fn new(strip_prefix: Option<&str>) -> Self {
        Self {
            strip_prefix: strip_prefix.filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    pub fn map(&self, logical_path: &str) -> String {
        let stripped = match self.strip_prefix.as_deref() {
            Some(prefix) => logical_path.strip_prefix(prefix).unwrap_or(logical_path),
            None => logical_path,
        };

        let flattened = flatten_separators(stripped);
        let trimmed = flattened.trim_matches('-');
        let stem = if trimmed.is_empty() { "index" } else { trimmed };
        normalize_extension(stem)
    }
}

fn flatten_separators(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_dash = false;
    for c in input.chars() {
        let c = if c == '/' || c == '\\' { '-' } else { c };
        if c == '-' {
            if !prev_dash {
                out.push(c);
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }
    out
}

fn normalize_extension(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".mdx") {
        format!("{}.md", &name[..name.len() - ".mdx".len()])
    } else if lower.ends_with(".md") {
        format!("{}.md", &name[..name.len() - ".md".len()])
    } else {
        format!("{name}.md")
    }
}
