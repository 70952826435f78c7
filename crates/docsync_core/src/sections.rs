use sync_logging::sync_warn;

/// Ordered `path -> body` mapping produced from an `llms.txt` blob.
///
/// Keeps first-occurrence order; re-inserting a path replaces its body in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<(String, String)>,
}

impl Sections {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, body)| body.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, b)| (p.as_str(), b.as_str()))
    }

    /// Returns true if `path` was already present.
    fn insert(&mut self, path: String, body: String) -> bool {
        if let Some(slot) = self.entries.iter_mut().find(|(p, _)| *p == path) {
            slot.1 = body;
            true
        } else {
            self.entries.push((path, body));
            false
        }
    }
}

impl IntoIterator for Sections {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Split an `llms.txt` blob at `===/<path>===` delimiter lines.
///
/// Text before the first delimiter is discarded and bodies that trim to
/// nothing are dropped. A repeated path keeps the later body.
pub fn parse_sections(blob: &str) -> Sections {
    let mut sections = Sections::default();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in blob.lines() {
        if let Some(path) = delimiter_path(line) {
            if let Some((path, body)) = current.take() {
                push_section(&mut sections, path, &body);
            }
            current = Some((path.to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((path, body)) = current.take() {
        push_section(&mut sections, path, &body);
    }

    sections
}

fn delimiter_path(line: &str) -> Option<&str> {
    line.trim_end()
        .strip_prefix("===/")?
        .strip_suffix("===")
        .filter(|path| !path.is_empty())
}

fn push_section(sections: &mut Sections, path: String, lines: &[&str]) {
    let body = lines.join("\n");
    let body = body.trim();
    if body.is_empty() {
        return;
    }
    if sections.insert(path.clone(), body.to_string()) {
        sync_warn!("duplicate llms.txt section '{}'; keeping the later body", path);
    }
}
