use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use docsync_core::SyncConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    sources: Vec<SyncConfig>,
}

/// Reads every source from a RON config file.
///
/// Relative `output_dir` values are resolved against the directory holding the file,
/// so a config behaves the same whatever the working directory.
pub fn load_config(path: &Path) -> Result<Vec<SyncConfig>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let file: ConfigFile =
        ron::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))?;

    if file.sources.is_empty() {
        bail!("{} defines no sources", path.display());
    }
    let mut names = HashSet::new();
    for source in &file.sources {
        if !names.insert(source.name.as_str()) {
            bail!("source name '{}' appears more than once", source.name);
        }
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(file
        .sources
        .into_iter()
        .map(|mut source| {
            if source.output_dir.is_relative() {
                source.output_dir = base.join(&source.output_dir);
            }
            source
        })
        .collect())
}

/// Keeps only the sources named on the command line, in config order. No names keeps all.
pub fn select_sources(sources: Vec<SyncConfig>, wanted: &[String]) -> Result<Vec<SyncConfig>> {
    if wanted.is_empty() {
        return Ok(sources);
    }
    if let Some(unknown) = wanted
        .iter()
        .find(|name| !sources.iter().any(|s| &s.name == *name))
    {
        bail!("no source named '{unknown}' in config");
    }
    Ok(sources
        .into_iter()
        .filter(|s| wanted.contains(&s.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{load_config, select_sources};
    use pretty_assertions::assert_eq;

    const TWO_SOURCES: &str = r#"(
        sources: [
            (
                name: "sdk",
                output_dir: "out/sdk",
                source: Repository(url: "https://github.com/example/sdk.git", subdir: "docs"),
            ),
            (
                name: "api",
                output_dir: "/abs/api",
                source: DirectFetch(base_url: "https://docs.example.com", paths: ["llms-full.txt"], sectioned: true),
                path_rules: (include_prefixes: ["api/"]),
            ),
        ],
    )"#;

    fn write_config(text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docsync.ron");
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn relative_output_dir_resolves_against_config_dir() {
        let (dir, path) = write_config(TWO_SOURCES);
        let sources = load_config(&path).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].output_dir, dir.path().join("out/sdk"));
        assert_eq!(sources[1].output_dir, PathBuf::from("/abs/api"));
        assert_eq!(sources[1].path_rules.include_prefixes, vec!["api/"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let (_dir, path) = write_config(
            r#"(sources: [
                (name: "a", output_dir: "x", source: HtmlScrape(pages: [])),
                (name: "a", output_dir: "y", source: HtmlScrape(pages: [])),
            ])"#,
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_config(std::path::Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.ron"));
    }

    #[test]
    fn selection_filters_and_rejects_unknown_names() {
        let (_dir, path) = write_config(TWO_SOURCES);
        let sources = load_config(&path).unwrap();

        let picked = select_sources(sources.clone(), &["api".to_string()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "api");

        assert_eq!(select_sources(sources.clone(), &[]).unwrap().len(), 2);
        assert!(select_sources(sources, &["nope".to_string()]).is_err());
    }
}
