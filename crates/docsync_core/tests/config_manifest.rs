use docsync_core::{
    Manifest, OutputDocument, PathRules, SelectorRules, SourceSpec, SyncConfig, SyncResult,
    SyncStatus, SyncSummary,
};
use pretty_assertions::assert_eq;

#[test]
fn config_parses_with_defaults() {
    let text = r#"(
        name: "sdk-docs",
        output_dir: "skills/sdk/resources",
        source: Repository(url: "https://github.com/example/sdk.git", subdir: "docs"),
        path_rules: (strip_prefix: Some("docs/")),
    )"#;
    let config: SyncConfig = ron::from_str(text).unwrap();

    assert_eq!(config.name, "sdk-docs");
    assert_eq!(
        config.source,
        SourceSpec::Repository {
            url: "https://github.com/example/sdk.git".to_string(),
            reference: None,
            subdir: "docs".to_string(),
        }
    );
    assert_eq!(config.path_rules.strip_prefix.as_deref(), Some("docs/"));
    assert_eq!(config.path_rules.extensions, PathRules::default().extensions);
    assert_eq!(config.selectors, SelectorRules::default());
}

#[test]
fn path_rules_filter_extensions_and_sections() {
    let rules = PathRules {
        include_prefixes: vec!["api/".to_string()],
        ..PathRules::default()
    };
    assert!(rules.accepts_extension("MDX"));
    assert!(!rules.accepts_extension("txt"));
    assert!(rules.includes_section("api/messages"));
    assert!(!rules.includes_section("blog/post"));
    assert!(PathRules::default().includes_section("anything"));
}

#[test]
fn manifest_serializes_camel_case_and_sorted() {
    let mut manifest = Manifest::new(
        "https://github.com/example/sdk.git",
        "2024-01-01T00:00:00Z",
        vec!["sub-b.md".to_string(), "a.md".to_string()],
    );
    manifest.source_path = Some("docs".to_string());
    manifest.commit = Some("abc123".to_string());

    let value: serde_json::Value =
        serde_json::from_str(&manifest.to_json_pretty().unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "source": "https://github.com/example/sdk.git",
            "sourcePath": "docs",
            "commit": "abc123",
            "syncedAt": "2024-01-01T00:00:00Z",
            "fileCount": 2,
            "files": ["a.md", "sub-b.md"]
        })
    );
}

#[test]
fn manifest_omits_absent_optionals() {
    let manifest = Manifest::new("https://docs.example.com", "t", Vec::new());
    let json = manifest.to_json_pretty().unwrap();
    assert!(!json.contains("sourcePath"));
    assert!(!json.contains("commit"));
    assert!(!json.contains("hashes"));
    assert!(json.contains("\"fileCount\": 0"));
}

#[test]
fn summary_counts_each_status() {
    let doc = OutputDocument::new("a.md".into(), "A".into(), "abc".into());
    let results = vec![
        SyncResult::written(&doc, SyncStatus::Created),
        SyncResult::written(&doc, SyncStatus::Unchanged),
        SyncResult::skipped(&doc, "dry run"),
        SyncResult::failed("b.md".into(), "B".into(), "http status 404"),
    ];
    let summary = SyncSummary::from_results(&results);

    assert_eq!(summary.created, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.written(), 2);
    assert_eq!(summary.bytes, 6);
}
