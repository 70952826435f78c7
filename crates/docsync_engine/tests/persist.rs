use std::fs;

use docsync_core::{Manifest, SyncStatus};
use docsync_engine::{ensure_output_dir, DocumentWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("docs");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
    assert_eq!(fs::read_dir(&new_dir).unwrap().count(), 0);
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    assert!(ensure_output_dir(&file_path).is_err());
}

#[test]
fn write_reports_created_updated_unchanged() {
    let temp = TempDir::new().unwrap();
    let writer = DocumentWriter::new(temp.path().to_path_buf());

    assert_eq!(writer.write("doc.md", "hello\n").unwrap(), SyncStatus::Created);
    assert_eq!(writer.write("doc.md", "hello\n").unwrap(), SyncStatus::Unchanged);
    assert_eq!(writer.write("doc.md", "world\n").unwrap(), SyncStatus::Updated);
    assert_eq!(fs::read_to_string(temp.path().join("doc.md")).unwrap(), "world\n");
}

#[test]
fn fresh_sync_stamp_alone_is_unchanged() {
    let temp = TempDir::new().unwrap();
    let writer = DocumentWriter::new(temp.path().to_path_buf());
    let first = "---\ntitle: A\nsource: https://example.com/a\nsynced: 2026-01-01T00:00:00Z\n---\n\nBody\n";
    let second = "---\ntitle: A\nsource: https://example.com/a\nsynced: 2026-02-01T00:00:00Z\n---\n\nBody\n";

    assert_eq!(writer.write("a.md", first).unwrap(), SyncStatus::Created);
    assert_eq!(writer.write("a.md", second).unwrap(), SyncStatus::Unchanged);
    // The file still carries the newest header.
    assert_eq!(fs::read_to_string(temp.path().join("a.md")).unwrap(), second);
}

#[test]
fn changed_document_frontmatter_is_an_update() {
    let temp = TempDir::new().unwrap();
    let writer = DocumentWriter::new(temp.path().to_path_buf());

    writer.write("a.md", "---\ntitle: Old\n---\n\nbody\n").unwrap();
    assert_eq!(
        writer.write("a.md", "---\ntitle: New\n---\n\nbody\n").unwrap(),
        SyncStatus::Updated
    );

    writer.write("b.md", "---\nintro one\n---\nrest").unwrap();
    assert_eq!(
        writer.write("b.md", "---\nintro two\n---\nrest").unwrap(),
        SyncStatus::Updated
    );
}

#[test]
fn changed_sync_header_title_is_an_update() {
    let temp = TempDir::new().unwrap();
    let writer = DocumentWriter::new(temp.path().to_path_buf());
    let header = |title: &str| {
        format!("---\ntitle: {title}\nsource: https://example.com/a\nsynced: 2026-01-01T00:00:00Z\n---\n\nBody\n")
    };

    writer.write("a.md", &header("A")).unwrap();
    assert_eq!(writer.write("a.md", &header("B")).unwrap(), SyncStatus::Updated);
}

#[test]
fn non_utf8_existing_file_is_updated() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("doc.md"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
    let writer = DocumentWriter::new(temp.path().to_path_buf());

    assert_eq!(writer.write("doc.md", "hello\n").unwrap(), SyncStatus::Updated);
    assert_eq!(fs::read_to_string(temp.path().join("doc.md")).unwrap(), "hello\n");
}

#[test]
fn write_into_missing_dir_fails_without_partial_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = DocumentWriter::new(file_path.clone());
    assert!(writer.write("doc.md", "data").is_err());
    assert!(!file_path.with_file_name("doc.md").exists());
}

#[test]
fn manifest_is_written_as_pretty_json() {
    let temp = TempDir::new().unwrap();
    let writer = DocumentWriter::new(temp.path().to_path_buf());
    let manifest = Manifest::new(
        "https://example.com/llms.txt",
        "2026-01-02T03:04:05Z",
        vec!["b.md".to_string(), "a.md".to_string()],
    );

    let path = writer.write_manifest(&manifest).unwrap();
    assert_eq!(path, temp.path().join("manifest.json"));
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.ends_with("}\n"));

    let parsed: Manifest = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed.files, vec!["a.md", "b.md"]);
    assert_eq!(parsed.file_count, 2);
}
