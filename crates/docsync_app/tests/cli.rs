use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn docsync() -> Command {
    Command::cargo_bin("docsync").expect("binary exists")
}

#[test]
fn missing_config_fails_with_config_error() {
    let temp = TempDir::new().unwrap();
    docsync()
        .arg("--config")
        .arg(temp.path().join("absent.ron"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn unknown_source_name_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("docsync.ron");
    fs::write(
        &config,
        r#"(sources: [(name: "site", output_dir: "out", source: HtmlScrape(pages: []))])"#,
    )
    .unwrap();

    docsync()
        .arg("--config")
        .arg(&config)
        .args(["--source", "other"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn failed_clone_aborts_source_with_exit_one() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("docsync.ron");
    let missing_repo = temp.path().join("no-such-repo");
    fs::write(
        &config,
        format!(
            r#"(sources: [(name: "sdk", output_dir: "out", source: Repository(url: "{}", subdir: "docs"))])"#,
            missing_repo.display()
        ),
    )
    .unwrap();

    docsync()
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("sdk: aborted"));
    assert!(!temp.path().join("out").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn dry_run_lists_documents_without_writing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/one.md"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("# One\n", "text/markdown"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = temp.path().join("docsync.ron");
    fs::write(
        &config,
        format!(
            r#"(sources: [(
                name: "api",
                output_dir: "out",
                source: DirectFetch(base_url: "{}/docs", paths: ["one.md"], sectioned: false),
            )])"#,
            server.uri()
        ),
    )
    .unwrap();

    let assert = tokio::task::spawn_blocking(move || {
        docsync()
            .arg("--config")
            .arg(&config)
            .arg("--dry-run")
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("api: would write one.md"))
        .stdout(predicate::str::contains("1 skipped"));
    assert!(!temp.path().join("out").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_writes_documents_and_manifest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/llms-full.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "===/guide/start===\n# Start\n===/guide/next===\n# Next\n",
            "text/plain",
        ))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = temp.path().join("docsync.ron");
    fs::write(
        &config,
        format!(
            r#"(sources: [(
                name: "guide",
                output_dir: "resources",
                source: DirectFetch(base_url: "{}", paths: ["llms-full.txt"], sectioned: true),
                path_rules: (strip_prefix: Some("guide/")),
            )])"#,
            server.uri()
        ),
    )
    .unwrap();

    let assert = tokio::task::spawn_blocking(move || docsync().arg("--config").arg(&config).assert())
        .await
        .unwrap();
    assert
        .success()
        .stdout(predicate::str::contains("2 created"));

    let out = temp.path().join("resources");
    assert_eq!(fs::read_to_string(out.join("start.md")).unwrap(), "# Start");
    let manifest = fs::read_to_string(out.join("manifest.json")).unwrap();
    assert!(manifest.contains("\"fileCount\": 2"));
    assert!(manifest.contains("\"next.md\""));
}
