use std::sync::Mutex;
use std::time::Duration;

use docsync_engine::{
    FailureKind, FetchError, FetchOutput, FetchSettings, Fetcher, ItemProgress, NullProgressSink,
    ProgressSink, ReqwestFetcher, Stage, SyncEvent,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Starts a server answering GET `route` with `response`.
async fn serve(route: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

async fn get(settings: FetchSettings, url: &str) -> Result<FetchOutput, FetchError> {
    ReqwestFetcher::new(settings)
        .fetch(0, url, &NullProgressSink)
        .await
}

#[tokio::test]
async fn body_and_metadata_are_returned() {
    let server = serve(
        "/docs/intro.md",
        ResponseTemplate::new(200).set_body_raw("# Intro\n", "text/markdown; charset=utf-8"),
    )
    .await;
    let url = format!("{}/docs/intro.md", server.uri());
    let sink = RecordingSink::default();

    let output = ReqwestFetcher::new(FetchSettings::default())
        .fetch(1, &url, &sink)
        .await
        .expect("fetch ok");
    assert_eq!(output.bytes, b"# Intro\n");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(output.metadata.byte_len, 8);
    assert!(!output.metadata.is_html());

    let downloaded = sink
        .events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            SyncEvent::Progress(ItemProgress {
                item: 1,
                stage: Stage::Downloading,
                bytes,
            }) => *bytes,
            _ => None,
        })
        .max();
    assert_eq!(downloaded, Some(8));
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = serve("/missing", ResponseTemplate::new(404)).await;
    let err = get(FetchSettings::default(), &format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = serve(
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(250))
            .set_body_string("slow"),
    )
    .await;
    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let err = get(settings, &format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = serve(
        "/large",
        ResponseTemplate::new(200).set_body_raw("01234567890", "text/html"),
    )
    .await;
    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let err = get(settings, &format!("{}/large", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: 11
        }
    );
}

#[tokio::test]
async fn unlisted_content_type_is_rejected() {
    let server = serve(
        "/logo.png",
        ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50], "image/png"),
    )
    .await;
    let err = get(FetchSettings::default(), &format!("{}/logo.png", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "image/png".to_string()
        }
    );

    let anything = FetchSettings {
        allowed_content_types: Vec::new(),
        ..FetchSettings::default()
    };
    let output = get(anything, &format!("{}/logo.png", server.uri()))
        .await
        .unwrap();
    assert_eq!(output.bytes, vec![0x89, 0x50]);
}

#[tokio::test]
async fn redirects_are_followed_up_to_the_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("moved", "text/plain"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let output = get(FetchSettings::default(), &format!("{}/old", server.uri()))
        .await
        .unwrap();
    assert_eq!(output.metadata.final_url, format!("{}/new", server.uri()));
    assert_eq!(output.metadata.redirect_count, 1);

    let err = get(FetchSettings::default(), &format!("{}/loop", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::RedirectLimitExceeded);
}

#[tokio::test]
async fn malformed_url_is_rejected_before_any_request() {
    let err = get(FetchSettings::default(), "not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
