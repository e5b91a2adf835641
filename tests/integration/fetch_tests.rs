//! HTTP fetcher against a mock site

use staff_harvest::config::FetcherConfig;
use staff_harvest::fetch::{FetchOptions, HttpFetcher, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STAFF_PAGE: &str = r#"<html><head><title>Staff</title></head><body>
    <nav>Home | About | Calendar</nav>
    <h1>Our Staff</h1>
    <p><a href="mailto:jlee@school.example">Jane Lee</a>, Principal</p>
    <p><a href="mailto:ohaddad@school.example">Omar Haddad</a>, Assistant Principal</p>
    <p>Office hours are Monday through Friday, eight to four.</p>
    <footer>Call the front office</footer>
</body></html>"#;

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetcherConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_renders_markdown() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/staff"))
        .and(header("cache-control", "no-cache"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(STAFF_PAGE)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/staff", mock_server.uri());
    let options = FetchOptions::extraction(&FetcherConfig::default());
    let page = fetcher().fetch(&url, &options).await.unwrap();

    assert!(page.success);
    assert_eq!(page.url, url);
    assert!(page.html.contains("<nav>"));

    let markdown = page.markdown.unwrap();
    assert!(markdown.contains("# Our Staff"));
    assert!(markdown.contains("[Jane Lee](mailto:jlee@school.example), Principal"));
    assert!(!markdown.contains("Calendar"));
    assert!(!markdown.contains("front office"));
}

#[tokio::test]
async fn test_http_error_is_unsuccessful_snapshot() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());
    let page = fetcher()
        .fetch(&url, &FetchOptions::analyze(&FetcherConfig::default()))
        .await
        .unwrap();

    assert!(!page.success);
    assert_eq!(page.error.as_deref(), Some("HTTP 404"));
    assert!(page.into_result().is_err());
}

#[tokio::test]
async fn test_sparse_page_has_no_markdown() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>Loading</p></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/sparse", mock_server.uri());
    let page = fetcher()
        .fetch(&url, &FetchOptions::analyze(&FetcherConfig::default()))
        .await
        .unwrap();

    assert!(page.success);
    assert!(page.markdown.is_none());
    assert!(page.html.contains("Loading"));
}

#[tokio::test]
async fn test_unreachable_host_is_unsuccessful_snapshot() {
    // Port 9 (discard) on localhost; nothing listens there in CI
    let page = fetcher()
        .fetch(
            "http://127.0.0.1:9/staff",
            &FetchOptions::analyze(&FetcherConfig::default()),
        )
        .await
        .unwrap();

    assert!(!page.success);
    assert!(page.error.is_some());
}
