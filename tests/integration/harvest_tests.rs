//! End-to-end harvesting against a mock directory site

use serde_json::json;
use staff_harvest::config::Config;
use staff_harvest::fetch::HttpFetcher;
use staff_harvest::llm::OpenAiExtractor;
use staff_harvest::output::{read_csv, to_csv};
use staff_harvest::StaffHarvester;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Markup with `count` members hidden in accessibility labels
fn embedded_page(prefix: &str, count: usize, extra: &str) -> String {
    let cards: String = (0..count)
        .map(|i| {
            format!(
                r#"<div class="card"><button aria-label="Send message to {prefix} Person{i} at {prefix}{i}@school.example">Email</button></div>"#
            )
        })
        .collect();
    format!("<html><body><h1>Staff</h1>{}{}</body></html>", cards, extra)
}

fn harvester(server: &MockServer) -> StaffHarvester {
    let config = Config::default();
    let fetcher = HttpFetcher::new(&config.fetcher).unwrap();
    let extractor = OpenAiExtractor::new("test-key", "gpt-4o-mini").with_base_url(server.uri());
    StaffHarvester::new(Arc::new(fetcher), Arc::new(extractor), config)
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_numbered_directory_is_harvested_in_page_order() {
    let mock_server = MockServer::start().await;

    let links = r#"<ul class="pager">
        <li><a href="/staff?page=1">1</a></li>
        <li><a href="/staff?page=2">2</a></li>
        <li><a href="/staff?page=3">3</a></li>
    </ul>"#;
    mount_html(&mock_server, "/directory", embedded_page("landing", 0, links)).await;

    for (page, prefix) in [("1", "alpha"), ("2", "beta"), ("3", "gamma")] {
        Mock::given(method("GET"))
            .and(path("/staff"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_string(embedded_page(prefix, 11, "")))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    // Every page is embedded content, so the semantic engine is never asked
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let url = format!("{}/directory", mock_server.uri());
    let members = harvester(&mock_server)
        .extract_with_pagination(&url, None)
        .await
        .unwrap();

    assert_eq!(members.len(), 33);
    assert_eq!(members[0].email.as_deref(), Some("alpha0@school.example"));
    assert_eq!(members[11].email.as_deref(), Some("beta0@school.example"));
    assert_eq!(members[32].email.as_deref(), Some("gamma10@school.example"));
    assert!(members.iter().all(|m| m.role.is_none()));
}

#[tokio::test]
async fn test_visible_directory_goes_through_semantic_engine() {
    let mock_server = MockServer::start().await;

    let rows: String = [
        ("Jane Lee", "Principal", "jlee"),
        ("Omar Haddad", "Assistant Principal", "ohaddad"),
        ("Ruth Ortiz", "Counselor", "rortiz"),
        ("Li Wu", "Nurse", "lwu"),
        ("Sam Park", "Librarian", "spark"),
        ("Ava Stone", "Registrar", "astone"),
    ]
    .iter()
    .map(|(name, role, user)| {
        format!(r#"<p><a href="mailto:{user}@school.example">{name}</a>, {role}</p>"#)
    })
    .collect();
    mount_html(&mock_server, "/staff", format!("<html><body>{}</body></html>", rows)).await;

    let answer = json!({
        "staff_members": [
            { "name": "Jane Lee", "role": "Principal", "email": "jlee@school.example" },
            { "name": "Omar Haddad", "role": "Assistant Principal", "email": "ohaddad@school.example" }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": answer.to_string() } }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/staff", mock_server.uri());
    let members = harvester(&mock_server).extract(&url).await.unwrap();

    assert_eq!(members.len(), 2);
    assert_eq!(members[1].role.as_deref(), Some("Assistant Principal"));

    let dir = TempDir::new().unwrap();
    let csv_path = to_csv(&members, dir.path(), None).unwrap();
    assert_eq!(read_csv(&csv_path).unwrap(), members);
}

#[tokio::test]
async fn test_click_through_without_browser_keeps_first_page() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/staff",
        embedded_page("solo", 12, r#"<a class="next" href="javascript:void(0)">Next</a>"#),
    )
    .await;

    let url = format!("{}/staff", mock_server.uri());
    let members = harvester(&mock_server)
        .extract_with_pagination(&url, None)
        .await
        .unwrap();

    assert_eq!(members.len(), 12);
    assert_eq!(members[0].name, "solo Person0");
}

#[tokio::test]
async fn test_failed_first_page_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/staff"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let url = format!("{}/staff", mock_server.uri());
    let result = harvester(&mock_server)
        .extract_with_pagination(&url, None)
        .await;

    assert!(matches!(
        result,
        Err(staff_harvest::HarvestError::Fetch { .. })
    ));
}
