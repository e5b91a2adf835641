//! OpenAI-compatible extractor against a mock endpoint

use serde_json::json;
use staff_harvest::extract::{parse_extracted_content, EXTRACTION_INSTRUCTION};
use staff_harvest::llm::{ChunkingConfig, OpenAiExtractor, SemanticExtractor};
use staff_harvest::model::StaffDirectory;
use staff_harvest::HarvestError;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn extractor(server: &MockServer) -> OpenAiExtractor {
    OpenAiExtractor::new("test-key", "gpt-4o-mini").with_base_url(server.uri())
}

#[tokio::test]
async fn test_extract_returns_parsable_blocks() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("json_object"))
        .and(body_string_contains("Jane Lee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"staff_members":[{"name":"Jane Lee","role":"Principal","email":"JLee@School.example"}]}"#,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = extractor(&mock_server)
        .extract(
            "[Jane Lee](mailto:jlee@school.example), Principal",
            &StaffDirectory::json_schema(),
            EXTRACTION_INSTRUCTION,
            &ChunkingConfig::default(),
        )
        .await
        .unwrap();

    let members = parse_extracted_content(&raw).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "Jane Lee");
    assert_eq!(members[0].role.as_deref(), Some("Principal"));
    assert_eq!(members[0].email.as_deref(), Some("jlee@school.example"));
}

#[tokio::test]
async fn test_long_content_is_sent_in_chunks() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(r#"{"staff_members":[]}"#)),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    // 100 tokens per chunk is 75 words; 180 one-word lines need three chunks
    let content: String = (0..180).map(|i| format!("line{}\n", i)).collect();
    let chunking = ChunkingConfig {
        threshold: 100,
        overlap_rate: 0.0,
    };

    let raw = extractor(&mock_server)
        .extract(
            &content,
            &StaffDirectory::json_schema(),
            EXTRACTION_INSTRUCTION,
            &chunking,
        )
        .await
        .unwrap();

    let blocks: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(blocks.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_http_error_is_llm_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    let err = extractor(&mock_server)
        .extract(
            "Jane Lee",
            &StaffDirectory::json_schema(),
            EXTRACTION_INSTRUCTION,
            &ChunkingConfig::default(),
        )
        .await
        .unwrap_err();

    match err {
        HarvestError::Llm(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("rate limited"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_non_json_completion_is_parse_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("I found two people")))
        .mount(&mock_server)
        .await;

    let result = extractor(&mock_server)
        .extract(
            "Jane Lee",
            &StaffDirectory::json_schema(),
            EXTRACTION_INSTRUCTION,
            &ChunkingConfig::default(),
        )
        .await;

    assert!(matches!(result, Err(HarvestError::Parse(_))));
}
