use std::sync::Arc;
use std::time::Duration;

use insight_core::Sentiment;
use insight_engine::{
    AnalysisClient, AnalysisError, GeminiProvider, Provider, ProviderFailure, ProviderSettings,
    WebReference,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn settings(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        base_url: format!("{}/v1beta/models", server.uri()),
        api_key: "test-key".to_string(),
        ..ProviderSettings::default()
    }
}

fn gemini_body(text: &str, chunks: serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "groundingMetadata": {"groundingChunks": chunks}
        }]
    })
}

#[tokio::test]
async fn sends_grounded_request_and_reads_text_and_citations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({"tools": [{"googleSearch": {}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
            "{\"title\": \"T\"}",
            json!([
                {"web": {"uri": "https://a", "title": "A"}},
                {"retrievedContext": {"uri": "ignored"}},
                {"web": {"uri": "https://b"}}
            ]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(&server)).unwrap();
    let response = provider.generate("analyze https://example.com").await.unwrap();

    assert_eq!(response.text.as_deref(), Some("{\"title\": \"T\"}"));
    assert_eq!(
        response.citations,
        vec![
            WebReference {
                title: Some("A".to_string()),
                uri: Some("https://a".to_string())
            },
            WebReference {
                title: None,
                uri: Some("https://b".to_string())
            },
        ]
    );
}

#[tokio::test]
async fn multi_part_text_is_concatenated_and_thoughts_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "{\"a\":"},
                    {"text": "1}"}
                ]}
            }]
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(&server)).unwrap();
    let response = provider.generate("p").await.unwrap();
    assert_eq!(response.text.as_deref(), Some("{\"a\":1}"));
    assert!(response.citations.is_empty());
}

#[tokio::test]
async fn http_error_surfaces_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Quota exceeded for model gemini-2.5-flash",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(&server)).unwrap();
    let err = provider.generate("p").await.unwrap_err();
    assert_eq!(err.kind, ProviderFailure::HttpStatus(429));
    assert_eq!(err.message, "Quota exceeded for model gemini-2.5-flash");
}

#[tokio::test]
async fn http_error_without_json_body_uses_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(&server)).unwrap();
    let err = provider.generate("p").await.unwrap_err();
    assert_eq!(err.kind, ProviderFailure::HttpStatus(403));
    assert_eq!(err.message, "API key not valid");
}

#[tokio::test]
async fn unreachable_provider_is_a_network_failure() {
    // Reserve a free port, then release it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let provider = GeminiProvider::new(ProviderSettings {
        base_url: format!("http://127.0.0.1:{port}/v1beta/models"),
        api_key: "test-key".to_string(),
        ..ProviderSettings::default()
    })
    .unwrap();
    let err = provider.generate("p").await.unwrap_err();
    assert_eq!(err.kind, ProviderFailure::Network);
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn api_key_stays_out_of_urls_and_error_messages() {
    insight_logging::initialize_for_tests();
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let provider: Arc<dyn Provider> = Arc::new(
        GeminiProvider::new(ProviderSettings {
            base_url: format!("http://127.0.0.1:{port}/v1beta/models"),
            api_key: "SECRET-KEY-123".to_string(),
            ..ProviderSettings::default()
        })
        .unwrap(),
    );

    let err = provider.generate("p").await.unwrap_err();
    assert!(!err.message.contains("SECRET-KEY-123"), "{}", err.message);
    assert!(!err.message.contains("generateContent"), "{}", err.message);

    let err = AnalysisClient::new(provider)
        .analyze("https://example.com")
        .await
        .unwrap_err();
    assert!(!err.to_string().contains("SECRET-KEY-123"));
}

#[tokio::test]
async fn api_key_is_not_sent_in_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("{}", json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(settings(&server)).unwrap();
    provider.generate("p").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
    assert_eq!(
        requests[0].headers.get("x-goog-api-key").unwrap(),
        "test-key"
    );
}

#[tokio::test]
async fn configured_timeout_applies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(gemini_body("{}", json!([]))),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(ProviderSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..settings(&server)
    })
    .unwrap();
    let err = provider.generate("p").await.unwrap_err();
    assert_eq!(err.kind, ProviderFailure::Timeout);
    assert!(!err.message.contains("test-key"));
}

#[tokio::test]
async fn client_end_to_end_over_http() {
    insight_logging::initialize_for_tests();
    let server = MockServer::start().await;
    let text = "```json\n{\"title\":\"Example\",\"summary\":\"S.\",\"keywords\":[\"k\"],\
                \"sentiment\":\"Positive\",\"mainEntities\":[\"E\"],\
                \"estimatedReadingTimeMinutes\":3}\n```";
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(
            text,
            json!([
                {"web": {"uri": "https://a", "title": "A"}},
                {"web": {"uri": "https://b", "title": "B"}},
                {"web": {"uri": "https://a", "title": "A dup"}}
            ]),
        )))
        .mount(&server)
        .await;

    let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::new(settings(&server)).unwrap());
    let client = AnalysisClient::new(provider);
    let result = client.analyze("https://example.com").await.unwrap();

    assert_eq!(result.title, "Example");
    assert_eq!(result.sentiment, Sentiment::Positive);
    let uris: Vec<_> = result.sources.iter().map(|s| s.uri.as_str()).collect();
    assert_eq!(uris, vec!["https://a", "https://b"]);
}

#[tokio::test]
async fn client_maps_provider_failure_to_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Internal error encountered."}
        })))
        .mount(&server)
        .await;

    let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::new(settings(&server)).unwrap());
    let err = AnalysisClient::new(provider)
        .analyze("https://example.com")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AnalysisError::Transport("Internal error encountered.".to_string())
    );
    assert_eq!(err.to_string(), "Internal error encountered.");
}
