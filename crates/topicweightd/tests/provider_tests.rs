//! Real provider clients against wiremock servers.

use serde_json::json;
use topicweight_common::{AnalysisError, AnalysisRequest, CategoryName, ChatMessage};
use topicweightd::config::{GroundTruthConfig, LlmConfig, SearchConfig};
use topicweightd::ground_truth::{GroundTruthLookup, HttpGroundTruth};
use topicweightd::llm_client::OpenAiClient;
use topicweightd::llm_trait::{ChatResponder, StructuredGenerator};
use topicweightd::prompts::build_analysis_prompt;
use topicweightd::search::{FactSourceResolver, SerpApiResolver};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn search_config(server: &MockServer) -> SearchConfig {
    SearchConfig {
        base_url: server.uri(),
        api_key: Some("serp-key".to_string()),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content }
        }]
    })
}

// ============================================================================
// Structured generation
// ============================================================================

#[tokio::test]
async fn test_generate_parses_payload() {
    let server = MockServer::start().await;
    let payload = json!({
        "data": [
            {"name": "Policy Impact Potential", "weight": 4, "facts": ["Bill in committee"], "reasoning": "r"},
            {"name": "Statistical Impact", "weight": 8, "facts": [], "reasoning": "r"}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "response_format": {"type": "json_schema", "json_schema": {"strict": true}}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(json!(payload.to_string()))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&llm_config(&server)).unwrap();
    let prompt = build_analysis_prompt(&AnalysisRequest::new("Tariffs", 10.0), "Tariffs");
    let categories = client.generate(&prompt).await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, CategoryName::PolicyImpactPotential);
    assert_eq!(categories[1].weight, 8.0);
}

#[tokio::test]
async fn test_generate_no_choices_is_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&llm_config(&server)).unwrap();
    let prompt = build_analysis_prompt(&AnalysisRequest::new("Tariffs", 10.0), "Tariffs");
    assert!(matches!(
        client.generate(&prompt).await,
        Err(AnalysisError::Generation(_))
    ));
}

#[tokio::test]
async fn test_generate_null_content_is_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&llm_config(&server)).unwrap();
    let prompt = build_analysis_prompt(&AnalysisRequest::new("Tariffs", 10.0), "Tariffs");
    assert!(matches!(
        client.generate(&prompt).await,
        Err(AnalysisError::Generation(msg)) if msg.contains("no parsed payload")
    ));
}

#[tokio::test]
async fn test_generate_schema_mismatch_is_generation_error() {
    let server = MockServer::start().await;
    let bad = json!({"data": [{"name": "Vibes", "weight": 3, "facts": [], "reasoning": "r"}]});
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(bad.to_string()))))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&llm_config(&server)).unwrap();
    let prompt = build_analysis_prompt(&AnalysisRequest::new("Tariffs", 10.0), "Tariffs");
    assert!(matches!(
        client.generate(&prompt).await,
        Err(AnalysisError::Generation(_))
    ));
}

#[tokio::test]
async fn test_generate_http_error_is_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&llm_config(&server)).unwrap();
    let prompt = build_analysis_prompt(&AnalysisRequest::new("Tariffs", 10.0), "Tariffs");
    let err = client.generate(&prompt).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Generation(msg) if msg.contains("429")));
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_chat_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(json!("Start with the census data."))),
        )
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&llm_config(&server)).unwrap();
    let reply = client
        .reply(&[
            ChatMessage::new("system", "ctx"),
            ChatMessage::new("user", "Where do I start?"),
        ])
        .await
        .unwrap();
    assert_eq!(reply, "Start with the census data.");
}

#[tokio::test]
async fn test_chat_failure_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&llm_config(&server)).unwrap();
    let err = client
        .reply(&[ChatMessage::new("user", "hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Provider(_)));
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_returns_top_three_with_year_hint() {
    let server = MockServer::start().await;
    let results: Vec<serde_json::Value> = (1..=5)
        .map(|i| {
            json!({
                "position": i,
                "title": format!("Result {}", i),
                "link": format!("https://example.org/{}", i),
                "snippet": format!("Snippet {}", i)
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "Wages rose 4% 2023"))
        .and(query_param("api_key", "serp-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"organic_results": results})))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = SerpApiResolver::new(&search_config(&server)).unwrap();
    let sources = resolver.resolve("Wages rose 4%", Some(2023)).await;

    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0].title, "Result 1");
    assert_eq!(sources[2].link, "https://example.org/3");
    assert!(sources.iter().all(|s| s.citation_id.is_none()));
}

#[tokio::test]
async fn test_search_missing_results_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_metadata": {}})))
        .mount(&server)
        .await;

    let resolver = SerpApiResolver::new(&search_config(&server)).unwrap();
    assert!(resolver.resolve("anything", None).await.is_empty());
}

#[tokio::test]
async fn test_search_provider_error_degrades_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = SerpApiResolver::new(&search_config(&server)).unwrap();
    assert!(resolver.resolve("anything", None).await.is_empty());
}

// ============================================================================
// Ground truth
// ============================================================================

#[tokio::test]
async fn test_ground_truth_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/context"))
        .and(query_param("url", "https://news.example/story"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"context": "Reported on 3 May."})),
        )
        .mount(&server)
        .await;

    let lookup = HttpGroundTruth::new(&GroundTruthConfig {
        enabled: true,
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap();

    assert_eq!(lookup.lookup("https://news.example/story").await, "Reported on 3 May.");
    assert_eq!(lookup.lookup("https://news.example/other").await, "");
}
