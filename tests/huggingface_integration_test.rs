//! Wiremock integration tests for HuggingFaceClient.
//!
//! These tests verify correct HTTP interaction and error handling using mocked responses.
#![cfg(feature = "huggingface")]

use std::time::Duration;

use huginn::types::ZeroShotOptions;
use huginn::{HuginnError, providers::HuggingFaceClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
const NLI_MODEL: &str = "MoritzLaurer/deberta-v3-large-zeroshot-v2.0";

/// Test successful text classification; the best-scoring label wins.
#[tokio::test]
async fn test_classify_text_success() {
    let mock_server = MockServer::start().await;

    // Current API nests the candidates for a single input
    let response = serde_json::json!([[
        {"label": "neutral", "score": 0.15},
        {"label": "negative", "score": 0.80},
        {"label": "positive", "score": 0.05}
    ]]);

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", SENTIMENT_MODEL)))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_json(serde_json::json!({"inputs": "The app keeps crashing"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client
        .classify_text("The app keeps crashing", SENTIMENT_MODEL)
        .await;

    let classification = result.expect("classify_text should succeed");
    assert_eq!(classification.label, "negative");
    assert!((classification.score - 0.80).abs() < 0.001);
}

/// Empty candidate list is an EmptyResponse.
#[tokio::test]
async fn test_classify_text_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", SENTIMENT_MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[]])))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client.classify_text("hello there", SENTIMENT_MODEL).await;

    assert!(
        matches!(result, Err(HuginnError::EmptyResponse)),
        "expected EmptyResponse, got {:?}",
        result
    );
}

/// Zero-shot request carries labels, multi-label flag and hypothesis template.
#[tokio::test]
async fn test_classify_zero_shot_success() {
    let mock_server = MockServer::start().await;

    let expected_request = serde_json::json!({
        "inputs": "Takes forever to load",
        "parameters": {
            "candidate_labels": ["Performance", "Quality"],
            "multi_label": true,
            "hypothesis_template": "This text is about {}."
        }
    });
    let response = serde_json::json!({
        "sequence": "Takes forever to load",
        "labels": ["Performance", "Quality"],
        "scores": [0.93, 0.12]
    });

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", NLI_MODEL)))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_json(expected_request))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let options = ZeroShotOptions::default()
        .multi_label(true)
        .hypothesis_template("This text is about {}.");
    let result = client
        .classify(
            "Takes forever to load",
            &["Performance", "Quality"],
            &options,
            NLI_MODEL,
        )
        .await;

    let scores = result.expect("classify should succeed");
    assert_eq!(scores.labels, vec!["Performance", "Quality"]);
    assert_eq!(scores.score("Performance"), Some(0.93));
}

/// Router-style `[{label, score}]` responses are accepted too.
#[tokio::test]
async fn test_classify_zero_shot_pairs_response() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!([
        {"label": "Usability", "score": 0.71},
        {"label": "Quality", "score": 0.2}
    ]);

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", NLI_MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let scores = client
        .classify(
            "Menus are confusing",
            &["Usability", "Quality"],
            &ZeroShotOptions::default(),
            NLI_MODEL,
        )
        .await
        .expect("classify should succeed");

    assert_eq!(scores.score("Usability"), Some(0.71));
    assert_eq!(scores.len(), 2);
}

/// Mismatched labels/scores are a data error.
#[tokio::test]
async fn test_classify_zero_shot_length_mismatch() {
    let mock_server = MockServer::start().await;

    let response = serde_json::json!({"labels": ["Performance", "Quality"], "scores": [0.9]});

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", NLI_MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client
        .classify(
            "text",
            &["Performance", "Quality"],
            &ZeroShotOptions::default(),
            NLI_MODEL,
        )
        .await;

    assert!(
        matches!(result, Err(HuginnError::DataError(_))),
        "expected DataError, got {:?}",
        result
    );
}

/// Test 401 Unauthorized returns AuthenticationFailed error.
#[tokio::test]
async fn test_unauthorized_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", SENTIMENT_MODEL)))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("bad_key", mock_server.uri()).unwrap();
    let result = client.classify_text("hello", SENTIMENT_MODEL).await;

    assert!(
        matches!(result, Err(HuginnError::AuthenticationFailed)),
        "expected AuthenticationFailed, got {:?}",
        result
    );
}

/// Test 404 Not Found returns ModelNotFound error.
#[tokio::test]
async fn test_model_not_found_error() {
    let mock_server = MockServer::start().await;
    let model = "nonexistent/model";

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", model)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client.classify_text("hello", model).await;

    match result {
        Err(HuginnError::ModelNotFound(m)) => assert_eq!(m, model),
        other => panic!("expected ModelNotFound, got {:?}", other),
    }
}

/// Test 429 Too Many Requests returns RateLimited error with retry-after.
#[tokio::test]
async fn test_rate_limited_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", NLI_MODEL)))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client
        .classify("hello", &["Quality"], &ZeroShotOptions::default(), NLI_MODEL)
        .await;

    match result {
        Err(HuginnError::RateLimited { retry_after }) => {
            assert_eq!(
                retry_after,
                Some(Duration::from_secs(30)),
                "retry_after should be 30 seconds"
            );
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

/// Test 503 Service Unavailable (model loading) returns Api error.
#[tokio::test]
async fn test_model_loading_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", SENTIMENT_MODEL)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client.classify_text("hello", SENTIMENT_MODEL).await;

    match result {
        Err(HuginnError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert!(message.contains("loading"));
        }
        other => panic!("expected Api {{ status: 503 }}, got {:?}", other),
    }
}

/// 400 with an error body is an input error carrying the API's message.
#[tokio::test]
async fn test_bad_request_is_invalid_input() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", NLI_MODEL)))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "candidate_labels must not be empty"})),
        )
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client
        .classify("hello", &[], &ZeroShotOptions::default(), NLI_MODEL)
        .await;

    match result {
        Err(HuginnError::InvalidInput(message)) => {
            assert_eq!(message, "candidate_labels must not be empty");
        }
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

/// Other server errors surface as Api with the status code.
#[tokio::test]
async fn test_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}", SENTIMENT_MODEL)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = HuggingFaceClient::with_base_url("test_key", mock_server.uri()).unwrap();
    let result = client.classify_text("hello", SENTIMENT_MODEL).await;

    assert!(
        matches!(result, Err(HuginnError::Api { status: 500, .. })),
        "expected Api {{ status: 500 }}, got {:?}",
        result
    );
}
