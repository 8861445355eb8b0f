//! Wiremock integration tests for KapowClient.
//!
//! These tests verify request shape and how each kind of response maps to
//! an [`ApiOutcome`].

use kapow::providers::{ApiOutcome, KapowClient};
use kapow::{KapowError, Settings};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings() -> Settings {
    Settings::new("test_key", 0.9, 0.9, 5)
}

fn image_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "description": "Sunset",
        "alt": "orange sky",
        "url": "https://img/full.jpg",
        "link": "https://unsplash.com/photos/x",
        "thumb": "https://img/thumb.jpg",
        "small": "https://img/small.jpg",
        "regular": "https://img/regular.jpg",
        "author": "https://unsplash.com/@jane",
        "username": "Jane",
        "width": 1000,
        "height": 500
    })
}

// ============================================================================
// Tags
// ============================================================================

#[tokio::test]
async fn test_fetch_tags_sends_model_and_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_json(serde_json::json!({
            "model": "TopicTagSim",
            "payload": {
                "text": "a red sunset",
                "threshold": 0.9,
                "min_topic_score": 0.9,
                "default_to_topics": false
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "output": [{"tag": "sunset"}, {"tag": "mountains"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("a red sunset", &settings()).await;

    assert_eq!(outcome.into_items(), vec!["sunset", "mountains"]);
}

#[tokio::test]
async fn test_fetch_tags_missing_output_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    assert!(outcome.is_empty());
    assert!(!outcome.is_failed());
}

#[tokio::test]
async fn test_fetch_tags_empty_body_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    assert!(matches!(outcome, ApiOutcome::Empty));
}

#[tokio::test]
async fn test_fetch_tags_falsy_body_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(200).set_body_string("false"))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    assert!(matches!(outcome, ApiOutcome::Empty));
}

#[tokio::test]
async fn test_fetch_tags_server_error_is_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    match outcome {
        ApiOutcome::Failed(KapowError::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_tags_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    assert!(matches!(
        outcome,
        ApiOutcome::Failed(KapowError::AuthenticationFailed)
    ));
    assert!(outcome.into_items().is_empty());
}

#[tokio::test]
async fn test_fetch_tags_rate_limited_reads_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    match outcome {
        ApiOutcome::Failed(KapowError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(30)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_tags_invalid_json_is_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    assert!(outcome.is_failed());
}

// ============================================================================
// Images
// ============================================================================

#[tokio::test]
async fn test_fetch_images_sends_source_keywords_and_per_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images"))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_json(serde_json::json!({
            "source": "Unsplash",
            "keywords": ["sunset", "mountains"],
            "options": {"per_page": 5}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([image_json("a"), image_json("b")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let tags = vec!["sunset".to_string(), "mountains".to_string()];
    let images = client.fetch_images(&tags, &settings()).await.into_items();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].id_string().as_deref(), Some("a"));
    assert_eq!(images[1].width, Some(1000.0));
}

#[tokio::test]
async fn test_fetch_images_uses_configured_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images"))
        .and(body_json(serde_json::json!({
            "source": "Pexels",
            "keywords": ["cat"],
            "options": {"per_page": 5}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_options(
        mock_server.uri(),
        std::time::Duration::from_secs(5),
        "Pexels",
    )
    .unwrap();
    let outcome = client.fetch_images(&["cat".to_string()], &settings()).await;

    assert!(outcome.is_empty());
}

#[tokio::test]
async fn test_fetch_images_object_body_is_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "nope"})),
        )
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let outcome = client.fetch_images(&["x".to_string()], &settings()).await;

    assert!(matches!(
        outcome,
        ApiOutcome::Failed(KapowError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_fetch_images_keeps_undecodable_elements_for_mapping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([image_json("a"), "junk", {"id": 7}])),
        )
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let images = client
        .fetch_images(&["x".to_string()], &settings())
        .await
        .into_items();

    assert_eq!(images.len(), 3);
    assert_eq!(images[1].id_string(), None);
    assert_eq!(images[2].id_string().as_deref(), Some("7"));
}

// ============================================================================
// Feedback
// ============================================================================

#[tokio::test]
async fn test_send_feedback_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/feedback"))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_json(serde_json::json!({
            "model": "TopicTagSim",
            "text": "post text",
            "url": "https://img/full.jpg",
            "like": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    client
        .send_feedback("post text", "https://img/full.jpg", true, &settings())
        .await
        .expect("feedback should succeed");
}

#[tokio::test]
async fn test_send_feedback_error_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/feedback"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = KapowClient::with_base_url(mock_server.uri()).unwrap();
    let err = client
        .send_feedback("t", "u", false, &settings())
        .await
        .unwrap_err();

    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_failed() {
    // Nothing listens on port 1.
    let client = KapowClient::with_base_url("http://127.0.0.1:1").unwrap();
    let outcome = client.fetch_tags("text", &settings()).await;

    assert!(matches!(outcome, ApiOutcome::Failed(KapowError::Http(_))));
}

#[test]
fn test_empty_base_url_is_rejected() {
    assert!(matches!(
        KapowClient::with_base_url("/"),
        Err(KapowError::InvalidInput(_))
    ));
}
