use std::time::Duration;

use httpmock::{Method::POST, MockServer};
use sentix_models::SentimentLabel;
use sentix_providers::{ClassifierError, HuggingFaceClassifier, RetryPolicy, SentimentClassifier};
use serde_json::json;

const MODEL: &str = "ProsusAI/finbert";

fn classifier(base_url: &str, retry: RetryPolicy) -> HuggingFaceClassifier {
    HuggingFaceClassifier::new("hf_token", base_url, MODEL, Duration::from_secs(5))
        .unwrap()
        .with_retry(retry)
}

fn quick_retry(base_delay_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(base_delay_ms),
        max_delay: Duration::from_millis(base_delay_ms * 4),
        network_delay: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn posts_inputs_with_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/models/{MODEL}"))
                .header("authorization", "Bearer hf_token")
                .json_body(json!({ "inputs": "Apple beats estimates." }));
            then.status(200).json_body(json!([[
                {"label": "positive", "score": 0.93},
                {"label": "neutral", "score": 0.05},
                {"label": "negative", "score": 0.02}
            ]]));
        })
        .await;

    let result = classifier(&server.url("/models"), quick_retry(10))
        .classify("Apple beats estimates.")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.label, SentimentLabel::Positive);
    assert!((result.score - 0.93).abs() < 1e-9);
}

#[tokio::test]
async fn unknown_label_is_neutral() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/models/{MODEL}"));
            then.status(200)
                .json_body(json!([{"label": "LABEL_1", "score": 0.6}]));
        })
        .await;

    let result = classifier(&server.url("/models"), quick_retry(10))
        .classify("text")
        .await
        .unwrap();
    assert_eq!(result.label, SentimentLabel::Neutral);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn model_loading_is_retried_then_succeeds() {
    let server = MockServer::start_async().await;
    let path = format!("/models/{MODEL}");
    let mut loading = server
        .mock_async(|when, then| {
            when.method(POST).path(path.as_str());
            then.status(503)
                .json_body(json!({"error": "Model ProsusAI/finbert is currently loading"}));
        })
        .await;

    let hf = classifier(&server.url("/models"), quick_retry(500));
    let task = tokio::spawn(async move { hf.classify("Shares tumble").await });

    while loading.hits_async().await == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(loading.hits_async().await, 1);
    loading.delete_async().await;

    let ready = server
        .mock_async(|when, then| {
            when.method(POST).path(path.as_str());
            then.status(200)
                .json_body(json!([[{"label": "negative", "score": 0.88}]]));
        })
        .await;

    let result = task.await.unwrap().unwrap();
    assert_eq!(result.label, SentimentLabel::Negative);
    assert!((result.score - 0.88).abs() < 1e-9);
    assert_eq!(ready.hits_async().await, 1);
}

#[tokio::test]
async fn loading_until_exhausted() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/models/{MODEL}"));
            then.status(503).body("Model is currently loading");
        })
        .await;

    let err = classifier(&server.url("/models"), quick_retry(5))
        .classify("text")
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifierError::Exhausted { attempts: 3 }));
    assert_eq!(mock.hits_async().await, 3);
}

#[tokio::test]
async fn other_errors_fail_immediately() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/models/{MODEL}"));
            then.status(401).body("Invalid credentials");
        })
        .await;

    let err = classifier(&server.url("/models"), quick_retry(5))
        .classify("text")
        .await
        .unwrap_err();

    match err {
        ClassifierError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Invalid credentials");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn unavailable_without_loading_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/models/{MODEL}"));
            then.status(503).body("Service maintenance");
        })
        .await;

    let err = classifier(&server.url("/models"), quick_retry(5))
        .classify("text")
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifierError::Status { status: 503, .. }));
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn empty_candidates_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/models/{MODEL}"));
            then.status(200).json_body(json!([]));
        })
        .await;

    let err = classifier(&server.url("/models"), quick_retry(5))
        .classify("text")
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifierError::Decode(_)));
}

#[tokio::test]
async fn network_failure_exhausts_to_transport_error() {
    // Nothing listens on port 9 locally.
    let err = classifier("http://127.0.0.1:9/models", quick_retry(5))
        .classify("text")
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifierError::Transport(_)));
}
