//! Integration tests for the Gemini client against a mock server.
//!
//! Retry delays are configured to zero so exhaustion paths run instantly.

use httpmock::prelude::*;
use serde_json::json;

use dsa_practice::config::GeminiConfig;
use dsa_practice::error::ApiError;
use dsa_practice::gemini::GeminiClient;
use dsa_practice::problem::Difficulty;

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn client_for(server: &MockServer, max_attempts: u32) -> GeminiClient {
    let config = GeminiConfig {
        api_base: server.base_url(),
        api_key: "test-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        timeout_secs: 5,
        max_attempts,
        base_delay_ms: 0,
    };
    GeminiClient::new(config).expect("client")
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn test_feedback_returns_text_verbatim() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .query_param("key", "test-key");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(text_response("Clear answer, add a concrete example."));
    });

    let client = client_for(&server, 3);
    let feedback = client
        .generate_feedback("Tell me about yourself", "I am an engineer.")
        .await
        .expect("feedback");

    assert_eq!(feedback, "Clear answer, add a concrete example.");
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn test_problem_generation_parses_fenced_json() {
    let problem_json = r#"{
        "title": "Merge Intervals",
        "difficulty": "intermediate",
        "description": "Merge all overlapping intervals.",
        "examples": [
            {"input": "[[1,3],[2,6]]", "output": "[[1,6]]", "explanation": "1-3 and 2-6 overlap."}
        ],
        "constraints": ["1 <= n <= 10000"],
        "hints": ["Sort by start"]
    }"#;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(text_response(&format!("```json\n{problem_json}\n```")));
    });

    let client = client_for(&server, 3);
    let problem = client
        .generate_problem(Difficulty::Intermediate)
        .await
        .expect("problem");

    assert_eq!(problem.title, "Merge Intervals");
    assert_eq!(problem.difficulty, Difficulty::Intermediate);
    assert_eq!(problem.examples.len(), 1);
    assert_eq!(problem.constraints, vec!["1 <= n <= 10000"]);
}

#[tokio::test]
async fn test_problem_generation_falls_back_on_malformed_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(text_response("Here is your problem: good luck!"));
    });

    let client = client_for(&server, 3);
    let problem = client
        .generate_problem(Difficulty::Beginner)
        .await
        .expect("fallback problem, not an error");

    assert_eq!(problem.difficulty, Difficulty::Beginner);
    assert_eq!(problem.title, "Beginner Array Problem");
}

#[tokio::test]
async fn test_non_2xx_is_retried_then_reraised() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(400).body("bad request payload");
    });

    let client = client_for(&server, 3);
    let err = client
        .generate_feedback("q", "a")
        .await
        .expect_err("should fail");

    // Exhaustion with a non-overload error re-raises the original.
    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("bad request payload"));
        }
        other => panic!("expected Http error, got {other}"),
    }
    assert_eq!(mock.hits(), 3);
}

#[tokio::test]
async fn test_persistent_503_exhausts_into_overloaded() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(503).body("The model is overloaded. Please try again later.");
    });

    let client = client_for(&server, 2);
    let err = client.transcribe(b"RIFFaudio", "audio/wav").await.expect_err("should fail");

    assert!(matches!(err, ApiError::Overloaded));
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn test_empty_candidates_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "candidates": [] }));
    });

    let client = client_for(&server, 1);
    let err = client
        .generate_feedback("q", "a")
        .await
        .expect_err("should fail");

    assert!(matches!(err, ApiError::EmptyResponse));
}

#[tokio::test]
async fn test_transcription_returns_text_verbatim() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .query_param("key", "test-key")
            .body_contains("inline_data");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(text_response("hello from the recording"));
    });

    let client = client_for(&server, 3);
    let text = client
        .transcribe(b"RIFF....WAVEfmt", "audio/wav")
        .await
        .expect("transcript");

    assert_eq!(text, "hello from the recording");
    assert_eq!(mock.hits(), 1);
}
