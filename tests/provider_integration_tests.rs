use std::sync::Arc;

use assist_panel::core::chat::{ChatSession, SendCapability, SendError};
use assist_panel::core::submission::{SubmissionController, SubmitOutcome};
use assist_panel::inference::{
    CompletionProvider, CompletionRequest, Message, ProviderError, ResponsesProvider, Role,
    StreamChunk,
};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

const HELLO_SSE: &str = "\
event: response.created
data: {\"type\":\"response.created\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\"Hello\"}

event: response.output_text.delta
data: {\"type\":\"response.output_text.delta\",\"delta\":\" world\"}

event: response.completed
data: {\"type\":\"response.completed\"}
";

async fn mount_sse(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// Collects all content chunks from a stream
async fn collect_content(mut receiver: mpsc::Receiver<StreamChunk>) -> Vec<String> {
    let mut content = Vec::new();
    while let Some(StreamChunk::Content(s)) = receiver.recv().await {
        content.push(s);
    }
    content
}

fn user_history() -> Vec<Message> {
    vec![Message::user("Hello")]
}

// ============================================================================
// Provider Tests
// ============================================================================

#[tokio::test]
async fn test_streaming_content() {
    let mock_server = MockServer::start().await;
    mount_sse(&mock_server, HELLO_SSE).await;

    let provider = ResponsesProvider::new("lmstudio", mock_server.uri(), None);
    let messages = user_history();
    let request = CompletionRequest {
        system_prompt: "",
        messages: &messages,
        model: "test-model",
    };

    let (tx, rx) = mpsc::channel(100);
    let result = provider.stream_completion(request, tx).await;

    assert!(result.is_ok());
    assert_eq!(collect_content(rx).await, vec!["Hello", " world"]);
}

#[tokio::test]
async fn test_bearer_key_and_system_prompt_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "stream": true,
            "input": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(HELLO_SSE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider =
        ResponsesProvider::new("openrouter", mock_server.uri(), Some("sk-test".to_string()));
    let messages = user_history();
    let request = CompletionRequest {
        system_prompt: "Be brief.",
        messages: &messages,
        model: "test-model",
    };

    let (tx, rx) = mpsc::channel(100);
    let result = provider.stream_completion(request, tx).await;

    assert!(result.is_ok());
    assert_eq!(collect_content(rx).await.concat(), "Hello world");
}

#[tokio::test]
async fn test_api_error_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let provider =
        ResponsesProvider::new("openrouter", mock_server.uri(), Some("bad-key".to_string()));
    let messages = user_history();
    let request = CompletionRequest {
        system_prompt: "",
        messages: &messages,
        model: "test-model",
    };

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_completion(request, tx).await;

    assert!(matches!(result, Err(ProviderError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_stream_failure_event() {
    let mock_server = MockServer::start().await;
    mount_sse(
        &mock_server,
        "event: response.failed\ndata: {\"type\":\"response.failed\",\"response\":{\"error\":{\"message\":\"overloaded\"}}}\n\n",
    )
    .await;

    let provider = ResponsesProvider::new("lmstudio", mock_server.uri(), None);
    let messages = user_history();
    let request = CompletionRequest {
        system_prompt: "",
        messages: &messages,
        model: "test-model",
    };

    let (tx, _rx) = mpsc::channel(100);
    let result = provider.stream_completion(request, tx).await;

    assert!(matches!(result, Err(ProviderError::Api { .. })));
}

#[tokio::test]
async fn test_channel_closed_error() {
    let mock_server = MockServer::start().await;
    mount_sse(&mock_server, HELLO_SSE).await;

    let provider = ResponsesProvider::new("lmstudio", mock_server.uri(), None);
    let messages = user_history();
    let request = CompletionRequest {
        system_prompt: "",
        messages: &messages,
        model: "test-model",
    };

    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let result = provider.stream_completion(request, tx).await;

    assert!(matches!(result, Err(ProviderError::ChannelClosed)));
}

#[tokio::test]
async fn test_unknown_event_types_are_ignored() {
    let mock_server = MockServer::start().await;
    mount_sse(
        &mock_server,
        "\
event: response.in_progress
data: {\"status\":\"working\"}

event: response.output_text.delta
data: {\"delta\":\"Text\"}

event: response.metadata
data: {\"usage\":100}

event: response.completed
data: {\"id\":\"test\"}
",
    )
    .await;

    let provider = ResponsesProvider::new("lmstudio", mock_server.uri(), None);
    let messages = user_history();
    let request = CompletionRequest {
        system_prompt: "",
        messages: &messages,
        model: "test-model",
    };

    let (tx, rx) = mpsc::channel(100);
    assert!(provider.stream_completion(request, tx).await.is_ok());
    assert_eq!(collect_content(rx).await, vec!["Text"]);
}

// ============================================================================
// Session + Controller Tests
// ============================================================================

#[tokio::test]
async fn test_submit_through_session_appends_reply() {
    let mock_server = MockServer::start().await;
    mount_sse(&mock_server, HELLO_SSE).await;

    let provider: Arc<dyn CompletionProvider> =
        Arc::new(ResponsesProvider::new("lmstudio", mock_server.uri(), None));
    let session = ChatSession::new(provider, "test-model".into(), String::new());
    let mut controller = SubmissionController::default();
    controller.set_draft("Hi there");

    let outcome = controller.submit(&session, None).await;

    assert!(matches!(outcome, SubmitOutcome::Settled(Ok(()))));
    assert!(controller.draft().is_empty());
    assert!(!controller.is_pending());
    assert!(!session.loading());

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Hi there");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Hello world");
}

#[tokio::test]
async fn test_failed_submit_records_session_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let provider: Arc<dyn CompletionProvider> =
        Arc::new(ResponsesProvider::new("lmstudio", mock_server.uri(), None));
    let session = ChatSession::new(provider, "test-model".into(), String::new());
    let mut controller = SubmissionController::default();
    controller.set_draft("Will this work?");

    let outcome = controller.submit(&session, None).await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Settled(Err(SendError::Provider(ProviderError::Api { status: 500, .. })))
    ));
    assert!(controller.draft().is_empty(), "no rollback on failure");
    assert!(!session.loading());
    assert!(session.error().is_some());
    assert_eq!(session.messages().len(), 1);
}
