//! Integration tests for the triage agent against a fake Responses endpoint.
//!
//! Each test spins up an Axum server on a random port that impersonates
//! `POST /v1/responses`, then drives the real `OpenAiResponsesProvider`
//! through `TriageAgent`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use mail_triage::agent::TriageAgent;
use mail_triage::config::AgentConfig;
use mail_triage::email::{Email, EmailState};
use mail_triage::error::LlmError;
use mail_triage::inbox::{BatchState, Inbox};
use mail_triage::llm::{
    ChatMessage, LlmBackend, LlmConfig, LlmProvider, OpenAiResponsesProvider, ToolCompletionRequest,
};
use mail_triage::tools::ToolCatalog;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct FakeResponses {
    status: StatusCode,
    body: Value,
    seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn responses(
    State(fake): State<FakeResponses>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.seen.lock().unwrap().push((headers, request));
    (fake.status, Json(fake.body.clone()))
}

/// Start a fake Responses server, return (base_url, recorded requests).
async fn start_server(
    status: StatusCode,
    body: Value,
) -> (String, Arc<Mutex<Vec<(HeaderMap, Value)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/responses", post(responses))
        .with_state(FakeResponses {
            status,
            body,
            seen: Arc::clone(&seen),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}/v1"), seen)
}

fn agent_for(base_url: &str) -> TriageAgent {
    let config = LlmConfig {
        backend: LlmBackend::OpenAi,
        api_key: secrecy::SecretString::from("sk-test"),
        model: "gpt-4.1".to_string(),
        base_url: base_url.to_string(),
    };
    TriageAgent::from_config(&config, AgentConfig::default()).unwrap()
}

fn function_call(name: &str, arguments: Value) -> Value {
    json!({
        "type": "function_call",
        "id": format!("fc_{name}"),
        "call_id": format!("call_{name}"),
        "name": name,
        "arguments": arguments.to_string(),
        "status": "completed"
    })
}

fn response_body(output: Vec<Value>) -> Value {
    json!({
        "id": "resp_123",
        "object": "response",
        "model": "gpt-4.1",
        "output": output,
        "usage": {"input_tokens": 250, "output_tokens": 40, "total_tokens": 290}
    })
}

#[tokio::test]
async fn test_triage_applies_tool_calls_in_order() {
    let body = response_body(vec![
        json!({"type": "reasoning", "id": "rs_1", "summary": []}),
        function_call("add_tags", json!({"tags": ["invoice", "urgent"]})),
        function_call("draft_response", json!({"draft_email_body": "Thanks, paying today."})),
    ]);
    let (base_url, seen) = start_server(StatusCode::OK, body).await;
    let agent = agent_for(&base_url);

    let mut email = Email::new("inv-1", "Invoice overdue", "Please pay invoice #42.", "");
    let outcome = timeout(TEST_TIMEOUT, agent.process_email(&mut email))
        .await
        .expect("timed out");

    assert!(email.processed);
    assert_eq!(email.state, vec![EmailState::Tagged, EmailState::DraftedResponse]);
    assert_eq!(
        email.tags,
        Some(vec!["invoice".to_string(), "urgent".to_string()])
    );
    assert_eq!(email.drafted_response.as_deref(), Some("Thanks, paying today."));
    assert!(outcome.skipped.is_empty());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (headers, request) = &seen[0];
    assert_eq!(headers["authorization"], "Bearer sk-test");
    assert_eq!(request["model"], "gpt-4.1");
    assert_eq!(request["text"]["format"]["type"], "text");
    assert_eq!(request["input"][0]["role"], "system");
    assert_eq!(request["input"][1]["role"], "user");
    assert!(
        request["input"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Please pay invoice #42.")
    );
    let tool_names: Vec<_> = request["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tool_names, vec!["draft_response", "add_tags", "archive_email"]);
    assert_eq!(request["tools"][0]["type"], "function");
    assert_eq!(request["tools"][0]["strict"], true);
}

#[tokio::test]
async fn test_no_action_message_only_marks_processed() {
    let body = response_body(vec![json!({
        "type": "message",
        "role": "assistant",
        "content": [{"type": "output_text", "text": "NO ACTION", "annotations": []}]
    })]);
    let (base_url, _seen) = start_server(StatusCode::OK, body).await;
    let agent = agent_for(&base_url);

    let mut email = Email::new("promo-1", "50% off", "Huge sale this weekend!", "");
    let outcome = agent.process_email(&mut email).await;

    assert!(email.processed);
    assert!(email.state.is_empty());
    assert_eq!(outcome.text, "NO ACTION");
}

#[tokio::test]
async fn test_auth_failure_is_absorbed() {
    let body = json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}});
    let (base_url, _seen) = start_server(StatusCode::UNAUTHORIZED, body).await;
    let agent = agent_for(&base_url);

    let mut email = Email::new("e1", "Hello", "", "raw body");
    let outcome = agent.process_email(&mut email).await;
    assert!(outcome.inference_failed);
    assert!(email.processed);
    assert!(email.state.is_empty());
    assert_eq!(email.body, "raw body");

    assert_eq!(agent.generate_draft(&mut email).await, "");
}

#[tokio::test]
async fn test_provider_maps_http_errors() {
    let (base_url, _seen) = start_server(StatusCode::UNAUTHORIZED, json!({})).await;
    let provider = OpenAiResponsesProvider::new(
        reqwest::Client::new(),
        secrecy::SecretString::from("sk-bad"),
        "gpt-4.1",
        &base_url,
    );
    let request = ToolCompletionRequest::new(
        vec![ChatMessage::user("hi")],
        ToolCatalog::shared().definitions().to_vec(),
    );
    let err = provider.complete_with_tools(request.clone()).await.unwrap_err();
    assert!(matches!(err, LlmError::AuthFailed { .. }));

    let (base_url, _seen) = start_server(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "down"})).await;
    let provider = OpenAiResponsesProvider::new(
        reqwest::Client::new(),
        secrecy::SecretString::from("sk-test"),
        "gpt-4.1",
        format!("{base_url}/"),
    );
    match provider.complete_with_tools(request).await.unwrap_err() {
        LlmError::RequestFailed { reason, .. } => assert!(reason.contains("500")),
        other => panic!("Expected RequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_draft_from_rfc822_file() {
    let body = response_body(vec![function_call(
        "draft_response",
        json!({"draft_email_body": "Tuesday works for me."}),
    )]);
    let (base_url, seen) = start_server(StatusCode::OK, body).await;
    let agent = agent_for(&base_url);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meeting.eml");
    std::fs::write(
        &path,
        "From: Bob <bob@example.com>\r\n\
         To: me@example.com\r\n\
         Subject: Meeting\r\n\
         Message-ID: <meet-1@example.com>\r\n\
         \r\n\
         Are you free on Tuesday?\r\n",
    )
    .unwrap();

    let mut email = Email::load(&path).unwrap();
    assert_eq!(email.sender(), Some("bob@example.com"));

    let draft = agent.generate_draft(&mut email).await;
    assert_eq!(draft, "Tuesday works for me.");
    assert!(email.state.is_empty());

    let seen = seen.lock().unwrap();
    let prompt = seen[0].1["input"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("Are you free on Tuesday?"));
    assert!(prompt.trim_end().ends_with("RESPONSE:"));
}

#[tokio::test]
async fn test_inbox_batches_through_real_provider() {
    let body = response_body(vec![function_call("archive_email", json!({"archive": true}))]);
    let (base_url, seen) = start_server(StatusCode::OK, body).await;
    let agent = agent_for(&base_url);

    let mut inbox = Inbox::new();
    for i in 0..6 {
        inbox.add(Email::new(format!("n{i}"), "Newsletter", "Weekly digest", ""));
    }

    let first = timeout(TEST_TIMEOUT, inbox.continue_processing(&agent))
        .await
        .expect("timed out");
    assert_eq!(first.state, BatchState::Processed);
    assert_eq!(first.batch.len(), 5);
    assert!(first.batch.iter().all(|e| e.state == vec![EmailState::Archived]));

    let second = inbox.continue_processing(&agent).await;
    assert_eq!(second.batch.len(), 1);
    let done = inbox.continue_processing(&agent).await;
    assert_eq!(done.state, BatchState::Done);

    assert_eq!(seen.lock().unwrap().len(), 6);
}
