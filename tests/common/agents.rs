//! Mock A2A agent servers
//!
//! Helpers that stand up wiremock endpoints shaped like a real agent: the
//! well-known card, the health probe, and the JSON-RPC surface at the base
//! URL. RPC mocks discriminate on the `method` field so one server can serve
//! several operations.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use a2a_gateway::A2aConfig;

/// A config tuned for fast tests: no real backoff waits, quick polls
pub fn fast_config(urls: Vec<String>) -> A2aConfig {
    let mut config = A2aConfig::new(urls)
        .with_max_retries(1)
        .with_initial_backoff(Duration::from_millis(10))
        .with_retry_interval(Duration::from_millis(20));
    config.reconnect.interval = Duration::from_millis(50);
    config.polling.status_interval = Duration::from_millis(50);
    config.polling.task_interval = Duration::from_millis(10);
    config.polling.max_poll_attempts = 5;
    config
}

/// A minimal agent card document
pub fn card_json(name: &str, url: &str, streaming: bool) -> Value {
    json!({
        "name": name,
        "description": format!("{name} test agent"),
        "version": "1.0.0",
        "url": url,
        "capabilities": {
            "streaming": streaming,
            "pushNotifications": false,
            "stateTransitionHistory": false
        },
        "skills": [{
            "id": "calc",
            "name": "Calculator",
            "description": "Evaluates arithmetic expressions"
        }],
        "defaultInputModes": ["text"],
        "defaultOutputModes": ["text"]
    })
}

/// Serve `card` from the well-known path, with an exact hit count
pub async fn mount_card(server: &MockServer, card: Value, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(card))
        .expect(expected_hits)
        .mount(server)
        .await;
}

/// Serve the health endpoint with `status`
pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Wrap `result` in a JSON-RPC success envelope
pub fn rpc_result(result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": "test-id"
    })
}

/// A task document in `state`, optionally carrying a status message text
pub fn task_json(id: &str, state: &str, text: Option<&str>) -> Value {
    let mut task = json!({
        "kind": "task",
        "id": id,
        "contextId": "ctx-1",
        "status": { "state": state }
    });
    if let Some(text) = text {
        task["status"]["message"] = json!({
            "role": "agent",
            "parts": [{ "kind": "text", "text": text }],
            "messageId": "msg-1"
        });
    }
    task
}

/// Answer JSON-RPC calls of `rpc_method` with `result`
pub async fn mount_rpc(server: &MockServer, rpc_method: &str, result: Value) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(rpc_result(result)))
        .mount(server)
        .await;
}

/// Answer `message/stream` with an SSE body of `events` plus the sentinel
///
/// Each event rides in a JSON-RPC success envelope, the way real agents
/// frame their streams.
pub async fn mount_stream(server: &MockServer, events: &[Value]) {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {}\n\n", rpc_result(event.clone())));
    }
    body.push_str("data: [DONE]\n\n");

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": "message/stream" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

/// An artifact-update event document with a single text part
pub fn artifact_update_json(task_id: &str, text: &str) -> Value {
    json!({
        "kind": "artifact-update",
        "taskId": task_id,
        "contextId": "ctx-1",
        "artifact": {
            "artifactId": "a1",
            "parts": [{ "kind": "text", "text": text }]
        }
    })
}

/// A status-update event document
pub fn status_update_json(task_id: &str, state: &str, text: Option<&str>, is_final: bool) -> Value {
    let mut event = json!({
        "kind": "status-update",
        "taskId": task_id,
        "contextId": "ctx-1",
        "status": { "state": state },
        "final": is_final
    });
    if let Some(text) = text {
        event["status"]["message"] = json!({
            "role": "agent",
            "parts": [{ "kind": "text", "text": text }],
            "messageId": "msg-1"
        });
    }
    event
}
