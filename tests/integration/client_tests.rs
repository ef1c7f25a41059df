//! A2A client integration tests
//!
//! Drive the client against wiremock agents: initialization and retries,
//! card caching, background reconnection, status polling, and the RPC
//! surface.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use a2a_gateway::error::A2aError;
use a2a_gateway::protocol::{
    MessageSendParams, SendMessageResult, TaskIdParams, TaskQueryParams, TaskState,
};
use a2a_gateway::{A2aClient, AgentState};

use crate::common::agents::{
    card_json, fast_config, mount_card, mount_health, mount_rpc, mount_stream,
    status_update_json, task_json,
};

async fn initialized_client(server: &MockServer) -> A2aClient {
    let client = A2aClient::new(fast_config(vec![server.uri()])).unwrap();
    client.initialize_all().await.unwrap();
    client
}

#[tokio::test]
async fn test_initialize_caches_card() {
    let server = MockServer::start().await;
    // One fetch at initialization; later card reads hit the cache.
    mount_card(&server, card_json("calc", &server.uri(), false), 1).await;

    let client = initialized_client(&server).await;
    assert_eq!(client.agent_status(&server.uri()).await, AgentState::Available);

    let card = client.get_agent_card(&server.uri()).await.unwrap();
    assert_eq!(card.name, "calc");
    let card = client.get_agent_card(&server.uri()).await.unwrap();
    assert_eq!(card.name, "calc");

    let caps = client.agent_capabilities(&server.uri()).await.unwrap();
    assert!(!caps.streaming);
}

#[tokio::test]
async fn test_refresh_refetches_card() {
    let server = MockServer::start().await;
    mount_card(&server, card_json("calc", &server.uri(), false), 2).await;

    let client = initialized_client(&server).await;
    client.refresh_agent_card(&server.uri()).await.unwrap();
}

#[tokio::test]
async fn test_initialize_retries_before_succeeding() {
    let server = MockServer::start().await;
    // First attempt fails, the retry lands.
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_card(&server, card_json("calc", &server.uri(), false), 1).await;

    let client = initialized_client(&server).await;
    assert_eq!(client.agent_status(&server.uri()).await, AgentState::Available);
}

#[tokio::test]
async fn test_partial_initialization_is_not_an_error() {
    let up = MockServer::start().await;
    mount_card(&up, card_json("up", &up.uri(), false), 1).await;

    let mut config = fast_config(vec![up.uri(), "http://127.0.0.1:9".to_string()]);
    config.reconnect.enabled = false;
    let client = A2aClient::new(config).unwrap();

    client.initialize_all().await.unwrap();
    assert_eq!(client.agent_status(&up.uri()).await, AgentState::Available);
    assert_eq!(
        client.agent_status("http://127.0.0.1:9").await,
        AgentState::Unavailable
    );
}

#[tokio::test]
async fn test_total_initialization_failure_then_reconnect() {
    let server = MockServer::start().await;
    // Both initial attempts fail; the reconnection loop then recovers.
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(card_json("calc", &server.uri(), false)),
        )
        .mount(&server)
        .await;

    let client = A2aClient::new(fast_config(vec![server.uri()])).unwrap();
    let err = client.initialize_all().await.unwrap_err();
    assert!(matches!(err, A2aError::NoAgentsInitialized));

    // Wait for the background loop to flip the agent Available.
    let mut recovered = false;
    for _ in 0..50 {
        if client.agent_status(&server.uri()).await == AgentState::Available {
            recovered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(recovered, "agent never recovered via reconnection");

    // The client is usable without another initialize_all.
    mount_rpc(
        &server,
        "message/send",
        task_json("t1", "completed", Some("ok")),
    )
    .await;
    let result = client
        .send_message(MessageSendParams::user_text("hi"), &server.uri())
        .await
        .unwrap();
    assert!(matches!(result, SendMessageResult::Task(_)));
}

#[tokio::test]
async fn test_send_message_task_result() {
    let server = MockServer::start().await;
    mount_card(&server, card_json("calc", &server.uri(), false), 1).await;
    mount_rpc(
        &server,
        "message/send",
        task_json("t1", "completed", Some("the answer is 8")),
    )
    .await;

    let client = initialized_client(&server).await;
    let result = client
        .send_message(MessageSendParams::user_text("what is 3 + 5?"), &server.uri())
        .await
        .unwrap();

    match result {
        SendMessageResult::Task(task) => {
            assert_eq!(task.id, "t1");
            assert_eq!(task.status.state, TaskState::Completed);
            assert_eq!(
                task.status.message.unwrap().first_text(),
                Some("the answer is 8")
            );
        }
        SendMessageResult::Message(_) => panic!("expected a task result"),
    }
}

#[tokio::test]
async fn test_send_message_message_result() {
    let server = MockServer::start().await;
    mount_card(&server, card_json("echo", &server.uri(), false), 1).await;
    mount_rpc(
        &server,
        "message/send",
        json!({
            "kind": "message",
            "role": "agent",
            "parts": [{ "kind": "text", "text": "hello back" }],
            "messageId": "m1"
        }),
    )
    .await;

    let client = initialized_client(&server).await;
    let result = client
        .send_message(MessageSendParams::user_text("hello"), &server.uri())
        .await
        .unwrap();

    match result {
        SendMessageResult::Message(message) => {
            assert_eq!(message.first_text(), Some("hello back"));
        }
        SendMessageResult::Task(_) => panic!("expected a message result"),
    }
}

#[tokio::test]
async fn test_rpc_error_surfaces() {
    let server = MockServer::start().await;
    mount_card(&server, card_json("calc", &server.uri(), false), 1).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "method": "tasks/get" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": { "code": -32001, "message": "Task not found" },
            "id": "test-id"
        })))
        .mount(&server)
        .await;

    let client = initialized_client(&server).await;
    let err = client
        .get_task(
            TaskQueryParams {
                id: "missing".to_string(),
                history_length: None,
            },
            &server.uri(),
        )
        .await
        .unwrap_err();

    match err {
        A2aError::Rpc { code, message, .. } => {
            assert_eq!(code, -32001);
            assert_eq!(message, "Task not found");
        }
        other => panic!("expected an RPC error, got {other}"),
    }
}

#[tokio::test]
async fn test_cancel_task() {
    let server = MockServer::start().await;
    mount_card(&server, card_json("calc", &server.uri(), false), 1).await;
    mount_rpc(&server, "tasks/cancel", task_json("t1", "canceled", None)).await;

    let client = initialized_client(&server).await;
    let task = client
        .cancel_task(
            TaskIdParams {
                id: "t1".to_string(),
            },
            &server.uri(),
        )
        .await
        .unwrap();
    assert_eq!(task.status.state, TaskState::Canceled);
}

#[tokio::test]
async fn test_streaming_message_relays_events() {
    let server = MockServer::start().await;
    mount_card(&server, card_json("calc", &server.uri(), true), 1).await;
    mount_stream(
        &server,
        &[
            status_update_json("t1", "working", None, false),
            status_update_json("t1", "completed", Some("done"), true),
        ],
    )
    .await;

    let client = initialized_client(&server).await;
    let mut rx = client
        .send_streaming_message(MessageSendParams::user_text("go"), &server.uri())
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Some(payload) = rx.recv().await {
        let event: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        events.push(event);
    }

    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["kind"], "status-update");
    assert_eq!(events[1]["final"], true);
    assert_eq!(
        events[1]["status"]["message"]["parts"][0]["text"],
        "done"
    );
}

#[tokio::test]
async fn test_status_polling_marks_unhealthy_agent() {
    let server = MockServer::start().await;
    // Initialization succeeds, then both probes fail.
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(card_json("calc", &server.uri(), false)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_health(&server, 500).await;

    let mut config = fast_config(vec![server.uri()]);
    config.reconnect.enabled = false;
    let client = A2aClient::new(config).unwrap();
    client.initialize_all().await.unwrap();
    client.start_status_polling().await;

    let mut flipped = false;
    for _ in 0..50 {
        if client.agent_status(&server.uri()).await == AgentState::Unavailable {
            flipped = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    client.stop_status_polling().await;
    assert!(flipped, "polling never marked the agent unavailable");
}

#[tokio::test]
async fn test_status_polling_recovers_via_health() {
    let server = MockServer::start().await;
    mount_card(&server, card_json("calc", &server.uri(), false), 1).await;
    mount_health(&server, 200).await;

    let client = initialized_client(&server).await;
    client.start_status_polling().await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(client.agent_status(&server.uri()).await, AgentState::Available);
    client.stop_status_polling().await;

    // Stopping twice is harmless.
    client.stop_status_polling().await;
}
