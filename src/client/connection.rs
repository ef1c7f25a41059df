//! Transport handle for a single agent
//!
//! One JSON-RPC POST per call against the agent's base URL; SSE consumption
//! for `message/stream`; plain GETs for the card and health probes.

use futures::stream::BoxStream;
use futures_util::StreamExt;
use tracing::debug;

use crate::error::{A2aError, A2aResult};
use crate::protocol::card::AgentCard;
use crate::protocol::events::TaskEvent;
use crate::protocol::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use crate::protocol::message::{MessageSendParams, SendMessageResult};
use crate::protocol::task::{Task, TaskIdParams, TaskQueryParams};

/// Stream of task update events from `message/stream`
pub type TaskEventStream = BoxStream<'static, A2aResult<TaskEvent>>;

/// Logical connection to one agent
#[derive(Debug, Clone)]
pub struct AgentConnection {
    url: String,
    http: reqwest::Client,
}

impl AgentConnection {
    /// Create a connection to the agent at `url`
    pub fn new(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }

    /// The agent's base URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the agent's card from `/.well-known/agent.json`
    pub async fn fetch_agent_card(&self) -> A2aResult<AgentCard> {
        let card_url = format!("{}/.well-known/agent.json", self.url.trim_end_matches('/'));
        let response = self
            .http
            .get(&card_url)
            .send()
            .await
            .map_err(|e| A2aError::from_http(&self.url, e))?;

        if !response.status().is_success() {
            return Err(A2aError::Connection {
                url: self.url.clone(),
                message: format!("card fetch returned HTTP {}", response.status()),
            });
        }

        response
            .json::<AgentCard>()
            .await
            .map_err(|e| A2aError::Protocol(format!("invalid agent card: {}", e)))
    }

    /// Probe the agent's health endpoint
    pub async fn check_health(&self) -> bool {
        let health_url = format!("{}/health", self.url.trim_end_matches('/'));
        match self.http.get(&health_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(url = %self.url, error = %e, "Health probe failed");
                false
            }
        }
    }

    /// `message/send`: blocking task submission
    pub async fn send_message(&self, params: MessageSendParams) -> A2aResult<SendMessageResult> {
        let request = JsonRpcRequest::new("message/send", &params)?;
        let result = self.post_rpc(&request).await?;
        serde_json::from_value(result)
            .map_err(|e| A2aError::Protocol(format!("invalid message/send result: {}", e)))
    }

    /// `message/stream`: streaming task submission
    ///
    /// Fails synchronously if the stream cannot be opened; stream items carry
    /// per-event decode failures.
    pub async fn send_message_streaming(
        &self,
        params: MessageSendParams,
    ) -> A2aResult<TaskEventStream> {
        let request = JsonRpcRequest::new("message/stream", &params)?;
        let response = self
            .http
            .post(&self.url)
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(|e| A2aError::from_http(&self.url, e))?;

        if !response.status().is_success() {
            return Err(A2aError::Connection {
                url: self.url.clone(),
                message: format!("message/stream returned HTTP {}", response.status()),
            });
        }

        let url = self.url.clone();
        let mut body = response.bytes_stream();

        let stream = async_stream::try_stream! {
            let mut buffer = String::new();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| A2aError::from_http(&url, e))?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find("\n\n") {
                    let frame = buffer[..pos].to_string();
                    buffer.drain(..pos + 2);

                    for line in frame.lines() {
                        if let Some(data) = line.strip_prefix("data:") {
                            let data = data.trim();
                            if data.is_empty() || data == "[DONE]" {
                                continue;
                            }
                            if let Some(event) = decode_stream_frame(&url, data)? {
                                yield event;
                            }
                        }
                    }
                }
            }
        };

        Ok(stream.boxed())
    }

    /// `tasks/get`
    pub async fn get_task(&self, params: TaskQueryParams) -> A2aResult<Task> {
        let request = JsonRpcRequest::new("tasks/get", &params)?;
        let result = self.post_rpc(&request).await?;
        serde_json::from_value(result)
            .map_err(|e| A2aError::Protocol(format!("invalid tasks/get result: {}", e)))
    }

    /// `tasks/cancel`
    pub async fn cancel_task(&self, params: TaskIdParams) -> A2aResult<Task> {
        let request = JsonRpcRequest::new("tasks/cancel", &params)?;
        let result = self.post_rpc(&request).await?;
        serde_json::from_value(result)
            .map_err(|e| A2aError::Protocol(format!("invalid tasks/cancel result: {}", e)))
    }

    /// One JSON-RPC POST, decoded down to the `result` value
    async fn post_rpc(&self, request: &JsonRpcRequest) -> A2aResult<serde_json::Value> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| A2aError::from_http(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(A2aError::Connection {
                url: self.url.clone(),
                message: format!("{} returned HTTP {}", request.method, status),
            });
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| A2aError::Protocol(format!("invalid JSON-RPC response: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(A2aError::Rpc {
                url: self.url.clone(),
                code: error.code,
                message: error.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| A2aError::Protocol("JSON-RPC response without result".to_string()))
    }
}

/// Decode one SSE data payload into a task event
///
/// Frames that are JSON-RPC error envelopes become errors; frames whose
/// result is not a recognized event kind are skipped.
fn decode_stream_frame(url: &str, data: &str) -> A2aResult<Option<TaskEvent>> {
    let envelope: JsonRpcResponse = serde_json::from_str(data)
        .map_err(|e| A2aError::Protocol(format!("invalid streaming frame: {}", e)))?;

    if let Some(error) = envelope.error {
        return Err(A2aError::Rpc {
            url: url.to_string(),
            code: error.code,
            message: error.message,
        });
    }

    let Some(result) = envelope.result else {
        return Ok(None);
    };

    match serde_json::from_value::<TaskEvent>(result) {
        Ok(event) => Ok(Some(event)),
        Err(e) => {
            debug!(url, error = %e, "Skipping unrecognized stream event");
            Ok(None)
        }
    }
}
