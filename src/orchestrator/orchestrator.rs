//! Bounded tool-calling loop
//!
//! Runs the conversation between the upstream model and remote agents in
//! both buffered and SSE streaming modes. Each iteration sends the
//! conversation to the model, executes any agent tool calls it requests, and
//! appends the results; the loop ends when the model answers without tool
//! calls, when every call in a turn was a task submission, or when the
//! iteration cap is hit.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::{
    ChatChoice, ChatChunkChoice, ChatCompletionChunk, ChatCompletionRequest,
    ChatCompletionResponse, ChatDelta, ChatMessage, MessageRole,
};
use crate::client::A2aClient;
use crate::error::{GatewayError, Result};
use crate::provider::ChatProvider;

use super::accumulator::ToolCallAccumulator;

/// Upper bound on model round-trips in a single orchestration
pub const MAX_AGENT_ITERATIONS: usize = 10;

/// Orchestrates tool-calling conversations against A2A agents
pub struct AgentOrchestrator {
    pub(super) client: Arc<A2aClient>,
    provider: Option<Arc<dyn ChatProvider>>,
    model: Option<String>,
}

impl AgentOrchestrator {
    /// Create an orchestrator over `client`
    ///
    /// Running requires a provider and model, set via
    /// [`with_provider`](Self::with_provider) and
    /// [`with_model`](Self::with_model); both loops fail fast without them.
    pub fn new(client: Arc<A2aClient>) -> Self {
        Self {
            client,
            provider: None,
            model: None,
        }
    }

    /// Set the upstream chat provider used for follow-up model calls
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model name used for follow-up model calls
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    fn require_provider(&self) -> Result<&Arc<dyn ChatProvider>> {
        self.provider
            .as_ref()
            .ok_or_else(|| GatewayError::Config("no chat provider configured".to_string()))
    }

    fn require_model(&self) -> Result<&str> {
        self.model
            .as_deref()
            .ok_or_else(|| GatewayError::Config("no model configured".to_string()))
    }

    /// Drive a buffered conversation to completion
    ///
    /// `initial` is the model's first response to `request`; the caller has
    /// already made that call. The request's message history is extended in
    /// place so the caller sees the full conversation afterwards.
    pub async fn run(
        &self,
        request: &mut ChatCompletionRequest,
        initial: ChatCompletionResponse,
    ) -> Result<ChatCompletionResponse> {
        let provider = self.require_provider()?;
        let model = self.require_model()?;
        let mut response = initial;

        for iteration in 1..=MAX_AGENT_ITERATIONS {
            let tool_calls = response.tool_calls().to_vec();
            if tool_calls.is_empty() {
                debug!(iteration, "No tool calls, orchestration complete");
                return Ok(response);
            }

            info!(
                iteration,
                tool_calls = tool_calls.len(),
                "Executing agent tool calls"
            );
            request
                .messages
                .push(ChatMessage::assistant_tool_calls(tool_calls.clone()));

            let (results, all_submissions) =
                self.execute_turn(&tool_calls, request.is_streaming()).await;
            let combined = results
                .iter()
                .filter_map(|m| m.content.as_deref())
                .collect::<Vec<_>>()
                .join("\n\n");
            request.messages.extend(results);

            // A turn made purely of task submissions already holds the
            // final answer; skip the extra model round-trip.
            if all_submissions {
                debug!(iteration, "All calls were task submissions, finishing early");
                return Ok(self.synthesize_response(&response.model, combined));
            }

            request.model = model.to_string();
            response = provider.chat_completion(request).await?;
        }

        warn!(
            max_iterations = MAX_AGENT_ITERATIONS,
            "Agent iteration cap reached, returning last response"
        );
        Ok(response)
    }

    /// Drive a streaming conversation, writing SSE frames to `tx`
    ///
    /// Every provider chunk is forwarded verbatim; tool-call fragments are
    /// reassembled on the side and executed between iterations. Exactly one
    /// `data: [DONE]` frame closes the stream, on every exit path.
    pub async fn run_with_stream(
        &self,
        request: ChatCompletionRequest,
        tx: mpsc::Sender<Bytes>,
    ) -> Result<()> {
        let result = self.stream_loop(request, &tx).await;
        // The sentinel goes out even on errors; a dropped receiver makes
        // the send a no-op.
        let _ = tx.send(Bytes::from_static(b"data: [DONE]\n\n")).await;
        result
    }

    async fn stream_loop(
        &self,
        mut request: ChatCompletionRequest,
        tx: &mpsc::Sender<Bytes>,
    ) -> Result<()> {
        let provider = self.require_provider()?.clone();
        let model = self.require_model()?.to_string();
        request.stream = Some(true);
        request.model = model.clone();

        for iteration in 1..=MAX_AGENT_ITERATIONS {
            let mut stream = provider.chat_completion_stream(&request).await?;
            let mut accumulator = ToolCallAccumulator::new();

            'chunks: while let Some(payload) = stream.next().await {
                let payload = payload?;
                let chunk: ChatCompletionChunk = serde_json::from_str(&payload)?;

                let mut finished = false;
                for choice in &chunk.choices {
                    if let Some(deltas) = &choice.delta.tool_calls {
                        accumulator.ingest(deltas);
                    }
                    if matches!(
                        choice.finish_reason.as_deref(),
                        Some("tool_calls") | Some("stop")
                    ) {
                        finished = true;
                    }
                }

                send_frame(tx, &payload).await?;
                if finished {
                    break 'chunks;
                }
            }

            let tool_calls = accumulator.finish();
            if tool_calls.is_empty() {
                debug!(iteration, "Stream finished without tool calls");
                return Ok(());
            }

            info!(
                iteration,
                tool_calls = tool_calls.len(),
                "Executing agent tool calls from stream"
            );
            request
                .messages
                .push(ChatMessage::assistant_tool_calls(tool_calls.clone()));

            let (results, all_submissions) = self.execute_turn(&tool_calls, true).await;
            let combined = results
                .iter()
                .filter_map(|m| m.content.as_deref())
                .collect::<Vec<_>>()
                .join("\n\n");
            request.messages.extend(results);

            if all_submissions {
                debug!(iteration, "All calls were task submissions, finishing early");
                let chunk = self.synthesize_chunk(&model, combined);
                send_frame(tx, &serde_json::to_string(&chunk)?).await?;
                return Ok(());
            }
        }

        warn!(
            max_iterations = MAX_AGENT_ITERATIONS,
            "Agent iteration cap reached, terminating stream"
        );
        Ok(())
    }

    /// Build a buffered response carrying `content` as the final answer
    fn synthesize_response(&self, model: &str, content: String) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            object: "chat.completion".to_string(),
            created: unix_now(),
            model: model.to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage::assistant(content),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }

    /// Build a terminal streaming chunk carrying `content`
    fn synthesize_chunk(&self, model: &str, content: String) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: format!("chatcmpl-{}", Uuid::new_v4()),
            object: "chat.completion.chunk".to_string(),
            created: unix_now(),
            model: model.to_string(),
            choices: vec![ChatChunkChoice {
                index: 0,
                delta: ChatDelta {
                    role: Some(MessageRole::Assistant),
                    content: Some(content),
                    tool_calls: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
        }
    }
}

async fn send_frame(tx: &mpsc::Sender<Bytes>, payload: &str) -> Result<()> {
    tx.send(Bytes::from(format!("data: {payload}\n\n")))
        .await
        .map_err(|_| GatewayError::Canceled("stream receiver dropped".to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
