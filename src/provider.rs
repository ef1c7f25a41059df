//! Chat-completion transport trait
//!
//! The orchestrator treats the upstream model as a collaborator behind this
//! trait: one blocking call, one SSE-shaped stream. Provider-specific
//! transports implement it elsewhere in the gateway.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::chat::{ChatCompletionRequest, ChatCompletionResponse};
use crate::error::Result;

/// Stream of SSE data payloads
///
/// Each item is the JSON payload of one `data: <json>` line, without the
/// `data: ` prefix and without the trailing `[DONE]` sentinel; the consumer
/// re-frames and terminates the stream itself.
pub type ChatStream = BoxStream<'static, Result<String>>;

/// Unified chat-completion interface
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name, used for routing and logging
    fn name(&self) -> &'static str;

    /// Send a chat completion request and wait for the full response
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;

    /// Send a chat completion request and stream the response chunks
    async fn chat_completion_stream(&self, request: &ChatCompletionRequest)
        -> Result<ChatStream>;
}
