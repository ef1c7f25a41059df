//! # A2A Gateway
//!
//! Agent orchestration core for an LLM inference gateway: a concurrent
//! [A2A protocol](https://google.github.io/A2A/) client plus a bounded
//! tool-calling loop that lets chat-completion models delegate work to
//! remote agents.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use a2a_gateway::{A2aClient, A2aConfig, AgentOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = A2aConfig::new(vec!["http://localhost:8001".to_string()]);
//!     let client = Arc::new(A2aClient::new(config)?);
//!     client.initialize_all().await?;
//!     client.start_status_polling().await;
//!
//!     let _orchestrator = AgentOrchestrator::new(Arc::clone(&client));
//!     // Wire the orchestrator between your chat provider and your API
//!     // surface; see `AgentOrchestrator::run` and `run_with_stream`.
//!
//!     client.stop_status_polling().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: A2A wire types (JSON-RPC envelopes, messages, tasks,
//!   agent cards, streaming events)
//! - [`client`]: concurrent protocol client with card caching, health
//!   polling and background reconnection
//! - [`orchestrator`]: the tool-calling loop in buffered and SSE modes
//! - [`chat`]: the OpenAI-compatible chat completion types the loop speaks
//! - [`provider`]: the upstream model transport trait

pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod protocol;
pub mod provider;

pub use chat::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, MessageRole};
pub use client::{A2aClient, AgentState};
pub use config::A2aConfig;
pub use error::{A2aError, GatewayError, Result};
pub use orchestrator::{AgentOrchestrator, MAX_AGENT_ITERATIONS};
pub use protocol::{AgentCard, Message, Task, TaskState};
pub use provider::{ChatProvider, ChatStream};
