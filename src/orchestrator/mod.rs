//! Agent orchestration
//!
//! The bounded tool-calling loop that sits between the upstream model and
//! remote A2A agents: inspects model output for agent tool calls, dispatches
//! them through the protocol client, and feeds results back into the
//! conversation, in both buffered and SSE streaming modes.

pub mod accumulator;
mod dispatch;
pub mod orchestrator;
pub mod result;
pub mod tools;

pub use accumulator::ToolCallAccumulator;
pub use orchestrator::{AgentOrchestrator, MAX_AGENT_ITERATIONS};
pub use result::extract_task_result;
pub use tools::{AgentTool, QueryAgentCardArgs, SubmitTaskArgs};
