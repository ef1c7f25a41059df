//! A2A protocol wire types
//!
//! JSON-RPC 2.0 envelopes and the Agent Card / Task / Message entities used
//! by the `message/send`, `message/stream`, `tasks/get` and `tasks/cancel`
//! methods.

pub mod card;
pub mod events;
pub mod jsonrpc;
pub mod message;
pub mod task;

pub use card::{AgentCapabilities, AgentCard, AgentSkill};
pub use events::{TaskArtifactUpdateEvent, TaskEvent, TaskStatusUpdateEvent};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
pub use message::{
    Message, MessageSendConfiguration, MessageSendParams, Part, SendMessageResult,
};
pub use task::{Artifact, Task, TaskIdParams, TaskQueryParams, TaskState, TaskStatus};
