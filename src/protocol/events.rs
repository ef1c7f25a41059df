//! Streaming task update events
//!
//! Each `message/stream` SSE frame carries a JSON-RPC success envelope whose
//! `result` is one of these events, discriminated by `kind`.

use serde::{Deserialize, Serialize};

use super::task::{Artifact, TaskStatus};

/// A streamed task update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TaskEvent {
    /// Task status changed
    #[serde(rename = "status-update")]
    StatusUpdate(TaskStatusUpdateEvent),

    /// Task produced (part of) an artifact
    #[serde(rename = "artifact-update")]
    ArtifactUpdate(TaskArtifactUpdateEvent),
}

/// `status-update` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusUpdateEvent {
    /// Task identifier
    #[serde(rename = "taskId")]
    pub task_id: String,

    /// Context identifier
    #[serde(rename = "contextId", skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// New status
    pub status: TaskStatus,

    /// Whether this is the last event of the stream
    #[serde(rename = "final", default)]
    pub is_final: bool,
}

/// `artifact-update` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskArtifactUpdateEvent {
    /// Task identifier
    #[serde(rename = "taskId")]
    pub task_id: String,

    /// Context identifier
    #[serde(rename = "contextId", skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// The artifact chunk
    pub artifact: Artifact,

    /// Whether this is the last chunk of the artifact
    #[serde(rename = "lastChunk", skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<bool>,
}
