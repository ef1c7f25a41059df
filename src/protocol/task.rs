//! A2A task entities and `tasks/*` parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::{Message, Part};

/// A unit of work submitted to an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier
    pub id: String,

    /// Context the task belongs to
    #[serde(rename = "contextId", default)]
    pub context_id: String,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Output artifacts, once produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<Artifact>>,

    /// Message history, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,
}

/// Task status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    /// Current state
    pub state: TaskState,

    /// Status message carrying the result or progress detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Timestamp of the status change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Accepted, not started
    Submitted,

    /// In progress
    Working,

    /// Waiting for caller input
    InputRequired,

    /// Waiting for authentication
    AuthRequired,

    /// Finished successfully
    Completed,

    /// Finished with an error
    Failed,

    /// Canceled by the caller
    Canceled,

    /// Refused by the agent
    Rejected,

    /// Unrecognized state
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskState {
    /// Whether the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Rejected
        )
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::AuthRequired => "auth-required",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
            TaskState::Rejected => "rejected",
            TaskState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Task output artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact identifier
    #[serde(rename = "artifactId", skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,

    /// Artifact name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Artifact content parts
    pub parts: Vec<Part>,
}

/// Parameters for `tasks/get`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQueryParams {
    /// Task identifier
    pub id: String,

    /// How much history to include
    #[serde(rename = "historyLength", skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
}

/// Parameters for `tasks/cancel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskIdParams {
    /// Task identifier
    pub id: String,
}
