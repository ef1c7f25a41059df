//! A2A message entities and `message/send` parameters

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::task::Task;

/// A message exchanged with an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role (user, agent)
    pub role: String,

    /// Message content parts
    pub parts: Vec<Part>,

    /// Message identifier
    #[serde(rename = "messageId", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Task this message belongs to
    #[serde(rename = "taskId", skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Context this message belongs to
    #[serde(rename = "contextId", skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

impl Message {
    /// Create a user message with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
            message_id: Some(uuid::Uuid::new_v4().to_string()),
            task_id: None,
            context_id: None,
        }
    }

    /// First non-empty text part, if any
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(|p| match p {
            Part::Text { text, .. } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Message content part, discriminated by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    /// Text content
    Text {
        /// The text
        text: String,
        /// Part metadata
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },

    /// File content
    File {
        /// File payload (bytes or URI)
        file: FileContent,
        /// Part metadata
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },

    /// Structured data content
    Data {
        /// Arbitrary structured payload
        data: Value,
        /// Part metadata
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            metadata: None,
        }
    }
}

/// File payload inside a file part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    /// File name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// MIME type
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Base64-encoded bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,

    /// URI pointing at the content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Parameters for `message/send` and `message/stream`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSendParams {
    /// The message to send
    pub message: Message,

    /// Optional send configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MessageSendConfiguration>,

    /// Request metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl MessageSendParams {
    /// Build params carrying a single user text message
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            message: Message::user(text),
            configuration: None,
            metadata: None,
        }
    }
}

/// Send configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageSendConfiguration {
    /// Output modes the caller accepts
    #[serde(rename = "acceptedOutputModes", skip_serializing_if = "Option::is_none")]
    pub accepted_output_modes: Option<Vec<String>>,

    /// Whether the call should block until the task settles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,

    /// How much history to return with the task
    #[serde(rename = "historyLength", skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,
}

/// Result of `message/send`, discriminated by `kind`
///
/// Agents either open a task or answer directly with a message; the wire
/// format keeps both under one `result` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SendMessageResult {
    /// The agent created a task for the request
    Task(Task),

    /// The agent answered directly, no task lifecycle involved
    Message(Message),
}
