//! Error handling for the gateway core
//!
//! Two layers, mirroring the split between gateway-level and protocol-level
//! failures: [`GatewayError`] is what callers of the orchestrator see,
//! [`A2aError`] is what the protocol client produces.

use thiserror::Error;

use crate::protocol::task::TaskState;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway core
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors (provider/model unset, bad env values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat provider errors
    #[error("Provider error: {0}")]
    Provider(String),

    /// A2A protocol client errors
    #[error(transparent)]
    A2a(#[from] A2aError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request was canceled before completing
    #[error("Request canceled: {0}")]
    Canceled(String),
}

/// Result type for A2A protocol operations
pub type A2aResult<T> = std::result::Result<T, A2aError>;

/// A2A-specific errors
#[derive(Error, Debug)]
pub enum A2aError {
    /// No agent URLs were configured
    #[error("no A2A agent URLs configured")]
    NoAgentUrls,

    /// Every configured agent failed to initialize
    #[error("no A2A agents could be initialized")]
    NoAgentsInitialized,

    /// An RPC was attempted before `initialize_all`
    #[error("A2A client is not initialized")]
    NotInitialized,

    /// The URL is not one of the configured agents
    #[error("agent not found: {url}")]
    AgentNotFound {
        /// The unconfigured URL
        url: String,
    },

    /// Transport-level failure reaching the agent
    #[error("connection error for agent '{url}': {message}")]
    Connection {
        /// Agent URL
        url: String,
        /// Underlying failure
        message: String,
    },

    /// The request to the agent timed out
    #[error("timeout talking to agent '{url}'")]
    Timeout {
        /// Agent URL
        url: String,
    },

    /// The agent returned a JSON-RPC error object
    #[error("JSON-RPC error {code} from agent '{url}': {message}")]
    Rpc {
        /// Agent URL
        url: String,
        /// JSON-RPC error code
        code: i32,
        /// JSON-RPC error message
        message: String,
    },

    /// The task reached a terminal failure state
    #[error("task '{task_id}' ended in state '{state}'{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    TaskTerminated {
        /// Task identifier
        task_id: String,
        /// Terminal state the task ended in
        state: TaskState,
        /// Text of the task's final status message, when present
        detail: Option<String>,
    },

    /// Polling gave up before the task completed
    #[error("timed out waiting for task '{task_id}' after {attempts} poll attempts")]
    PollTimeout {
        /// Task identifier
        task_id: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// Malformed wire data or unexpected protocol shape
    #[error("A2A protocol error: {0}")]
    Protocol(String),

    /// Serialization errors on the wire path
    #[error("A2A serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl A2aError {
    /// Map a reqwest failure to the closest protocol error
    pub fn from_http(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            A2aError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            A2aError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            }
        } else {
            A2aError::Protocol(e.to_string())
        }
    }
}
