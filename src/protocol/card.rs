//! Agent Card entities
//!
//! The card is served at `/.well-known/agent.json` and describes the agent's
//! identity, skills and capability flags.

use serde::{Deserialize, Serialize};

/// Descriptor of a remote agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    /// Agent name
    pub name: String,

    /// Agent description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Agent version
    #[serde(default)]
    pub version: String,

    /// Invocation URL advertised by the agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Capability flags
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Advertised skills
    #[serde(default)]
    pub skills: Vec<AgentSkill>,

    /// Input modes accepted when a skill does not override them
    #[serde(rename = "defaultInputModes", default)]
    pub default_input_modes: Vec<String>,

    /// Output modes produced when a skill does not override them
    #[serde(rename = "defaultOutputModes", default)]
    pub default_output_modes: Vec<String>,
}

/// Agent capability flags
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct AgentCapabilities {
    /// Supports `message/stream`
    #[serde(default)]
    pub streaming: bool,

    /// Supports push notification callbacks
    #[serde(rename = "pushNotifications", default)]
    pub push_notifications: bool,

    /// Exposes state transition history on tasks
    #[serde(rename = "stateTransitionHistory", default)]
    pub state_transition_history: bool,
}

/// A skill advertised on an agent card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkill {
    /// Skill identifier
    pub id: String,

    /// Skill name
    pub name: String,

    /// Skill description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Accepted input modes
    #[serde(rename = "inputModes", skip_serializing_if = "Option::is_none")]
    pub input_modes: Option<Vec<String>>,

    /// Produced output modes
    #[serde(rename = "outputModes", skip_serializing_if = "Option::is_none")]
    pub output_modes: Option<Vec<String>>,

    /// Example prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,

    /// Categorization tags
    #[serde(default)]
    pub tags: Vec<String>,
}
