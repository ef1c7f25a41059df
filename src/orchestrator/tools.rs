//! Agent tool definitions and dispatch keys
//!
//! The two chat-completion functions the orchestrator understands, as a
//! closed enum so that adding a tool is a compile-time-checked change.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::chat::{FunctionDefinition, Tool};
use crate::protocol::card::AgentCard;

/// Function name for agent-card discovery
pub const QUERY_AGENT_CARD: &str = "query_a2a_agent_card";

/// Function name for task submission
pub const SUBMIT_TASK: &str = "submit_task_to_agent";

/// Known agent tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentTool {
    /// Discover an agent's skills and capabilities
    QueryAgentCard,

    /// Submit a task to an agent
    SubmitTask,

    /// A function name the orchestrator does not recognize
    Unknown(String),
}

impl AgentTool {
    /// Parse a tool-call function name
    pub fn from_name(name: &str) -> Self {
        match name {
            QUERY_AGENT_CARD => AgentTool::QueryAgentCard,
            SUBMIT_TASK => AgentTool::SubmitTask,
            other => AgentTool::Unknown(other.to_string()),
        }
    }
}

/// Arguments of `query_a2a_agent_card`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAgentCardArgs {
    /// Base URL of the agent to query
    pub agent_url: String,
}

/// Arguments of `submit_task_to_agent`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTaskArgs {
    /// Base URL of the agent to submit to
    pub agent_url: String,

    /// What the agent should do
    pub task_description: String,

    /// Extra context appended to the task message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

/// Function schemas exposed to the model
///
/// The outer gateway injects these into chat completion requests; the
/// orchestrator itself only reads the resulting tool calls.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: QUERY_AGENT_CARD.to_string(),
                description: Some(
                    "Query an A2A agent's card to discover its skills, input/output modes and capabilities"
                        .to_string(),
                ),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "agent_url": {
                            "type": "string",
                            "description": "Base URL of the agent to query"
                        }
                    },
                    "required": ["agent_url"]
                }),
            },
        },
        Tool {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: SUBMIT_TASK.to_string(),
                description: Some(
                    "Submit a task to a remote A2A agent and return its result".to_string(),
                ),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "agent_url": {
                            "type": "string",
                            "description": "Base URL of the agent to submit the task to"
                        },
                        "task_description": {
                            "type": "string",
                            "description": "What the agent should do"
                        },
                        "additional_context": {
                            "type": "string",
                            "description": "Optional extra context for the task"
                        }
                    },
                    "required": ["agent_url", "task_description"]
                }),
            },
        },
    ]
}

/// Render a card as the text result of `query_a2a_agent_card`
pub fn render_card_summary(card: &AgentCard) -> String {
    let mut out = format!("Agent: {} (version {})\n", card.name, card.version);
    if let Some(description) = &card.description {
        out.push_str(description);
        out.push('\n');
    }
    out.push_str(&format!(
        "Capabilities: streaming={}, push_notifications={}, state_transition_history={}\n",
        card.capabilities.streaming,
        card.capabilities.push_notifications,
        card.capabilities.state_transition_history
    ));

    if card.skills.is_empty() {
        out.push_str("No skills advertised.\n");
        return out;
    }

    out.push_str("Skills:\n");
    for skill in &card.skills {
        out.push_str(&format!("- {}: {}", skill.id, skill.name));
        if let Some(description) = &skill.description {
            out.push_str(&format!(" ({})", description));
        }
        out.push('\n');

        let input_modes = skill
            .input_modes
            .as_ref()
            .unwrap_or(&card.default_input_modes);
        let output_modes = skill
            .output_modes
            .as_ref()
            .unwrap_or(&card.default_output_modes);
        if !input_modes.is_empty() || !output_modes.is_empty() {
            out.push_str(&format!(
                "  Input modes: {}; Output modes: {}\n",
                input_modes.join(", "),
                output_modes.join(", ")
            ));
        }
        if !skill.tags.is_empty() {
            out.push_str(&format!("  Tags: {}\n", skill.tags.join(", ")));
        }
        if let Some(examples) = &skill.examples {
            if !examples.is_empty() {
                out.push_str(&format!("  Examples: {}\n", examples.join("; ")));
            }
        }
    }
    out
}
