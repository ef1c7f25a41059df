//! Task result extraction

use crate::error::{A2aError, A2aResult};
use crate::protocol::{Part, Task};

/// Extract the human-readable result text from a completed task
///
/// The status message carries the agent's final answer. The first non-empty
/// text part wins; a completed task whose message holds no text at all (a
/// file or data payload only) falls back to a generic confirmation.
pub fn extract_task_result(task: &Task) -> A2aResult<String> {
    let message = task
        .status
        .message
        .as_ref()
        .ok_or_else(|| A2aError::Protocol(format!("task '{}' has no status message", task.id)))?;

    if message.parts.is_empty() {
        return Err(A2aError::Protocol(format!(
            "task '{}' status message has no parts",
            task.id
        )));
    }

    for part in &message.parts {
        if let Part::Text { text, .. } = part {
            if !text.is_empty() {
                return Ok(text.clone());
            }
        }
    }

    Ok("Task completed successfully".to_string())
}
