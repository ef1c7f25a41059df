//! Incremental tool-call reconstruction
//!
//! OpenAI-style streams deliver tool calls as fragments spread across chunks,
//! keyed by index. The accumulator concatenates `arguments` text as it
//! arrives and finalizes into an index-ordered tool-call list.

use std::collections::BTreeMap;

use crate::chat::{FunctionCall, ToolCall, ToolCallDelta};

/// Accumulates tool-call fragments across streaming chunks
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<u32, PartialToolCall>,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    tool_type: String,
    name: String,
    arguments: String,
}

impl ToolCallAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk's fragments in
    ///
    /// `id`, `type` and `name` stick once seen and are never overwritten
    /// with empty text; `arguments` fragments concatenate.
    pub fn ingest(&mut self, deltas: &[ToolCallDelta]) {
        for delta in deltas {
            let entry = self.calls.entry(delta.index).or_default();

            if let Some(id) = &delta.id {
                if !id.is_empty() {
                    entry.id = id.clone();
                }
            }
            if let Some(tool_type) = &delta.tool_type {
                if !tool_type.is_empty() {
                    entry.tool_type = tool_type.clone();
                }
            }
            if let Some(function) = &delta.function {
                if let Some(name) = &function.name {
                    if !name.is_empty() {
                        entry.name = name.clone();
                    }
                }
                if let Some(arguments) = &function.arguments {
                    entry.arguments.push_str(arguments);
                }
            }
        }
    }

    /// Finalize into tool calls ordered by fragment index
    pub fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_values()
            .map(|partial| ToolCall {
                id: partial.id,
                tool_type: if partial.tool_type.is_empty() {
                    "function".to_string()
                } else {
                    partial.tool_type
                },
                function: FunctionCall {
                    name: partial.name,
                    arguments: partial.arguments,
                },
            })
            .collect()
    }
}
