//! Tool-call execution
//!
//! Maps tool calls from the model onto A2A protocol operations. Failures of
//! individual calls never abort the turn: each one turns into a tool-role
//! error message so the model can see what went wrong and adjust.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::chat::{ChatMessage, ToolCall};
use crate::error::{A2aError, A2aResult, Result};
use crate::protocol::message::{MessageSendConfiguration, MessageSendParams, SendMessageResult};
use crate::protocol::task::{Task, TaskQueryParams, TaskState};
use crate::protocol::events::TaskEvent;

use super::orchestrator::AgentOrchestrator;
use super::result::extract_task_result;
use super::tools::{render_card_summary, AgentTool, QueryAgentCardArgs, SubmitTaskArgs};

impl AgentOrchestrator {
    /// Execute one turn's worth of tool calls
    ///
    /// `streaming` says whether the surrounding chat request is a streaming
    /// one; task submissions only stream when it is. Returns the tool-role
    /// result messages in call order, plus whether every call was a task
    /// submission (the early-termination condition).
    pub(super) async fn execute_turn(
        &self,
        tool_calls: &[ToolCall],
        streaming: bool,
    ) -> (Vec<ChatMessage>, bool) {
        let mut results = Vec::with_capacity(tool_calls.len());
        let mut all_submissions = !tool_calls.is_empty();

        for call in tool_calls {
            let tool = AgentTool::from_name(&call.function.name);
            if !matches!(tool, AgentTool::SubmitTask) {
                all_submissions = false;
            }

            let outcome = match tool {
                AgentTool::QueryAgentCard => self.query_agent_card(&call.function.arguments).await,
                AgentTool::SubmitTask => {
                    self.submit_task(&call.function.arguments, streaming).await
                }
                AgentTool::Unknown(name) => {
                    warn!(tool = %name, "Model requested an unknown tool");
                    Ok(format!("Unknown tool: {name}"))
                }
            };

            let content = match outcome {
                Ok(content) => content,
                Err(e) => {
                    warn!(tool = %call.function.name, error = %e, "Tool call failed");
                    format!("Error: {e}")
                }
            };

            let mut message = ChatMessage::tool(content, call.id.clone());
            message.name = Some(call.function.name.clone());
            results.push(message);
        }

        (results, all_submissions)
    }

    /// `query_a2a_agent_card`: fetch and summarize an agent's card
    async fn query_agent_card(&self, arguments: &str) -> Result<String> {
        let args: QueryAgentCardArgs = serde_json::from_str(arguments)?;
        debug!(url = %args.agent_url, "Querying agent card");
        let card = self.client.get_agent_card(&args.agent_url).await?;
        Ok(render_card_summary(&card))
    }

    /// `submit_task_to_agent`: send a task and wait for its result
    ///
    /// Streams when the agent advertises the capability and the chat request
    /// itself streams, otherwise sends a blocking request. A failure to open
    /// the stream falls back to the blocking path rather than surfacing an
    /// error.
    async fn submit_task(&self, arguments: &str, request_streaming: bool) -> Result<String> {
        let args: SubmitTaskArgs = serde_json::from_str(arguments)?;
        let mut text = args.task_description;
        if let Some(context) = args.additional_context {
            text.push_str("\n\nAdditional context: ");
            text.push_str(&context);
        }

        let agent_streams = self
            .client
            .agent_capabilities(&args.agent_url)
            .await
            .map(|caps| caps.streaming)
            .unwrap_or(false);

        if request_streaming && agent_streams {
            info!(url = %args.agent_url, "Submitting task via streaming");
            match self
                .client
                .send_streaming_message(MessageSendParams::user_text(&text), &args.agent_url)
                .await
            {
                Ok(rx) => return Ok(self.collect_streamed_result(rx, &args.agent_url).await?),
                Err(e) => {
                    warn!(url = %args.agent_url, error = %e, "Stream open failed, falling back to blocking send");
                }
            }
        }

        info!(url = %args.agent_url, "Submitting task via blocking send");
        Ok(self.submit_blocking(&args.agent_url, &text).await?)
    }

    /// Drain a task event stream into the task's final result text
    ///
    /// Artifact text accumulates as it arrives and is the result when any
    /// was streamed; the final status update only ends consumption. Its
    /// message text is the fallback for streams that carried no artifacts.
    async fn collect_streamed_result(
        &self,
        mut rx: mpsc::Receiver<Bytes>,
        url: &str,
    ) -> A2aResult<String> {
        let mut artifact_text = String::new();

        while let Some(payload) = rx.recv().await {
            let event: TaskEvent = serde_json::from_slice(&payload)?;
            match event {
                TaskEvent::ArtifactUpdate(update) => {
                    if let Some(text) = update.artifact.parts.iter().find_map(|p| match p {
                        crate::protocol::message::Part::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    }) {
                        artifact_text.push_str(text);
                    }
                }
                TaskEvent::StatusUpdate(update) => {
                    debug!(
                        url,
                        task_id = %update.task_id,
                        state = %update.status.state,
                        is_final = update.is_final,
                        "Task status update"
                    );
                    if !update.is_final {
                        continue;
                    }

                    let detail = update
                        .status
                        .message
                        .as_ref()
                        .and_then(|m| m.first_text())
                        .map(String::from);

                    match update.status.state {
                        TaskState::Completed => {
                            if !artifact_text.is_empty() {
                                return Ok(artifact_text);
                            }
                            return Ok(detail
                                .unwrap_or_else(|| "Task completed successfully".to_string()));
                        }
                        state if state.is_terminal() => {
                            return Err(A2aError::TaskTerminated {
                                task_id: update.task_id,
                                state,
                                detail,
                            });
                        }
                        _ => continue,
                    }
                }
            }
        }

        // Stream closed without a final status update.
        if artifact_text.is_empty() {
            Err(A2aError::Protocol(format!(
                "event stream from '{url}' ended without a final status"
            )))
        } else {
            Ok(artifact_text)
        }
    }

    /// Blocking `message/send` followed by polling when the task has not
    /// settled yet
    async fn submit_blocking(&self, url: &str, text: &str) -> A2aResult<String> {
        let params = MessageSendParams {
            configuration: Some(MessageSendConfiguration {
                blocking: Some(true),
                ..Default::default()
            }),
            ..MessageSendParams::user_text(text)
        };

        match self.client.send_message(params, url).await? {
            SendMessageResult::Message(message) => Ok(message
                .first_text()
                .map(String::from)
                .unwrap_or_else(|| "Task completed successfully".to_string())),
            SendMessageResult::Task(task) => self.resolve_task(task, url).await,
        }
    }

    /// Turn a returned task into result text, polling if it is still running
    async fn resolve_task(&self, task: Task, url: &str) -> A2aResult<String> {
        match task.status.state {
            TaskState::Completed => extract_task_result(&task),
            state if state.is_terminal() => Err(A2aError::TaskTerminated {
                detail: task
                    .status
                    .message
                    .as_ref()
                    .and_then(|m| m.first_text())
                    .map(String::from),
                task_id: task.id,
                state,
            }),
            _ => self.poll_task(url, &task.id).await,
        }
    }

    /// Poll `tasks/get` until the task settles or attempts run out
    ///
    /// Transient fetch errors consume an attempt, so a permanently broken
    /// agent cannot pin the loop forever.
    async fn poll_task(&self, url: &str, task_id: &str) -> A2aResult<String> {
        let config = &self.client.config().polling;
        let mut ticker = interval(config.task_interval);
        ticker.tick().await; // the first tick completes immediately

        for attempt in 1..=config.max_poll_attempts {
            ticker.tick().await;

            let params = TaskQueryParams {
                id: task_id.to_string(),
                history_length: None,
            };
            let task = match self.client.get_task(params, url).await {
                Ok(task) => task,
                Err(e) => {
                    debug!(url, task_id, attempt, error = %e, "Task poll failed");
                    continue;
                }
            };

            debug!(url, task_id, attempt, state = %task.status.state, "Polled task");
            match task.status.state {
                TaskState::Completed => return extract_task_result(&task),
                state if state.is_terminal() => {
                    return Err(A2aError::TaskTerminated {
                        detail: task
                            .status
                            .message
                            .as_ref()
                            .and_then(|m| m.first_text())
                            .map(String::from),
                        task_id: task.id,
                        state,
                    });
                }
                _ => {}
            }
        }

        Err(A2aError::PollTimeout {
            task_id: task_id.to_string(),
            attempts: config.max_poll_attempts,
        })
    }
}
