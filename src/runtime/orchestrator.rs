//! The heartbeat orchestrator.
//!
//! Drives a loaded scenario against an LLM agent, one heartbeat at a time.
//! Every heartbeat starts a fresh `[system, user]` conversation, no prior
//! heartbeat's messages ever leak in, which keeps per-heartbeat token cost
//! roughly constant and makes the memory store the agent's only
//! continuity. Within a heartbeat the orchestrator runs a bounded
//! multi-turn tool loop, routing calls through the handler chain and
//! recording everything into the transcript.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::config::RunConfig;
use crate::providers::{ChatMessage, ModelClient, WireFunctionCall, WireTool, WireToolCall, WireToolFunction};
use crate::scenario::package::load_package;
use crate::scenario::types::{HeartbeatPayload, ScenarioPackage, ToolDefinition};

use super::action_log::{classify_action, summarize_action, ActionLog};
use super::handlers::{MemoryHandler, ScenarioCursor, ScenarioDataHandler};
use super::prompt;
use super::router::ToolRouter;
use super::sanitize::{restore_tool_name, sanitize_tool_name};
use super::transcript::{
    AgentResponse, ContextMeta, HeartbeatTranscript, MemoryOp, MemoryOpKind, ParsedToolCall,
    RecordedToolCall, RunTranscript, ToolResponse, Turn,
};
use super::RuntimeError;

/// Load a scenario package and run it to completion.
///
/// This is the importable entry point; the CLI is a thin wrapper around
/// it. Loading verifies files, schema, and content hash before any model
/// call is made.
///
/// # Errors
///
/// Returns [`RuntimeError`] on load failure, provider failure, or a
/// malformed tool-arguments string.
pub async fn run_benchmark(
    scenario_dir: &Path,
    config: RunConfig,
    client: Arc<dyn ModelClient>,
) -> Result<RunTranscript, RuntimeError> {
    let package = Arc::new(load_package(scenario_dir)?);
    let orchestrator = Orchestrator::new(package, config, client)?;
    orchestrator.run().await
}

/// One scenario run in flight.
pub struct Orchestrator {
    package: Arc<ScenarioPackage>,
    config: RunConfig,
    client: Arc<dyn ModelClient>,
    router: ToolRouter,
    cursor: Arc<ScenarioCursor>,
    action_log: ActionLog,
    system_prompt: String,
    wire_tools: Vec<WireTool>,
    // Holds the per-run working memory directory; removed on drop.
    memory_dir: TempDir,
}

impl Orchestrator {
    /// Build an orchestrator over a loaded package.
    ///
    /// Creates the temporary working memory directory seeded from the
    /// package's memory files and pre-computes the immutable system prompt.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::WorkingMemory`] if seeding the directory
    /// fails.
    pub fn new(
        package: Arc<ScenarioPackage>,
        config: RunConfig,
        client: Arc<dyn ModelClient>,
    ) -> Result<Self, RuntimeError> {
        let memory_dir = TempDir::new().map_err(|source| RuntimeError::WorkingMemory {
            path: std::env::temp_dir(),
            source,
        })?;
        for file in &package.memory_files {
            let path = memory_dir.path().join(format!("{}.md", file.key));
            std::fs::write(&path, &file.content)
                .map_err(|source| RuntimeError::WorkingMemory { path, source })?;
        }

        let cursor = Arc::new(ScenarioCursor::new());
        let mut router = ToolRouter::new();
        router.register(Arc::new(ScenarioDataHandler::new(
            Arc::clone(&package),
            Arc::clone(&cursor),
        )));
        router.register(Arc::new(MemoryHandler::new(
            memory_dir.path().to_path_buf(),
        )));

        let system_prompt = prompt::build_system_prompt(&package);
        let wire_tools = to_wire_tools(&package.tool_definitions);

        Ok(Self {
            package,
            config,
            client,
            router,
            cursor,
            action_log: ActionLog::new(),
            system_prompt,
            wire_tools,
            memory_dir,
        })
    }

    /// The working memory directory (exposed for tests).
    pub fn memory_path(&self) -> &Path {
        self.memory_dir.path()
    }

    /// Run every heartbeat up to the post-crisis bound and assemble the
    /// transcript. The full post-crisis window always runs; there is no
    /// early termination on agent success.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] on provider failure or malformed tool
    /// arguments.
    pub async fn run(mut self) -> Result<RunTranscript, RuntimeError> {
        let crisis_id = self.package.crisis_heartbeat_id;
        let cutoff = crisis_id.saturating_add(self.config.max_post_crisis_heartbeats);

        info!(
            scenario_id = %self.package.scenario_id,
            crisis_heartbeat_id = crisis_id,
            cutoff,
            "run starting"
        );

        let mut heartbeats = Vec::new();
        for index in 0..self.package.heartbeats.len() {
            let payload = match self.package.heartbeats.get(index) {
                Some(hb) => hb.clone(),
                None => break,
            };
            if payload.heartbeat_id > cutoff {
                break;
            }
            let transcript = self.run_heartbeat(index, payload).await?;
            heartbeats.push(transcript);
        }

        Ok(RunTranscript {
            scenario_id: self.package.scenario_id.clone(),
            run_id: uuid::Uuid::new_v4().to_string(),
            run_config: self.config.clone(),
            heartbeats,
        })
    }

    /// Process one heartbeat: fresh context, bounded tool loop, recording.
    async fn run_heartbeat(
        &mut self,
        index: usize,
        payload: HeartbeatPayload,
    ) -> Result<HeartbeatTranscript, RuntimeError> {
        self.cursor.set(index);

        let user_message = {
            let (entries, total) = self.action_log.window(self.config.action_log_window);
            // Pending user messages stay empty until the user-sim handler
            // lands.
            prompt::build_user_message(&payload, entries, total, &[])
        };

        let context = ContextMeta {
            system_chars: self.system_prompt.len(),
            user_chars: user_message.len(),
            module_keys: prompt::module_keys(&payload),
        };

        debug!(heartbeat_id = payload.heartbeat_id, "heartbeat starting");

        // Fresh context: exactly [system, user]. Reading any previous
        // heartbeat's conversation here would be a bug.
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(user_message),
        ];

        let mut turns: Vec<Turn> = Vec::new();
        let mut memory_ops: Vec<MemoryOp> = Vec::new();
        let mut turn_index: u32 = 0;

        loop {
            let completion = self
                .client
                .complete(
                    &self.config.agent_model,
                    &messages,
                    &self.wire_tools,
                    &self.config.model_params,
                )
                .await?;

            let choice = completion
                .choices
                .into_iter()
                .next()
                .ok_or(RuntimeError::EmptyCompletion)?;
            let wire_calls = choice.message.tool_calls.unwrap_or_default();
            let response = AgentResponse {
                text: choice.message.content,
                tool_calls: parse_tool_calls(&wire_calls)?,
            };
            let agent_text = response.text;
            let parsed = response.tool_calls;

            if parsed.is_empty() {
                turns.push(Turn {
                    agent_text,
                    tool_calls: Vec::new(),
                });
                break;
            }

            // Echo the assistant message back into the conversation with
            // re-sanitized names and the original argument strings, the
            // model only ever saw sanitized names.
            messages.push(ChatMessage::assistant(
                agent_text.clone(),
                parsed
                    .iter()
                    .zip(&wire_calls)
                    .map(|(p, original)| WireToolCall {
                        id: p.call_id.clone(),
                        kind: "function".to_owned(),
                        function: WireFunctionCall {
                            name: sanitize_tool_name(&p.name),
                            arguments: original.function.arguments.clone(),
                        },
                    })
                    .collect(),
            ));

            let mut recorded = Vec::new();
            for call in &parsed {
                let (response, routed_to) = self.router.dispatch(&call.name, &call.arguments).await;

                self.action_log.record(
                    payload.timestamp,
                    classify_action(&call.name, routed_to.is_some()),
                    &call.name,
                    summarize_action(&call.name, &call.arguments),
                );

                if let Some(op) = memory_op_for(call) {
                    memory_ops.push(op);
                }

                messages.push(ChatMessage::tool_result(
                    &call.call_id,
                    serialize_response(&response),
                ));

                recorded.push(RecordedToolCall {
                    call_id: call.call_id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    routed_to: routed_to.map(str::to_owned),
                    response,
                });
            }

            turns.push(Turn {
                agent_text,
                tool_calls: recorded,
            });

            if turn_index >= self.config.max_tool_turns {
                // Budget reached: the final turn's tool calls ran, but no
                // further model call is made. The agent learns of the cap
                // on the next heartbeat through its own action log.
                debug!(
                    heartbeat_id = payload.heartbeat_id,
                    turns = turns.len(),
                    "tool-turn budget reached"
                );
                break;
            }
            turn_index = turn_index.saturating_add(1);
        }

        Ok(HeartbeatTranscript {
            heartbeat_id: payload.heartbeat_id,
            timestamp: payload.timestamp,
            scenario_hash: self.package.manifest.content_hash.to_string(),
            context,
            turns,
            memory_ops,
            user_sim_interactions: Vec::new(),
        })
    }
}

/// Decode wire tool calls: restore names, parse argument strings.
///
/// A JSON parse failure is logged with the raw arguments and propagated -
/// it signals a provider issue or a sanitization mismatch, and swallowing
/// it would hide the bug.
fn parse_tool_calls(wire_calls: &[WireToolCall]) -> Result<Vec<ParsedToolCall>, RuntimeError> {
    let mut parsed = Vec::with_capacity(wire_calls.len());
    for call in wire_calls {
        let name = restore_tool_name(&call.function.name);
        let raw = call.function.arguments.trim();
        let arguments: Map<String, Value> = if raw.is_empty() {
            Map::new()
        } else {
            serde_json::from_str(raw).map_err(|source| {
                error!(
                    tool = %name,
                    raw_arguments = %call.function.arguments,
                    error = %source,
                    "tool arguments are not valid JSON"
                );
                RuntimeError::ToolArguments {
                    tool: name.clone(),
                    source,
                }
            })?
        };
        parsed.push(ParsedToolCall {
            call_id: call.id.clone(),
            name,
            arguments,
        });
    }
    Ok(parsed)
}

/// Record a memory operation when the call targets a memory tool.
fn memory_op_for(call: &ParsedToolCall) -> Option<MemoryOp> {
    let key = call
        .arguments
        .get("key")
        .and_then(Value::as_str)
        .map(str::to_owned);
    match call.name.as_str() {
        "read_memory" => Some(MemoryOp {
            op: MemoryOpKind::Read,
            key,
            content: None,
        }),
        "write_memory" => Some(MemoryOp {
            op: MemoryOpKind::Write,
            key,
            content: call
                .arguments
                .get("content")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }),
        "list_memories" => Some(MemoryOp {
            op: MemoryOpKind::List,
            key: None,
            content: None,
        }),
        _ => None,
    }
}

/// Serialize a tool response for its tool-result message.
fn serialize_response(response: &ToolResponse) -> String {
    serde_json::to_string(response)
        .unwrap_or_else(|_| r#"{"status":"error","message":"serialization failed"}"#.to_owned())
}

/// Convert catalogue definitions into sanitized wire tools with JSON-Schema
/// parameter objects.
pub fn to_wire_tools(definitions: &[ToolDefinition]) -> Vec<WireTool> {
    definitions
        .iter()
        .map(|def| {
            let mut properties = Map::new();
            let mut required = Vec::new();
            for p in &def.parameters {
                properties.insert(
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.param_type,
                        "description": p.description,
                    }),
                );
                if p.required {
                    required.push(Value::String(p.name.clone()));
                }
            }
            WireTool {
                kind: "function".to_owned(),
                function: WireToolFunction {
                    name: sanitize_tool_name(&def.name),
                    description: def.description.clone(),
                    parameters: serde_json::json!({
                        "type": "object",
                        "properties": properties,
                        "required": required,
                    }),
                },
            }
        })
        .collect()
}
