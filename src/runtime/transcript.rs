//! Runtime domain records: tool responses, parsed calls, turns, and the
//! run transcript an external scorer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RunConfig;

// ---------------------------------------------------------------------------
// Tool responses
// ---------------------------------------------------------------------------

/// Outcome status of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// The handler produced a payload.
    Ok,
    /// The handler rejected the call; a `message` field explains why.
    Error,
}

/// What a tool handler returns. Serializes as `{"status": ..}` with the
/// payload fields flattened alongside, so an error reads
/// `{"status":"error","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Outcome status.
    pub status: ToolStatus,
    /// Payload fields, flattened into the serialized object.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ToolResponse {
    /// A bare success with no payload.
    pub fn ok() -> Self {
        Self {
            status: ToolStatus::Ok,
            payload: Map::new(),
        }
    }

    /// A success carrying payload fields. Non-object values are wrapped
    /// under a `result` key.
    pub fn ok_with(value: Value) -> Self {
        let payload = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".to_owned(), other);
                map
            }
        };
        Self {
            status: ToolStatus::Ok,
            payload,
        }
    }

    /// An error with a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("message".to_owned(), Value::String(message.into()));
        Self {
            status: ToolStatus::Error,
            payload,
        }
    }

    /// Whether this is an error response.
    pub fn is_error(&self) -> bool {
        self.status == ToolStatus::Error
    }
}

// ---------------------------------------------------------------------------
// Agent output
// ---------------------------------------------------------------------------

/// One tool call parsed out of a model response, with its arguments string
/// already decoded into a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedToolCall {
    /// Provider-assigned call id.
    pub call_id: String,
    /// Tool name, restored from its sanitized wire form.
    pub name: String,
    /// Decoded arguments.
    pub arguments: Map<String, Value>,
}

/// A model response reduced to what the orchestrator acts on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentResponse {
    /// Assistant text, if any.
    pub text: Option<String>,
    /// Tool calls in emission order.
    pub tool_calls: Vec<ParsedToolCall>,
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// Action classification for the rolling log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Read-only data query.
    Query,
    /// Memory operation.
    Memory,
    /// Outbound human contact that a handler actually serviced.
    Communication,
    /// Anything else, including unrouted calls.
    ToolCall,
}

/// One entry in the rolling action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    /// Heartbeat timestamp at which the action ran.
    pub time: DateTime<Utc>,
    /// Classification.
    pub action_type: ActionType,
    /// Tool name as the agent called it.
    pub tool_name: String,
    /// Brief human-readable summary.
    pub summary: String,
}

/// A tool call as recorded in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedToolCall {
    /// Provider-assigned call id.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Decoded arguments.
    pub arguments: Map<String, Value>,
    /// Type name of the handler that serviced the call; `None` when no
    /// handler matched.
    pub routed_to: Option<String>,
    /// The response returned to the model.
    pub response: ToolResponse,
}

/// One model round within a heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Assistant text, if any.
    pub agent_text: Option<String>,
    /// Tool calls executed this turn.
    pub tool_calls: Vec<RecordedToolCall>,
}

/// Memory operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryOpKind {
    /// `read_memory`.
    Read,
    /// `write_memory`.
    Write,
    /// `list_memories`.
    List,
}

/// A memory operation observed during a heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryOp {
    /// Operation kind.
    pub op: MemoryOpKind,
    /// Memory key, when the operation names one.
    pub key: Option<String>,
    /// Written content, for writes.
    pub content: Option<String>,
}

/// Interaction kind with the simulated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserSimKind {
    /// Text message.
    Message,
    /// Phone call.
    Call,
}

/// One exchange with the simulated user. Reserved: the user-sim handler is
/// not part of this version, so runs record an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSimInteraction {
    /// Interaction kind.
    #[serde(rename = "type")]
    pub kind: UserSimKind,
    /// What the agent sent.
    pub agent_sent: String,
    /// The simulated user's reply; `None` means silence.
    pub user_response: Option<String>,
}

/// Metadata about the context sent for a heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMeta {
    /// System prompt length in characters.
    pub system_chars: usize,
    /// User message length in characters.
    pub user_chars: usize,
    /// Module keys present in the payload shown to the agent.
    pub module_keys: Vec<String>,
}

/// Everything that happened during one heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatTranscript {
    /// Heartbeat id.
    pub heartbeat_id: u32,
    /// Heartbeat timestamp.
    pub timestamp: DateTime<Utc>,
    /// Content hash of the scenario this run executed, for traceability.
    pub scenario_hash: String,
    /// Context metadata.
    pub context: ContextMeta,
    /// Model rounds in order.
    pub turns: Vec<Turn>,
    /// Memory operations in order.
    pub memory_ops: Vec<MemoryOp>,
    /// User-simulator exchanges (empty in this version).
    pub user_sim_interactions: Vec<UserSimInteraction>,
}

/// The whole run, serialized as JSON at completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunTranscript {
    /// Scenario the run executed.
    pub scenario_id: String,
    /// Unique run id.
    pub run_id: String,
    /// Configuration the run used.
    pub run_config: RunConfig,
    /// Per-heartbeat transcripts, append-only during the run.
    pub heartbeats: Vec<HeartbeatTranscript>,
}
