//! Rolling action log.
//!
//! An append-only record of the agent's own tool calls, windowed into each
//! subsequent user message so the agent can reason about what it has
//! already done. Entries are totally ordered by execution order within the
//! single-task runtime.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::transcript::{ActionLogEntry, ActionType};

/// Tools classified as read-only data queries.
const QUERY_TOOLS: [&str; 8] = [
    "query_wearable",
    "get_recent_updates",
    "get_contacts",
    "get_conversations",
    "list_events",
    "get_forecast",
    "get_balance",
    "get_transactions",
];

/// Tools classified as memory operations.
const MEMORY_TOOLS: [&str; 3] = ["read_memory", "write_memory", "list_memories"];

/// Tools that contact a human when a handler services them.
const COMMUNICATION_TOOLS: [&str; 2] = ["make_call", "send_message"];

/// The append-only rolling log.
#[derive(Debug, Default)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn record(
        &mut self,
        time: DateTime<Utc>,
        action_type: ActionType,
        tool_name: &str,
        summary: String,
    ) {
        self.entries.push(ActionLogEntry {
            time,
            action_type,
            tool_name: tool_name.to_owned(),
            summary,
        });
    }

    /// The last `window` entries plus the running total.
    pub fn window(&self, window: usize) -> (&[ActionLogEntry], usize) {
        let start = self.entries.len().saturating_sub(window);
        (&self.entries[start..], self.entries.len())
    }
}

/// Fixed classifier from tool name to action type.
///
/// `routed` reflects whether a handler serviced the call: communication
/// tools only count as `communication` once a handler actually exists for
/// them; an unrouted `make_call` logs as a plain `tool_call`.
pub fn classify_action(tool_name: &str, routed: bool) -> ActionType {
    if QUERY_TOOLS.contains(&tool_name) {
        ActionType::Query
    } else if MEMORY_TOOLS.contains(&tool_name) {
        ActionType::Memory
    } else if COMMUNICATION_TOOLS.contains(&tool_name) && routed {
        ActionType::Communication
    } else {
        ActionType::ToolCall
    }
}

/// Brief human-readable summary of a tool call.
///
/// Cosmetic rendering must not crash on malformed model-supplied
/// arguments, so lookups fall back to `?`.
pub fn summarize_action(tool_name: &str, args: &Map<String, Value>) -> String {
    let get = |key: &str| -> String {
        args.get(key)
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_owned()
    };

    match tool_name {
        "make_call" => format!("Called {}", get("number")),
        "send_message" => format!("Messaged {}", get("recipient")),
        "read_memory" => format!("Read memory '{}'", get("key")),
        "write_memory" => format!("Wrote memory '{}'", get("key")),
        "list_memories" => "Listed memory files".to_owned(),
        "query_wearable" => "Queried the wearable device".to_owned(),
        "get_recent_updates" => "Fetched recent updates".to_owned(),
        "get_contacts" => "Fetched contacts".to_owned(),
        "get_conversations" => "Fetched conversations".to_owned(),
        "list_events" => "Listed calendar events".to_owned(),
        "get_forecast" => "Fetched the forecast".to_owned(),
        "get_balance" => "Fetched the account balance".to_owned(),
        "get_transactions" => "Fetched recent transactions".to_owned(),
        other => format!("Called {other}"),
    }
}

/// Render windowed entries for the user message.
pub fn format_window(entries: &[ActionLogEntry], total: usize) -> String {
    if entries.is_empty() {
        return "No actions taken yet.".to_owned();
    }
    let mut out = format!("Recent actions ({total} total):\n");
    for e in entries {
        out.push_str(&format!(
            "- [{}] {}: {}\n",
            e.time.format("%H:%M"),
            e.tool_name,
            e.summary
        ));
    }
    out
}
