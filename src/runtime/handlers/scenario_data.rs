//! Read-only scenario data handler.
//!
//! Serves every data query against the loaded package: wearable sample,
//! recent communications, contacts, conversations, calendar, forecast, and
//! financial lookups. The orchestrator advances a shared cursor before
//! dispatching each heartbeat's tool calls, so lookups always see the
//! current heartbeat. Tier-absent modules produce an empty-shape response
//! for forecast/events and a tier-unavailability error for financial data.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::runtime::router::ToolHandler;
use crate::runtime::transcript::ToolResponse;
use crate::scenario::types::{HeartbeatPayload, ScenarioPackage};

/// Default and maximum interval counts for `get_recent_updates`.
const DEFAULT_UPDATE_WINDOW: u64 = 5;
const MAX_UPDATE_WINDOW: u64 = 50;

const HANDLED: [&str; 8] = [
    "query_wearable",
    "get_recent_updates",
    "get_contacts",
    "get_conversations",
    "list_events",
    "get_forecast",
    "get_balance",
    "get_transactions",
];

/// Shared pointer to the heartbeat currently being processed. The
/// orchestrator stores the index before dispatching tool calls.
#[derive(Debug, Default)]
pub struct ScenarioCursor {
    index: AtomicUsize,
}

impl ScenarioCursor {
    /// A cursor positioned at the first heartbeat.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the cursor at heartbeat `index`.
    pub fn set(&self, index: usize) {
        self.index.store(index, Ordering::SeqCst);
    }

    /// The current heartbeat index.
    pub fn get(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

/// Handler for all read-only scenario queries.
pub struct ScenarioDataHandler {
    package: Arc<ScenarioPackage>,
    cursor: Arc<ScenarioCursor>,
}

impl ScenarioDataHandler {
    /// Build a handler over the loaded package and the shared cursor.
    pub fn new(package: Arc<ScenarioPackage>, cursor: Arc<ScenarioCursor>) -> Self {
        Self { package, cursor }
    }

    fn current(&self) -> Option<&HeartbeatPayload> {
        self.package.heartbeats.get(self.cursor.get())
    }

    fn query_wearable(&self) -> ToolResponse {
        match self.current().and_then(|hb| hb.wearable.as_ref()) {
            Some(w) => match serde_json::to_value(w) {
                Ok(v) => ToolResponse::ok_with(json!({ "wearable": v })),
                Err(e) => ToolResponse::error(format!("serialization failed: {e}")),
            },
            None => ToolResponse::ok_with(json!({ "wearable": {} })),
        }
    }

    fn recent_updates(&self, args: &Map<String, Value>) -> ToolResponse {
        let count = args
            .get("count")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_UPDATE_WINDOW)
            .clamp(1, MAX_UPDATE_WINDOW);
        let count = usize::try_from(count).unwrap_or(1);

        let end = self.cursor.get();
        let start = end.saturating_add(1).saturating_sub(count);

        let mut updates = Vec::new();
        for hb in self.package.heartbeats.get(start..=end).unwrap_or(&[]) {
            if let Some(delta) = &hb.communications {
                if !delta.is_empty() {
                    match serde_json::to_value(delta) {
                        Ok(v) => updates.push(json!({
                            "time": hb.timestamp,
                            "updates": v,
                        })),
                        Err(e) => {
                            return ToolResponse::error(format!("serialization failed: {e}"))
                        }
                    }
                }
            }
        }
        ToolResponse::ok_with(json!({ "updates": updates }))
    }

    fn contacts(&self) -> ToolResponse {
        match serde_json::to_value(&self.package.contacts) {
            Ok(v) => ToolResponse::ok_with(json!({ "contacts": v })),
            Err(e) => ToolResponse::error(format!("serialization failed: {e}")),
        }
    }

    fn list_events(&self) -> ToolResponse {
        match self.current().and_then(|hb| hb.calendar.as_ref()) {
            Some(cal) => match serde_json::to_value(cal) {
                Ok(v) => ToolResponse::ok_with(json!({ "events": v })),
                Err(e) => ToolResponse::error(format!("serialization failed: {e}")),
            },
            None => ToolResponse::ok_with(json!({ "events": [] })),
        }
    }

    fn forecast(&self) -> ToolResponse {
        match self.current().and_then(|hb| hb.weather.as_ref()) {
            Some(w) => match serde_json::to_value(w) {
                Ok(v) => ToolResponse::ok_with(json!({ "forecast": v })),
                Err(e) => ToolResponse::error(format!("serialization failed: {e}")),
            },
            None => ToolResponse::ok_with(json!({ "forecast": {} })),
        }
    }

    fn balance(&self) -> ToolResponse {
        match self.current().and_then(|hb| hb.financial.as_ref()) {
            Some(fin) => ToolResponse::ok_with(json!({
                "balance": fin.account_balance,
                "pending_charges": fin.pending_charges,
            })),
            None => ToolResponse::error("financial data is not available on this plan"),
        }
    }

    fn transactions(&self) -> ToolResponse {
        match self.current().and_then(|hb| hb.financial.as_ref()) {
            Some(fin) => match serde_json::to_value(&fin.recent_transactions) {
                Ok(v) => ToolResponse::ok_with(json!({ "transactions": v })),
                Err(e) => ToolResponse::error(format!("serialization failed: {e}")),
            },
            None => ToolResponse::error("financial data is not available on this plan"),
        }
    }
}

#[async_trait]
impl ToolHandler for ScenarioDataHandler {
    fn name(&self) -> &'static str {
        "ScenarioDataHandler"
    }

    fn can_handle(&self, tool_name: &str) -> bool {
        HANDLED.contains(&tool_name)
    }

    async fn handle(&self, tool_name: &str, args: &Map<String, Value>) -> ToolResponse {
        match tool_name {
            "query_wearable" => self.query_wearable(),
            "get_recent_updates" => self.recent_updates(args),
            "get_contacts" => self.contacts(),
            // Conversation tracking is a future increment.
            "get_conversations" => ToolResponse::ok_with(json!({ "conversations": [] })),
            "list_events" => self.list_events(),
            "get_forecast" => self.forecast(),
            "get_balance" => self.balance(),
            "get_transactions" => self.transactions(),
            other => ToolResponse::error(format!("unsupported query: {other}")),
        }
    }
}
