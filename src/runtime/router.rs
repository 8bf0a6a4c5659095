//! Tool routing: the handler capability pair and the first-match router.
//!
//! A handler advertises which tool names it services via `can_handle` and
//! executes them via `handle`. The router iterates handlers in registration
//! order and dispatches to the first match, so registration order is a
//! deterministic tiebreak, handlers are expected never to overlap on a
//! name. Unknown tools get `ErrorResponse("Unknown tool")`; in this version
//! that includes `send_message`, `make_call`, and every dotted name, whose
//! handlers arrive in a later increment.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::transcript::ToolResponse;

/// The capability pair every tool handler implements.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Type name recorded as `routed_to` in transcripts.
    fn name(&self) -> &'static str;

    /// Whether this handler services `tool_name`.
    fn can_handle(&self, tool_name: &str) -> bool;

    /// Execute the call. Malformed arguments produce an error response
    /// rather than propagating.
    async fn handle(&self, tool_name: &str, args: &Map<String, Value>) -> ToolResponse;
}

/// Ordered first-match dispatcher.
#[derive(Default)]
pub struct ToolRouter {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl std::fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("ToolRouter").field("handlers", &names).finish()
    }
}

impl ToolRouter {
    /// An empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler. Order matters: first match wins.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.push(handler);
    }

    /// Dispatch a call, returning the response and the servicing handler's
    /// name (`None` when no handler matched).
    pub async fn dispatch(
        &self,
        tool_name: &str,
        args: &Map<String, Value>,
    ) -> (ToolResponse, Option<&'static str>) {
        for handler in &self.handlers {
            if handler.can_handle(tool_name) {
                debug!(tool = tool_name, handler = handler.name(), "tool routed");
                return (handler.handle(tool_name, args).await, Some(handler.name()));
            }
        }
        debug!(tool = tool_name, "no handler for tool");
        (ToolResponse::error("Unknown tool"), None)
    }
}
