//! Tool-name sanitization for providers that reject dots.
//!
//! Dotted noise-tool names (`server.action`) are rewritten with a reserved
//! two-character escape before they reach the model and restored on
//! receipt. The catalogue guarantees no flat name contains the escape, so
//! restoration is unambiguous. When the orchestrator echoes the model's own
//! tool-call message back into the conversation it must re-sanitize, the
//! model only ever saw sanitized names and expects them on later turns.

/// Replace dots with the reserved escape sequence.
pub fn sanitize_tool_name(name: &str) -> String {
    name.replace('.', "__")
}

/// Restore dots from the reserved escape sequence.
pub fn restore_tool_name(name: &str) -> String {
    name.replace("__", ".")
}
