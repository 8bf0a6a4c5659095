//! File-backed memory handler.
//!
//! Memory keys map to `{key}.md` files in the per-run working directory.
//! I/O is synchronous behind the async façade and flushes on write, which
//! is what guarantees write-then-read consistency inside a single
//! heartbeat. Keys are validated and resolved paths must stay inside the
//! working directory; anything that escapes is rejected without touching
//! the filesystem.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::runtime::router::ToolHandler;
use crate::runtime::transcript::ToolResponse;

const HANDLED: [&str; 3] = ["read_memory", "write_memory", "list_memories"];

/// Handler for the agent's memory tools.
#[derive(Debug)]
pub struct MemoryHandler {
    root: PathBuf,
}

impl MemoryHandler {
    /// Build a handler over the per-run working directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Validate a key and resolve it to a path inside the working
    /// directory. Path separators, parent references, and anything outside
    /// `[a-z0-9_-]` are rejected before the filesystem is consulted.
    fn resolve(&self, key: &str) -> Result<PathBuf, ToolResponse> {
        let valid = !key.is_empty()
            && key.len() <= 64
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid {
            warn!(key, "rejected memory key");
            return Err(ToolResponse::error(format!("invalid memory key: {key:?}")));
        }

        let path = self.root.join(format!("{key}.md"));
        if path.parent() != Some(self.root.as_path()) {
            warn!(key, "memory path escaped the working directory");
            return Err(ToolResponse::error(format!("invalid memory key: {key:?}")));
        }
        Ok(path)
    }

    fn read(&self, args: &Map<String, Value>) -> ToolResponse {
        let Some(key) = args.get("key").and_then(Value::as_str) else {
            return ToolResponse::error("missing required argument: key");
        };
        let path = match self.resolve(key) {
            Ok(p) => p,
            Err(resp) => return resp,
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => ToolResponse::ok_with(json!({ "content": content })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ToolResponse::error(format!("no memory named {key:?}"))
            }
            Err(e) => ToolResponse::error(format!("memory read failed: {e}")),
        }
    }

    fn write(&self, args: &Map<String, Value>) -> ToolResponse {
        let Some(key) = args.get("key").and_then(Value::as_str) else {
            return ToolResponse::error("missing required argument: key");
        };
        let Some(content) = args.get("content").and_then(Value::as_str) else {
            return ToolResponse::error("missing required argument: content");
        };
        let path = match self.resolve(key) {
            Ok(p) => p,
            Err(resp) => return resp,
        };
        match write_flushed(&path, content) {
            Ok(()) => ToolResponse::ok(),
            Err(e) => ToolResponse::error(format!("memory write failed: {e}")),
        }
    }

    fn list(&self) -> ToolResponse {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => return ToolResponse::error(format!("memory list failed: {e}")),
        };

        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
            .collect();
        keys.sort();

        ToolResponse::ok_with(json!({ "keys": keys }))
    }
}

/// Write and flush to disk before returning. Buffered or deferred I/O here
/// would break write-then-read consistency within a heartbeat.
fn write_flushed(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

#[async_trait]
impl ToolHandler for MemoryHandler {
    fn name(&self) -> &'static str {
        "MemoryHandler"
    }

    fn can_handle(&self, tool_name: &str) -> bool {
        HANDLED.contains(&tool_name)
    }

    async fn handle(&self, tool_name: &str, args: &Map<String, Value>) -> ToolResponse {
        match tool_name {
            "read_memory" => self.read(args),
            "write_memory" => self.write(args),
            "list_memories" => self.list(),
            other => ToolResponse::error(format!("unsupported memory operation: {other}")),
        }
    }
}
