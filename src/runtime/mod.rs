//! Orchestrator runtime: replays a scenario package against an LLM agent.
//!
//! Single-task cooperative async. Heartbeats are strictly sequential; within
//! a heartbeat, tool turns are strictly sequential. The only suspension
//! points are awaiting an LLM completion and awaiting a tool handler.

use std::path::PathBuf;

pub mod action_log;
pub mod handlers;
pub mod orchestrator;
pub mod prompt;
pub mod router;
pub mod sanitize;
pub mod transcript;

pub use orchestrator::run_benchmark;
pub use router::{ToolHandler, ToolRouter};
pub use transcript::{HeartbeatTranscript, RunTranscript, ToolResponse};

use crate::providers::ProviderError;
use crate::scenario::ScenarioError;

/// Errors raised by the orchestrator runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Scenario load or validation failed; the run never started.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// The LLM provider failed. Not retried here, retry policy is
    /// provider-specific and belongs above the core.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model emitted tool arguments that are not valid JSON. Logged
    /// loudly and propagated; swallowing it would hide provider bugs.
    #[error("tool {tool}: arguments are not valid JSON: {source}")]
    ToolArguments {
        /// Tool the model tried to call.
        tool: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The provider returned a completion with no choices.
    #[error("provider returned an empty completion")]
    EmptyCompletion,

    /// Filesystem failure while preparing the working memory directory.
    #[error("working memory setup failed for {path}: {source}")]
    WorkingMemory {
        /// The path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
