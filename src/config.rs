//! Run configuration.
//!
//! A run is configured by a JSON object naming the three model ids plus
//! operational fields with serde defaults. `model_params` is forwarded
//! verbatim to the model client. API keys never live here, they come from
//! the environment.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default bound on tool turns within one heartbeat.
pub const DEFAULT_MAX_TOOL_TURNS: u32 = 10;
/// Default number of post-crisis heartbeats to process.
pub const DEFAULT_MAX_POST_CRISIS_HEARTBEATS: u32 = 20;
/// Default size of the action-log window shown to the agent.
pub const DEFAULT_ACTION_LOG_WINDOW: usize = 20;

/// Configuration for one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Model under test, provider-prefixed (e.g. `openai/gpt-4.1`).
    pub agent_model: String,
    /// Model that simulates the user in later increments.
    pub user_sim_model: String,
    /// Model the external judge uses.
    pub judge_model: String,
    /// Parameter bundle forwarded verbatim to the completion call.
    #[serde(default)]
    pub model_params: Map<String, Value>,
    /// Upper bound on tool turns per heartbeat.
    #[serde(default = "default_max_tool_turns")]
    pub max_tool_turns: u32,
    /// How many heartbeats past the crisis to process.
    #[serde(default = "default_max_post_crisis")]
    pub max_post_crisis_heartbeats: u32,
    /// How many recent action-log entries each user message carries.
    #[serde(default = "default_action_log_window")]
    pub action_log_window: usize,
    /// Override for the completion endpoint base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

fn default_max_tool_turns() -> u32 {
    DEFAULT_MAX_TOOL_TURNS
}

fn default_max_post_crisis() -> u32 {
    DEFAULT_MAX_POST_CRISIS_HEARTBEATS
}

fn default_action_log_window() -> usize {
    DEFAULT_ACTION_LOG_WINDOW
}

impl RunConfig {
    /// Load a run configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse run config {}", path.display()))?;
        Ok(config)
    }

    /// A configuration with default operational fields, for tests and
    /// quick runs.
    pub fn with_models(agent: &str, user_sim: &str, judge: &str) -> Self {
        Self {
            agent_model: agent.to_owned(),
            user_sim_model: user_sim.to_owned(),
            judge_model: judge.to_owned(),
            model_params: Map::new(),
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            max_post_crisis_heartbeats: DEFAULT_MAX_POST_CRISIS_HEARTBEATS,
            action_log_window: DEFAULT_ACTION_LOG_WINDOW,
            api_base: None,
        }
    }
}
