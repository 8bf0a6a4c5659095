//! Tool handlers present in this version.
//!
//! `ScenarioDataHandler` serves every read-only scenario query;
//! `MemoryHandler` backs the agent's only cross-heartbeat continuity. A
//! user-simulator handler for `send_message`/`make_call` and an MCP handler
//! for dotted names are reserved for later increments.

pub mod memory;
pub mod scenario_data;

pub use memory::MemoryHandler;
pub use scenario_data::{ScenarioCursor, ScenarioDataHandler};
