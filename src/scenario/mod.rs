//! Scenario data contract: record types, canonical hashing, package I/O.
//!
//! Everything the generator publishes and the runtime consumes lives here.
//! Records are immutable once constructed, the crate hands out owned values
//! and never exposes mutation APIs, and types carrying invariants validate
//! in their constructors or deserialization shims.

use std::path::PathBuf;

pub mod hash;
pub mod package;
pub mod types;

pub use types::{
    AgentIdentity, AppNotification, CalendarEvent, CalendarSnapshot, ChatMessageRecord,
    CommunicationsDelta, Contact, ContentHash, CrisisType, EmailHeader, FinancialSnapshot,
    GeofenceStatus, HeartbeatPayload, LocationFix, MemoryFile, MissedCall, MovementClass,
    NoiseTier, PendingCharge, PersonProfile, Reminder, ScenarioManifest, ScenarioPackage,
    SmsMessage, TickerQuote, ToolDefinition, ToolParameter, Transaction, Voicemail,
    WearableReading, WeatherReport,
};

/// Errors raised by the scenario contract and package I/O.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A record failed its construction-time invariants.
    #[error("scenario validation failed: {0}")]
    Validation(String),

    /// A required package file is absent.
    #[error("missing package file: {0}")]
    MissingFile(PathBuf),

    /// Filesystem failure while reading or writing a package.
    #[error("package I/O failed for {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A package file did not parse against its schema.
    #[error("package parse failed for {path}: {source}")]
    Parse {
        /// The path involved.
        path: PathBuf,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// Serialization failure while writing or hashing.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The recomputed content hash does not match the manifest.
    #[error("content hash mismatch: manifest {expected}, recomputed {actual}")]
    HashMismatch {
        /// Hash recorded in the manifest.
        expected: String,
        /// Hash recomputed from `heartbeats.json`.
        actual: String,
    },
}
