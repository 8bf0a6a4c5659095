//! CrisisBench: a benchmark harness measuring whether a general-purpose LLM
//! agent, embedded in a realistic mixed-data stream, notices a
//! life-threatening physical event buried in noise and acts on its own.
//!
//! Three subsystems:
//! - [`scenario`], the immutable data contract binding generation,
//!   execution, and scoring, with a content-hashed package format.
//! - [`generator`], a seeded, reproducible pipeline that synthesizes a
//!   full simulated day with a precisely timed crisis injection.
//! - [`runtime`], the async heartbeat orchestrator: fresh-context prompt
//!   assembly, a bounded multi-turn tool loop, pluggable handlers, a
//!   rolling action log, and file-backed memory.

#![allow(missing_docs)] // TODO: enforce once the scoring surface settles

pub mod config;
pub mod generator;
pub mod logging;
pub mod providers;
pub mod runtime;
pub mod scenario;
pub mod scoring;
