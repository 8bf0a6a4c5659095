//! Deterministic scenario generator.
//!
//! Given `(crisis_type, noise_tier, seed, scenario_date)` the generator
//! synthesizes a full simulated day, roughly 160 heartbeats at a 5-minute
//! cadence, with a precisely timed crisis injection, and packages it to
//! disk. Identical inputs produce byte-identical output files.
//!
//! Determinism rests on two rules. First, a single seeded [`StdRng`] is
//! threaded by `&mut` through the whole pipeline: per-scenario setup draws
//! happen in a fixed order (the generator constructors below), then every
//! heartbeat runs every module generator in a fixed order. Second, each
//! generator consumes a fixed number of samples per heartbeat regardless of
//! code path, branches that skip a value draw and discard it, so the
//! downstream stream never shifts. Tier filtering drops module results at
//! packaging time, never at generation time.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::scenario::hash::content_hash;
use crate::scenario::package::write_package;
use crate::scenario::types::{
    ContentHash, CrisisType, HeartbeatPayload, NoiseTier, ScenarioManifest, ScenarioPackage,
};
use crate::scenario::ScenarioError;

pub mod calendar;
pub mod catalog;
pub mod communications;
pub mod crisis;
pub mod financial;
pub mod location;
pub mod schedule;
pub mod seed_memory;
pub mod tiers;
pub mod util;
pub mod wearable;
pub mod weather;

use schedule::PersonSchedule;

/// Version stamped into every manifest.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package schema version.
pub const PACKAGE_VERSION: &str = "1";

/// Errors raised during scenario generation.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The scenario date is invalid or below the future-year threshold.
    #[error("invalid scenario date: {0}")]
    InvalidDate(String),

    /// The crisis enforcement pass found an inconsistent heartbeat,
    /// indicating an upstream pipeline bug.
    #[error("crisis enforcement failed: {0}")]
    Enforcement(String),

    /// The tool catalogue violated a construction rule.
    #[error("tool catalogue invalid: {0}")]
    Catalogue(String),

    /// A contract-level failure while packaging.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

/// Inputs to one generation run.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorParams {
    /// The scripted emergency.
    pub crisis_type: CrisisType,
    /// Noise tier to package at.
    pub noise_tier: NoiseTier,
    /// Seed for the shared random source.
    pub seed: u64,
    /// Simulated calendar day; year must be ≥ 2027.
    pub scenario_date: NaiveDate,
}

/// Generate a complete, validated scenario package in memory.
///
/// # Errors
///
/// Returns [`GeneratorError`] on an invalid date, an enforcement
/// inconsistency, or a contract violation.
pub fn generate_package(params: &GeneratorParams) -> Result<ScenarioPackage, GeneratorError> {
    let sched = PersonSchedule::cardiac_arrest_day(params.scenario_date)?;
    let mut rng = StdRng::seed_from_u64(params.seed);

    let person = seed_memory::person_profile();
    let contacts = seed_memory::contacts();
    let agent_identity = seed_memory::agent_identity();

    // Setup draws, fixed order. The per-heartbeat loop below runs the
    // generators in this same order.
    let mut wearable = wearable::WearableGenerator::new(&sched, &mut rng);
    let mut location = location::LocationGenerator::new(&sched, &mut rng);
    let mut weather = weather::WeatherGenerator::new(&mut rng);
    let calendar = calendar::CalendarGenerator::new(&sched)?;
    let communications = communications::CommunicationsGenerator::new(&sched, &mut rng)?;
    let mut financial = financial::FinancialGenerator::new(&sched, &mut rng)?;

    let timestamps = sched.heartbeat_timestamps();
    let mut heartbeats = Vec::with_capacity(timestamps.len());
    for (idx, ts) in timestamps.iter().enumerate() {
        let heartbeat_id = u32::try_from(idx).unwrap_or(u32::MAX);
        heartbeats.push(HeartbeatPayload {
            heartbeat_id,
            timestamp: *ts,
            wearable: Some(wearable.generate(&sched, *ts, &mut rng)),
            location: Some(location.generate(&sched, *ts, &mut rng)),
            weather: Some(weather.generate(*ts, &mut rng)),
            calendar: Some(calendar.generate(*ts)),
            communications: Some(communications.generate(*ts)),
            financial: Some(financial.generate(*ts, &mut rng)),
        });
    }

    let crisis_heartbeat_id = sched.crisis_heartbeat_id();
    crisis::enforce(&mut heartbeats, crisis_heartbeat_id)?;

    for hb in &mut heartbeats {
        tiers::apply_tier(hb, params.noise_tier);
    }

    let tool_definitions = catalog::catalogue_for_tier(params.noise_tier);
    catalog::validate_catalogue(&tool_definitions)?;

    let memory_files = seed_memory::memory_files(&person, &contacts);
    let persona_document = seed_memory::persona_document(&person, &agent_identity, &contacts);

    let digest = content_hash(&heartbeats)?;
    let manifest = ScenarioManifest {
        content_hash: ContentHash::try_from(digest)?,
        generator_version: GENERATOR_VERSION.to_owned(),
        generated_at: Utc.from_utc_datetime(&params.scenario_date.and_time(NaiveTime::MIN)),
    };

    let package = ScenarioPackage {
        scenario_id: scenario_id(params),
        version: PACKAGE_VERSION.to_owned(),
        seed: params.seed,
        crisis_type: params.crisis_type,
        noise_tier: params.noise_tier,
        crisis_heartbeat_id,
        person,
        contacts,
        agent_identity,
        heartbeats,
        tool_definitions,
        memory_files,
        persona_document,
        manifest,
    };
    package.validate()?;

    info!(
        scenario_id = %package.scenario_id,
        crisis_heartbeat_id,
        heartbeats = package.heartbeats.len(),
        "scenario generated"
    );
    Ok(package)
}

/// Generate a package and write it under `parent`, returning the package
/// directory path.
///
/// # Errors
///
/// Returns [`GeneratorError`] on generation or filesystem failure.
pub fn generate_to_dir(params: &GeneratorParams, parent: &Path) -> Result<PathBuf, GeneratorError> {
    let package = generate_package(params)?;
    let dir = write_package(&package, parent).map_err(GeneratorError::Scenario)?;
    Ok(dir)
}

/// Stable scenario identifier, also the package directory name.
pub fn scenario_id(params: &GeneratorParams) -> String {
    format!(
        "{}_{}_s{}",
        params.crisis_type, params.noise_tier, params.seed
    )
}
