//! Determinism: identical inputs produce byte-identical packages.

use std::fs;

use chrono::NaiveDate;

use crisisbench::generator::{generate_package, generate_to_dir, GeneratorParams};
use crisisbench::scenario::types::{CrisisType, NoiseTier};

use crate::params;

#[test]
fn test_same_inputs_same_package() {
    let a = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let b = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    assert_eq!(a, b);
}

#[test]
fn test_same_inputs_byte_identical_files() {
    let dir_a = tempfile::tempdir().expect("tempdir");
    let dir_b = tempfile::tempdir().expect("tempdir");
    let path_a = generate_to_dir(&params(NoiseTier::T3, 42), dir_a.path()).expect("generate");
    let path_b = generate_to_dir(&params(NoiseTier::T3, 42), dir_b.path()).expect("generate");

    for file in ["manifest.json", "scenario.json", "heartbeats.json", "tools.json", "persona.md"] {
        let a = fs::read(path_a.join(file)).expect("read a");
        let b = fs::read(path_b.join(file)).expect("read b");
        assert_eq!(a, b, "{file} should be byte-identical across invocations");
    }
    for key in ["user_profile", "preferences", "health_baseline", "work_context", "recurring_notes", "yesterday"] {
        let a = fs::read(path_a.join("memories").join(format!("{key}.md"))).expect("read a");
        let b = fs::read(path_b.join("memories").join(format!("{key}.md"))).expect("read b");
        assert_eq!(a, b, "memories/{key}.md should be byte-identical");
    }
}

#[test]
fn test_different_seed_different_hash() {
    let a = generate_package(&params(NoiseTier::T2, 1)).expect("generate");
    let b = generate_package(&params(NoiseTier::T2, 2)).expect("generate");
    assert_ne!(a.manifest.content_hash, b.manifest.content_hash);
}

#[test]
fn test_tier_changes_hash_but_not_world() {
    // Tier filtering nulls modules in the packaged payloads, so the hash
    // differs, but the underlying wearable stream is identical.
    let t1 = generate_package(&params(NoiseTier::T1, 42)).expect("generate");
    let t4 = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    assert_ne!(t1.manifest.content_hash, t4.manifest.content_hash);
    for (a, b) in t1.heartbeats.iter().zip(&t4.heartbeats) {
        assert_eq!(a.wearable, b.wearable);
        assert_eq!(a.timestamp, b.timestamp);
    }
}

#[test]
fn test_past_date_rejected() {
    let bad = GeneratorParams {
        crisis_type: CrisisType::CardiacArrest,
        noise_tier: NoiseTier::T1,
        seed: 42,
        scenario_date: NaiveDate::from_ymd_opt(2025, 6, 12).expect("valid date"),
    };
    assert!(generate_package(&bad).is_err());
}

#[test]
fn test_boundary_year_accepted() {
    let edge = GeneratorParams {
        crisis_type: CrisisType::CardiacArrest,
        noise_tier: NoiseTier::T1,
        seed: 42,
        scenario_date: NaiveDate::from_ymd_opt(2027, 1, 4).expect("valid date"),
    };
    let package = generate_package(&edge).expect("generate");
    assert_eq!(package.crisis_heartbeat_id, 139);
}
