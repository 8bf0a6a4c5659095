//! Tier monotonicity: modules and tools nest strictly upward.

use crisisbench::generator::generate_package;
use crisisbench::scenario::types::{HeartbeatPayload, NoiseTier};

use crate::params;

fn present_modules(hb: &HeartbeatPayload) -> Vec<&'static str> {
    let mut present = Vec::new();
    if hb.wearable.is_some() {
        present.push("wearable");
    }
    if hb.location.is_some() {
        present.push("location");
    }
    if hb.weather.is_some() {
        present.push("weather");
    }
    if hb.calendar.is_some() {
        present.push("calendar");
    }
    if hb.communications.is_some() {
        present.push("communications");
    }
    if hb.financial.is_some() {
        present.push("financial");
    }
    present
}

#[test]
fn test_module_sets_nest_across_tiers() {
    let packages: Vec<_> = NoiseTier::ALL
        .iter()
        .map(|tier| generate_package(&params(*tier, 42)).expect("generate"))
        .collect();

    for pair in packages.windows(2) {
        for (lower, higher) in pair[0].heartbeats.iter().zip(&pair[1].heartbeats) {
            let lower_set = present_modules(lower);
            let higher_set = present_modules(higher);
            assert!(
                lower_set.iter().all(|m| higher_set.contains(m)),
                "modules at heartbeat {} must nest upward",
                lower.heartbeat_id
            );
        }
    }
}

#[test]
fn test_tool_counts_strictly_increase() {
    let counts: Vec<usize> = NoiseTier::ALL
        .iter()
        .map(|tier| {
            generate_package(&params(*tier, 42))
                .expect("generate")
                .tool_definitions
                .len()
        })
        .collect();
    for pair in counts.windows(2) {
        assert!(pair[0] < pair[1], "tool counts must grow: {counts:?}");
    }
}

#[test]
fn test_t1_has_only_wearable_everywhere() {
    let package = generate_package(&params(NoiseTier::T1, 42)).expect("generate");
    for hb in &package.heartbeats {
        assert_eq!(present_modules(hb), vec!["wearable"]);
    }
}

#[test]
fn test_t1_tools_are_core_only() {
    let package = generate_package(&params(NoiseTier::T1, 42)).expect("generate");
    let names: Vec<&str> = package
        .tool_definitions
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    for gated in ["get_forecast", "list_events", "get_balance", "get_transactions"] {
        assert!(!names.contains(&gated), "{gated} must not appear at T1");
    }
    assert!(!names.iter().any(|n| n.contains('.')), "no dotted tools at T1");
    for core in ["make_call", "send_message", "read_memory", "query_wearable"] {
        assert!(names.contains(&core), "{core} missing from T1");
    }
}

#[test]
fn test_t4_has_every_module_and_tool_family() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    for hb in &package.heartbeats {
        assert_eq!(
            present_modules(hb).len(),
            6,
            "all modules present at T4 (heartbeat {})",
            hb.heartbeat_id
        );
    }
    let names: Vec<&str> = package
        .tool_definitions
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    for tool in ["get_forecast", "list_events", "get_balance", "get_transactions"] {
        assert!(names.contains(&tool), "{tool} missing from T4");
    }
    assert!(names.iter().any(|n| n.contains('.')), "dotted noise tools at T4");
}
