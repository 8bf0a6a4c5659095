//! Tool catalogue rules: banned stems, naming, and tier gating.

use crisisbench::generator::catalog::{catalogue_for_tier, BANNED_STEMS, SANITIZE_ESCAPE};
use crisisbench::scenario::types::NoiseTier;

#[test]
fn test_no_banned_stem_anywhere_in_any_tier() {
    for tier in NoiseTier::ALL {
        for tool in catalogue_for_tier(tier) {
            let mut surfaces = vec![tool.name.to_lowercase(), tool.description.to_lowercase()];
            for p in &tool.parameters {
                surfaces.push(p.name.to_lowercase());
                surfaces.push(p.description.to_lowercase());
            }
            for stem in BANNED_STEMS {
                assert!(
                    surfaces.iter().all(|s| !s.contains(stem)),
                    "tool {:?} leaks banned stem {stem:?}",
                    tool.name
                );
            }
        }
    }
}

#[test]
fn test_flat_names_are_snake_case_without_escape() {
    for tool in catalogue_for_tier(NoiseTier::T4) {
        if tool.name.contains('.') {
            continue;
        }
        assert!(
            tool.name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'),
            "flat name {:?} is not snake_case",
            tool.name
        );
        assert!(
            !tool.name.contains(SANITIZE_ESCAPE),
            "flat name {:?} contains the sanitization escape",
            tool.name
        );
    }
}

#[test]
fn test_dotted_names_have_exactly_one_dot() {
    for tool in catalogue_for_tier(NoiseTier::T4) {
        if !tool.name.contains('.') {
            continue;
        }
        assert_eq!(
            tool.name.matches('.').count(),
            1,
            "dotted name {:?} is not server.action",
            tool.name
        );
    }
}

#[test]
fn test_noise_tools_absent_below_t3() {
    for tier in [NoiseTier::T1, NoiseTier::T2] {
        assert!(
            catalogue_for_tier(tier).iter().all(|t| !t.name.contains('.')),
            "dotted tools leaked into {tier}"
        );
    }
}

#[test]
fn test_required_parameters_marked() {
    let catalogue = catalogue_for_tier(NoiseTier::T4);
    let write_memory = catalogue
        .iter()
        .find(|t| t.name == "write_memory")
        .expect("write_memory present");
    assert!(write_memory.parameters.iter().all(|p| p.required));

    let updates = catalogue
        .iter()
        .find(|t| t.name == "get_recent_updates")
        .expect("get_recent_updates present");
    assert!(updates.parameters.iter().any(|p| !p.required));
}
