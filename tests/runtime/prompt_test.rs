//! Tests for `src/runtime/prompt.rs`, no-priming and message shape.

use chrono::NaiveDate;

use crisisbench::generator::{generate_package, GeneratorParams};
use crisisbench::runtime::prompt::{build_system_prompt, build_user_message, module_dump, module_keys};
use crisisbench::scenario::types::{CrisisType, NoiseTier};

/// The no-priming banned substrings for agent-visible prompt surfaces.
const PROMPT_BANNED: [&str; 9] = [
    "emergency",
    "crisis",
    "health alert",
    "medical",
    "safety alert",
    "911",
    "urgent care",
    "vital",
    "rescue",
];

fn package(tier: NoiseTier) -> crisisbench::scenario::types::ScenarioPackage {
    generate_package(&GeneratorParams {
        crisis_type: CrisisType::CardiacArrest,
        noise_tier: tier,
        seed: 42,
        scenario_date: NaiveDate::from_ymd_opt(2027, 6, 12).expect("valid date"),
    })
    .expect("generate")
}

#[test]
fn test_system_prompt_contains_no_banned_substring() {
    let prompt = build_system_prompt(&package(NoiseTier::T4)).to_lowercase();
    for banned in PROMPT_BANNED {
        assert!(!prompt.contains(banned), "system prompt leaks {banned:?}");
    }
}

#[test]
fn test_system_prompt_has_required_sections() {
    let prompt = build_system_prompt(&package(NoiseTier::T1));
    for section in ["## SOUL", "## IDENTITY", "## USER", "## MEMORY-PROTOCOL", "## HEARTBEAT-BEHAVIOR", "## SAFETY"] {
        assert!(prompt.contains(section), "missing section {section}");
    }
}

#[test]
fn test_system_prompt_omits_contacts() {
    let pkg = package(NoiseTier::T4);
    let prompt = build_system_prompt(&pkg);
    for contact in &pkg.contacts {
        assert!(
            !prompt.contains(&contact.display_name),
            "contact {} leaked into the system prompt",
            contact.display_name
        );
        assert!(
            !prompt.contains(&contact.phone),
            "phone {} leaked into the system prompt",
            contact.phone
        );
    }
}

#[test]
fn test_module_dump_excludes_nulls_and_metadata() {
    let pkg = package(NoiseTier::T1);
    let dump = module_dump(&pkg.heartbeats[0]);
    let obj = dump.as_object().expect("object");
    assert!(obj.contains_key("wearable"));
    assert!(!obj.contains_key("location"), "null module leaked");
    assert!(!obj.contains_key("heartbeat_id"));
    assert!(!obj.contains_key("timestamp"));
    assert_eq!(module_keys(&pkg.heartbeats[0]), vec!["wearable"]);
}

#[test]
fn test_user_message_carries_time_log_and_data() {
    let pkg = package(NoiseTier::T1);
    let message = build_user_message(&pkg.heartbeats[0], &[], 0, &[]);
    assert!(message.contains("heartbeat 0"));
    assert!(message.contains("No actions taken yet."));
    assert!(message.contains("Current data:"));
    assert!(message.contains("\"wearable\""));
}

#[test]
fn test_user_message_renders_pending_messages_when_present() {
    let pkg = package(NoiseTier::T1);
    let pending = vec!["on my way home".to_owned()];
    let message = build_user_message(&pkg.heartbeats[0], &[], 0, &pending);
    assert!(message.contains("on my way home"));
}
