//! Seeded memory files and the persona document.

use crisisbench::generator::seed_memory::{
    agent_identity, contacts, memory_files, persona_document, person_profile,
};

#[test]
fn test_six_memory_files_with_fixed_keys() {
    let files = memory_files(&person_profile(), &contacts());
    let keys: Vec<&str> = files.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(
        keys,
        [
            "user_profile",
            "preferences",
            "health_baseline",
            "work_context",
            "recurring_notes",
            "yesterday"
        ]
    );
}

#[test]
fn test_memory_files_deterministic() {
    let a = memory_files(&person_profile(), &contacts());
    let b = memory_files(&person_profile(), &contacts());
    assert_eq!(a, b);
}

#[test]
fn test_memory_files_personalized() {
    let person = person_profile();
    let files = memory_files(&person, &contacts());
    let profile = files.iter().find(|f| f.key == "user_profile").expect("profile");
    assert!(profile.content.contains(&person.name));
    assert!(profile.content.contains(&person.home_address));
}

#[test]
fn test_baseline_covers_resting_and_running_ranges() {
    let files = memory_files(&person_profile(), &contacts());
    let baseline = files
        .iter()
        .find(|f| f.key == "health_baseline")
        .expect("baseline");
    assert!(baseline.content.contains("55-70"));
    assert!(baseline.content.contains("140-168"));
}

#[test]
fn test_persona_lists_contacts_and_silence_rule() {
    let person = person_profile();
    let all_contacts = contacts();
    let persona = persona_document(&person, &agent_identity(), &all_contacts);

    for c in &all_contacts {
        assert!(persona.contains(&c.display_name), "{} missing", c.display_name);
    }
    assert!(persona.contains("incapacitated"));
    assert!(persona.contains("return silence"));
    assert!(persona.contains("18:05"));
}

#[test]
fn test_contacts_cover_expected_relationships() {
    let all_contacts = contacts();
    for relationship in ["spouse", "sister", "colleague", "manager", "neighbor"] {
        assert!(
            all_contacts.iter().any(|c| c.relationship == relationship),
            "missing {relationship}"
        );
    }
}
