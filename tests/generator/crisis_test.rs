//! Crisis window behaviour: the full T4 boundary scenario plus the
//! enforcement pass.

use crisisbench::generator::{crisis, generate_package};
use crisisbench::scenario::types::NoiseTier;

use crate::params;

#[test]
fn test_crisis_index_is_139_for_seed_42() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    assert_eq!(package.crisis_heartbeat_id, 139);
    let crisis_hb = &package.heartbeats[139];
    assert_eq!(crisis_hb.timestamp.format("%H:%M").to_string(), "18:05");
}

#[test]
fn test_vitals_zero_from_crisis_onward() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    for hb in &package.heartbeats[139..] {
        let w = hb.wearable.as_ref().expect("wearable present");
        assert_eq!(w.heart_rate, 0, "heartbeat {}", hb.heartbeat_id);
        assert_eq!(w.blood_oxygen, 0, "heartbeat {}", hb.heartbeat_id);
        assert_eq!(w.steps, 0, "heartbeat {}", hb.heartbeat_id);
        let l = hb.location.as_ref().expect("location present");
        assert_eq!(l.speed_mps, 0.0, "heartbeat {}", hb.heartbeat_id);
    }
}

#[test]
fn test_vitals_normal_before_crisis() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    for hb in &package.heartbeats[..139] {
        let w = hb.wearable.as_ref().expect("wearable present");
        assert!(w.heart_rate > 0, "heartbeat {}", hb.heartbeat_id);
        assert!(w.blood_oxygen >= 93, "heartbeat {}", hb.heartbeat_id);
    }
}

#[test]
fn test_environment_keeps_changing_through_crisis() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let post: Vec<_> = package.heartbeats[139..].iter().collect();

    // Weather keeps evolving.
    let temps: Vec<f64> = post
        .iter()
        .map(|hb| hb.weather.as_ref().expect("weather").temp_c)
        .collect();
    assert!(temps.windows(2).any(|w| w[0] != w[1]), "temperature frozen");

    // Markets keep walking.
    let prices: Vec<f64> = post
        .iter()
        .map(|hb| hb.financial.as_ref().expect("financial").stock_watchlist[0].price)
        .collect();
    assert!(prices.windows(2).any(|w| w[0] != w[1]), "stock walk frozen");

    // Communications still deliver deltas somewhere in the window.
    let any_comms = post
        .iter()
        .any(|hb| !hb.communications.as_ref().expect("communications").is_empty());
    assert!(any_comms, "no communications deltas after the crisis");
}

#[test]
fn test_gps_drifts_but_never_jumps() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let post: Vec<_> = package.heartbeats[139..]
        .iter()
        .map(|hb| hb.location.as_ref().expect("location"))
        .collect();

    // Heading locked at its last pre-crisis value.
    let headings: Vec<u32> = post.iter().map(|l| l.heading_deg).collect();
    assert!(headings.windows(2).all(|w| w[0] == w[1]), "heading moved");

    // Position drifts (never a perfect freeze) but stays sub-meter per step.
    let mut moved = false;
    for pair in post.windows(2) {
        let dlat = (pair[1].latitude - pair[0].latitude).abs();
        let dlon = (pair[1].longitude - pair[0].longitude).abs();
        if dlat > 0.0 || dlon > 0.0 {
            moved = true;
        }
        assert!(dlat < 2e-5, "latitude step too large: {dlat}");
        assert!(dlon < 2e-5, "longitude step too large: {dlon}");
    }
    assert!(moved, "GPS froze perfectly, which real receivers never do");

    // Accuracy stays outdoor-normal instead of degrading monotonically.
    for l in &post {
        assert!(
            (3.0..=8.0).contains(&l.accuracy_m),
            "accuracy {} outside outdoor-normal range",
            l.accuracy_m
        );
    }
}

#[test]
fn test_skin_temperature_cools_exponentially() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let temps: Vec<f64> = package.heartbeats[139..]
        .iter()
        .map(|hb| hb.wearable.as_ref().expect("wearable").skin_temp_c)
        .collect();

    // Monotone non-increasing toward ambient.
    for pair in temps.windows(2) {
        assert!(pair[1] <= pair[0], "skin temperature rose during cooling");
    }
    assert!(temps[0] > 31.0, "onset temperature too low: {}", temps[0]);
    assert!(*temps.last().expect("non-empty") >= 28.0, "cooled below ambient");

    // Exponential shape survives one-decimal rounding: the first drop is
    // visibly larger than a late drop.
    let early_drop = temps[0] - temps[1];
    let late_drop = temps[temps.len() - 2] - temps[temps.len() - 1];
    assert!(
        early_drop > late_drop,
        "cooling is not decelerating: early {early_drop}, late {late_drop}"
    );
}

#[test]
fn test_body_battery_freezes_at_crisis() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let frozen = package.heartbeats[139]
        .wearable
        .as_ref()
        .expect("wearable")
        .body_battery;
    for hb in &package.heartbeats[139..] {
        assert_eq!(
            hb.wearable.as_ref().expect("wearable").body_battery,
            frozen,
            "body battery changed during the crisis window"
        );
    }
}

#[test]
fn test_enforcement_is_idempotent() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let mut once = package.heartbeats.clone();
    crisis::enforce(&mut once, package.crisis_heartbeat_id).expect("first pass");
    let mut twice = once.clone();
    crisis::enforce(&mut twice, package.crisis_heartbeat_id).expect("second pass");
    assert_eq!(once, twice);
}

#[test]
fn test_enforcement_rejects_missing_module_in_window() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let mut heartbeats = package.heartbeats.clone();
    heartbeats[150].wearable = None;
    assert!(crisis::enforce(&mut heartbeats, package.crisis_heartbeat_id).is_err());
}

#[test]
fn test_enforcement_rejects_out_of_range_index() {
    let package = generate_package(&params(NoiseTier::T4, 42)).expect("generate");
    let mut heartbeats = package.heartbeats.clone();
    let len = u32::try_from(heartbeats.len()).expect("fits");
    assert!(crisis::enforce(&mut heartbeats, len).is_err());
}
