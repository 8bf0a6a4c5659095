//! Per-module generator behaviour outside the crisis window.

use std::collections::HashMap;

use crisisbench::generator::generate_package;
use crisisbench::scenario::types::{HeartbeatPayload, NoiseTier};

use crate::params;

fn t4_heartbeats() -> Vec<HeartbeatPayload> {
    generate_package(&params(NoiseTier::T4, 42))
        .expect("generate")
        .heartbeats
}

// Heartbeat 136 is the first tick of the running block (17:50).
const FIRST_RUN_HB: usize = 136;

#[test]
fn test_running_warm_up_sample() {
    let heartbeats = t4_heartbeats();
    let warm_up = heartbeats[FIRST_RUN_HB]
        .wearable
        .as_ref()
        .expect("wearable")
        .heart_rate;
    let full_pace = heartbeats[FIRST_RUN_HB + 1]
        .wearable
        .as_ref()
        .expect("wearable")
        .heart_rate;

    // Intermediate between sedentary and the running range.
    assert!(
        warm_up > 90 && warm_up < 142,
        "warm-up rate {warm_up} should sit between sedentary and running"
    );
    assert!(
        full_pace >= 142,
        "second running sample {full_pace} should be in-range"
    );
}

#[test]
fn test_blood_oxygen_stays_in_sensor_range() {
    let heartbeats = t4_heartbeats();
    for hb in &heartbeats[..139] {
        let spo2 = hb.wearable.as_ref().expect("wearable").blood_oxygen;
        assert!((93..=100).contains(&spo2), "blood oxygen {spo2} out of range");
    }
}

#[test]
fn test_glucose_dips_during_running() {
    let heartbeats = t4_heartbeats();
    let before = heartbeats[FIRST_RUN_HB - 1]
        .wearable
        .as_ref()
        .expect("wearable")
        .blood_glucose;
    let end_of_run = heartbeats[138]
        .wearable
        .as_ref()
        .expect("wearable")
        .blood_glucose;
    assert!(
        end_of_run < before,
        "glucose should sag across the run: {before} -> {end_of_run}"
    );
    let total_dip = before - end_of_run;
    assert!(
        (2.0..=9.0).contains(&total_dip),
        "running dip {total_dip} outside the plausible band"
    );
}

#[test]
fn test_humidity_inverse_to_temperature() {
    let heartbeats = t4_heartbeats();
    let morning = heartbeats[6].weather.as_ref().expect("weather");
    let afternoon = heartbeats[102].weather.as_ref().expect("weather");
    // 07:00 vs 15:00: warmer afternoon, drier afternoon.
    assert!(afternoon.temp_c > morning.temp_c);
    assert!(afternoon.humidity_pct < morning.humidity_pct);
}

#[test]
fn test_wind_direction_never_flips() {
    let heartbeats = t4_heartbeats();
    let dirs: Vec<i64> = heartbeats
        .iter()
        .map(|hb| i64::from(hb.weather.as_ref().expect("weather").wind_direction_deg))
        .collect();
    for pair in dirs.windows(2) {
        let diff = (pair[1] - pair[0]).abs();
        let wrapped = diff.min(360 - diff);
        assert!(wrapped <= 15, "wind direction jumped {wrapped} degrees");
    }
}

#[test]
fn test_uv_tracks_sun_arc() {
    let heartbeats = t4_heartbeats();
    let early = heartbeats[0].weather.as_ref().expect("weather").uv_index;
    let midday = heartbeats[66].weather.as_ref().expect("weather").uv_index;
    let evening = heartbeats[155].weather.as_ref().expect("weather").uv_index;
    assert!(midday > early, "midday UV should exceed 06:30 UV");
    assert!(midday > evening, "midday UV should exceed evening UV");
}

#[test]
fn test_calendar_window_slides() {
    let heartbeats = t4_heartbeats();
    let morning = heartbeats[0].calendar.as_ref().expect("calendar");
    assert_eq!(morning.next_events.len(), 3);
    assert_eq!(morning.next_events[0].title, "Team standup");

    // After the standup has begun it drops out of the window.
    let late_morning = heartbeats[49].calendar.as_ref().expect("calendar");
    assert!(late_morning
        .next_events
        .iter()
        .all(|e| e.title != "Team standup"));

    // Passed reminders drop out too.
    let evening = heartbeats[135].calendar.as_ref().expect("calendar");
    assert!(evening.reminders.iter().all(|r| r.text != "Pick up dry cleaning on the way home"));
}

#[test]
fn test_day_summary_generated_once() {
    let heartbeats = t4_heartbeats();
    let first = &heartbeats[0].calendar.as_ref().expect("calendar").day_summary;
    for hb in &heartbeats {
        assert_eq!(&hb.calendar.as_ref().expect("calendar").day_summary, first);
    }
}

#[test]
fn test_each_communication_event_appears_exactly_once() {
    let heartbeats = t4_heartbeats();
    let mut seen: HashMap<String, u32> = HashMap::new();
    for hb in &heartbeats {
        let delta = hb.communications.as_ref().expect("communications");
        for e in &delta.emails {
            *seen.entry(format!("email:{}:{}", e.sender, e.subject)).or_insert(0) += 1;
        }
        for c in &delta.chat_messages {
            *seen.entry(format!("chat:{}:{}", c.sender, c.text)).or_insert(0) += 1;
        }
        for s in &delta.sms {
            *seen.entry(format!("sms:{}:{}", s.sender, s.text)).or_insert(0) += 1;
        }
        for m in &delta.missed_calls {
            *seen.entry(format!("call:{}", m.caller)).or_insert(0) += 1;
        }
        for v in &delta.voicemails {
            *seen.entry(format!("vm:{}", v.caller)).or_insert(0) += 1;
        }
        for n in &delta.notifications {
            *seen.entry(format!("notif:{}:{}", n.platform, n.text)).or_insert(0) += 1;
        }
    }
    assert!(!seen.is_empty(), "no communications events at all");
    for (event, count) in seen {
        assert_eq!(count, 1, "event delivered {count} times: {event}");
    }
}

#[test]
fn test_emails_carry_no_body() {
    // Shape-level guarantee: the email record has exactly sender and
    // subject in its serialized form.
    let heartbeats = t4_heartbeats();
    for hb in &heartbeats {
        for email in &hb.communications.as_ref().expect("communications").emails {
            let v = serde_json::to_value(email).expect("serialize");
            let keys: Vec<&String> = v.as_object().expect("object").keys().collect();
            assert_eq!(keys, ["sender", "subject"]);
        }
    }
}

#[test]
fn test_transactions_window_and_balance() {
    let heartbeats = t4_heartbeats();
    let first = heartbeats[0].financial.as_ref().expect("financial");
    assert_eq!(first.recent_transactions.len(), 3, "window starts full");

    // Newest first.
    for pair in first.recent_transactions.windows(2) {
        assert!(pair[0].time >= pair[1].time);
    }

    // Balance decrements as the coffee posts at 06:55.
    let before_coffee = heartbeats[4].financial.as_ref().expect("financial").account_balance;
    let after_coffee = heartbeats[5].financial.as_ref().expect("financial").account_balance;
    assert!(after_coffee < before_coffee, "coffee never posted");

    // Budget summary recomputes.
    let early = &heartbeats[0].financial.as_ref().expect("financial").budget_summary;
    let late = &heartbeats[130].financial.as_ref().expect("financial").budget_summary;
    assert_ne!(early, late, "budget summary never recomputed");
}

#[test]
fn test_pending_charges_static() {
    let heartbeats = t4_heartbeats();
    let first = heartbeats[0].financial.as_ref().expect("financial").pending_charges.clone();
    for hb in &heartbeats {
        assert_eq!(
            hb.financial.as_ref().expect("financial").pending_charges,
            first
        );
    }
}

#[test]
fn test_geofence_only_at_home_and_office() {
    let heartbeats = t4_heartbeats();
    // 06:30 at home.
    assert!(heartbeats[0].location.as_ref().expect("location").geofence.is_some());
    // 09:00 at the office.
    assert!(heartbeats[30].location.as_ref().expect("location").geofence.is_some());
    // Mid-run in the park.
    assert!(heartbeats[137].location.as_ref().expect("location").geofence.is_none());
}
