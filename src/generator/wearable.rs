//! Wearable module generator.
//!
//! Synthesizes heart rate, blood oxygen, steps, skin temperature, ECG
//! summary, glucose, calories, respiratory rate, and body battery per
//! heartbeat. Crisis behaviour is encoded here, not in the enforcement
//! pass: vitals zero out, skin temperature follows Newton's law of cooling
//! toward an effective clothed-ambient value, and the body battery freezes
//! at its last computed value (no heart-rate variability, no computation).

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::schedule::{ActivityBlock, PersonSchedule};
use super::util::{round_to, round_u32};
use crate::scenario::types::WearableReading;

/// Effective ambient temperature for a clothed body, °C.
const COOLING_AMBIENT_C: f64 = 28.0;

/// Newton cooling rate constant per minute. Tuned so early drops are
/// visibly larger than later drops after one-decimal rounding.
const COOLING_RATE_PER_MIN: f64 = 0.04;

/// ECG artifact summaries, picked on roughly 3% of normal reads.
const ECG_ARTIFACTS: [&str; 3] = [
    "inconclusive reading, motion artifact",
    "poor signal quality, reposition device",
    "normal sinus rhythm, minor baseline wander",
];

/// Fixed per-heartbeat sample set.
///
/// Drawn in full on every heartbeat, crisis included, so the shared random
/// stream never shifts when a branch skips a value.
struct Draws {
    hr_frac: f64,
    spo2_base: u32,
    spo2_roll: f64,
    spo2_low: u32,
    ecg_roll: f64,
    ecg_pick: usize,
    glucose_step: f64,
    glucose_dip: f64,
    round_roll: f64,
    temp_jitter: f64,
    resp_frac: f64,
    steps_frac: f64,
    calories_frac: f64,
    battery_wobble: f64,
}

impl Draws {
    fn sample(rng: &mut StdRng) -> Self {
        Self {
            hr_frac: rng.gen_range(0.0..1.0),
            spo2_base: rng.gen_range(95..=99),
            spo2_roll: rng.gen_range(0.0..1.0),
            spo2_low: rng.gen_range(93..=94),
            ecg_roll: rng.gen_range(0.0..1.0),
            ecg_pick: rng.gen_range(0..ECG_ARTIFACTS.len()),
            glucose_step: rng.gen_range(-1.5..1.5),
            glucose_dip: rng.gen_range(1.0..2.7),
            round_roll: rng.gen_range(0.0..1.0),
            temp_jitter: rng.gen_range(-0.15..0.15),
            resp_frac: rng.gen_range(0.0..1.0),
            steps_frac: rng.gen_range(0.0..1.0),
            calories_frac: rng.gen_range(0.0..1.0),
            battery_wobble: rng.gen_range(-1.5..1.5),
        }
    }
}

/// Stateful wearable generator; one instance per scenario.
#[derive(Debug)]
pub struct WearableGenerator {
    battery: f64,
    battery_floor: f64,
    glucose: f64,
    last_temp: f64,
    crisis_onset_temp: Option<f64>,
    frozen_battery: Option<u32>,
}

impl WearableGenerator {
    /// Per-scenario setup: draws the battery start, the randomized soft
    /// floor, and the glucose baseline.
    pub fn new(_sched: &PersonSchedule, rng: &mut StdRng) -> Self {
        let battery = rng.gen_range(72.0..90.0);
        let battery_floor = rng.gen_range(18.0..32.0);
        let glucose = rng.gen_range(92.0..108.0);
        Self {
            battery,
            battery_floor,
            glucose,
            last_temp: 33.4,
            crisis_onset_temp: None,
            frozen_battery: None,
        }
    }

    /// Produce the wearable reading for one heartbeat.
    pub fn generate(
        &mut self,
        sched: &PersonSchedule,
        timestamp: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> WearableReading {
        let draws = Draws::sample(rng);
        let block = sched.block_at(timestamp);

        if block.is_crisis() {
            self.crisis_reading(sched, timestamp, &draws)
        } else {
            self.normal_reading(sched, timestamp, block, &draws)
        }
    }

    fn normal_reading(
        &mut self,
        sched: &PersonSchedule,
        timestamp: DateTime<Utc>,
        block: &ActivityBlock,
        draws: &Draws,
    ) -> WearableReading {
        let running = block.activity == "running";

        let (lo, hi) = block.heart_rate_range;
        let heart_rate = if running && sched.is_first_heartbeat_of_block(timestamp) {
            // Warm-up: the heart does not jump straight into the running
            // range on the first sample of the block.
            let sedentary_ref = 74.0;
            let midpoint = (sedentary_ref + f64::from(lo)) / 2.0;
            round_u32(midpoint + draws.hr_frac * 8.0)
        } else {
            round_u32(f64::from(lo) + draws.hr_frac * f64::from(hi.saturating_sub(lo)))
        };

        let blood_oxygen = if draws.spo2_roll < 0.03 {
            100
        } else if draws.spo2_roll < 0.06 {
            draws.spo2_low
        } else {
            draws.spo2_base
        };

        let ecg_summary = if draws.ecg_roll < 0.03 {
            ECG_ARTIFACTS
                .get(draws.ecg_pick)
                .copied()
                .unwrap_or(ECG_ARTIFACTS[0])
                .to_owned()
        } else {
            "normal sinus rhythm".to_owned()
        };

        // Glucose drifts through the day; running burns it down.
        if running {
            self.glucose -= draws.glucose_dip;
        } else {
            self.glucose = (self.glucose + draws.glucose_step * 0.5).clamp(80.0, 130.0);
        }
        let blood_glucose = if draws.round_roll < 0.15 {
            self.glucose.round()
        } else {
            round_to(self.glucose, 1)
        };

        let skin_temp_c = round_to(33.4 + if running { 0.3 } else { 0.0 } + draws.temp_jitter, 1);
        self.last_temp = skin_temp_c;

        let respiratory_rate = if running {
            round_u32(28.0 + draws.resp_frac * 8.0)
        } else {
            round_u32(12.0 + draws.resp_frac * 4.0)
        };

        let steps = steps_for(block, draws.steps_frac);
        let calories_burned = round_to(calories_for(block, draws.calories_frac), 1);

        // Body battery drains through the day; at the soft floor it wobbles
        // instead of clamping flat.
        let drain = 0.35 + 0.05 * draws.battery_wobble.abs();
        self.battery -= drain;
        if self.battery < self.battery_floor {
            self.battery = self.battery_floor + draws.battery_wobble.abs();
        }
        let body_battery = round_u32(self.battery);
        self.frozen_battery = Some(body_battery);

        WearableReading {
            heart_rate,
            blood_oxygen,
            steps,
            skin_temp_c,
            ecg_summary,
            blood_glucose,
            calories_burned,
            sleep_stage: "awake".to_owned(),
            respiratory_rate,
            body_battery,
        }
    }

    fn crisis_reading(
        &mut self,
        sched: &PersonSchedule,
        timestamp: DateTime<Utc>,
        draws: &Draws,
    ) -> WearableReading {
        let onset = *self.crisis_onset_temp.get_or_insert(self.last_temp);

        let minutes = timestamp
            .signed_duration_since(sched.crisis_start())
            .num_minutes()
            .max(0);
        let elapsed = u32::try_from(minutes).map(f64::from).unwrap_or(0.0);
        let skin_temp_c = round_to(
            COOLING_AMBIENT_C + (onset - COOLING_AMBIENT_C) * (-COOLING_RATE_PER_MIN * elapsed).exp(),
            1,
        );

        // The glucose sensor keeps reporting; interstitial readings sag
        // slowly rather than zeroing out.
        self.glucose -= 0.2 + draws.glucose_step.abs() * 0.1;
        let blood_glucose = if draws.round_roll < 0.15 {
            self.glucose.round()
        } else {
            round_to(self.glucose, 1)
        };

        WearableReading {
            heart_rate: 0,
            blood_oxygen: 0,
            steps: 0,
            skin_temp_c,
            ecg_summary: "no signal detected".to_owned(),
            blood_glucose,
            calories_burned: 0.0,
            sleep_stage: "awake".to_owned(),
            respiratory_rate: 0,
            body_battery: self.frozen_battery.unwrap_or(0),
        }
    }
}

/// Interval step count for a block's activity class.
fn steps_for(block: &ActivityBlock, frac: f64) -> u32 {
    match block.location_key.as_str() {
        "transit" => round_u32(150.0 + frac * 250.0),
        "park" => round_u32(550.0 + frac * 150.0),
        _ => round_u32(5.0 + frac * 35.0),
    }
}

/// Interval calories for a block's activity class.
fn calories_for(block: &ActivityBlock, frac: f64) -> f64 {
    match block.location_key.as_str() {
        "transit" => 15.0 + frac * 10.0,
        "park" => 45.0 + frac * 15.0,
        _ => 6.0 + frac * 6.0,
    }
}
