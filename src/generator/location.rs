//! Location module generator.
//!
//! Stationary blocks jitter within a few meters of the block's named
//! coordinates; transit blocks interpolate between surrounding blocks with
//! lateral wobble and occasional station stops; the running block random-
//! walks near the park center with headings derived from successive fixes.
//! During the crisis the receiver keeps reporting: sub-meter drift, zero
//! speed, heading locked at its last pre-crisis value, altitude wobbling a
//! few meters, accuracy staying outdoor-normal. Real receivers never freeze
//! perfectly.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::schedule::{ActivityBlock, PersonSchedule};
use super::util::{lerp, round_to, wrap_heading};
use crate::scenario::types::{GeofenceStatus, LocationFix, MovementClass};

/// Degrees of latitude per meter, approximately.
const DEG_PER_METER: f64 = 1.0 / 111_000.0;

/// Named coordinates: `(latitude, longitude, altitude_m)`.
fn coords(key: &str) -> (f64, f64, f64) {
    match key {
        "home" => (47.6205, -122.3493, 56.0),
        "office" => (47.6097, -122.3331, 40.0),
        "lunch_spot" => (47.6102, -122.3320, 41.0),
        "park" => (47.6290, -122.3425, 48.0),
        // Transit has no anchor of its own; position is interpolated.
        _ => (47.6150, -122.3410, 48.0),
    }
}

/// Geofences exist only for the named home and office coordinates.
fn geofence_for(key: &str) -> Option<GeofenceStatus> {
    match key {
        "home" => Some(GeofenceStatus::Home),
        "office" => Some(GeofenceStatus::Office),
        _ => None,
    }
}

/// Fixed per-heartbeat sample set; drawn in full on every heartbeat.
struct Draws {
    jitter_lat: f64,
    jitter_lon: f64,
    wobble: f64,
    station_roll: f64,
    speed_frac: f64,
    alt_wobble: f64,
    accuracy: f64,
    walk_turn: f64,
    walk_step: f64,
}

impl Draws {
    fn sample(rng: &mut StdRng) -> Self {
        Self {
            jitter_lat: rng.gen_range(-1.0..1.0),
            jitter_lon: rng.gen_range(-1.0..1.0),
            wobble: rng.gen_range(-1.0..1.0),
            station_roll: rng.gen_range(0.0..1.0),
            speed_frac: rng.gen_range(0.0..1.0),
            alt_wobble: rng.gen_range(-3.0..3.0),
            accuracy: rng.gen_range(3.0..8.0),
            walk_turn: rng.gen_range(-0.9..0.9),
            walk_step: rng.gen_range(0.0..1.0),
        }
    }
}

/// Stateful location generator; one instance per scenario.
#[derive(Debug)]
pub struct LocationGenerator {
    lat: f64,
    lon: f64,
    heading: u32,
    run_bearing: f64,
}

impl LocationGenerator {
    /// Per-scenario setup: draws the initial running bearing.
    pub fn new(_sched: &PersonSchedule, rng: &mut StdRng) -> Self {
        let (lat, lon, _) = coords("home");
        let run_bearing = rng.gen_range(0.0..std::f64::consts::TAU);
        Self {
            lat,
            lon,
            heading: 0,
            run_bearing,
        }
    }

    /// Produce the location fix for one heartbeat.
    pub fn generate(
        &mut self,
        sched: &PersonSchedule,
        timestamp: DateTime<Utc>,
        rng: &mut StdRng,
    ) -> LocationFix {
        let draws = Draws::sample(rng);
        let block = sched.block_at(timestamp);

        if block.is_crisis() {
            return self.crisis_fix(block, &draws);
        }

        match block.location_key.as_str() {
            "transit" => self.transit_fix(sched, block, timestamp, &draws),
            "park" => self.running_fix(block, &draws),
            key => self.stationary_fix(key, block, &draws),
        }
    }

    fn stationary_fix(&mut self, key: &str, block: &ActivityBlock, draws: &Draws) -> LocationFix {
        let (base_lat, base_lon, alt) = coords(key);
        // Sub-decameter jitter around the anchor.
        let lat = base_lat + draws.jitter_lat * 4.0 * DEG_PER_METER;
        let lon = base_lon + draws.jitter_lon * 4.0 * DEG_PER_METER;
        self.lat = lat;
        self.lon = lon;

        LocationFix {
            latitude: round_to(lat, 6),
            longitude: round_to(lon, 6),
            altitude_m: round_to(alt + draws.alt_wobble * 0.4, 1),
            speed_mps: 0.0,
            heading_deg: self.heading,
            accuracy_m: round_to(draws.accuracy, 1),
            geofence: geofence_for(&block.location_key),
            movement: MovementClass::Stationary,
        }
    }

    fn transit_fix(
        &mut self,
        sched: &PersonSchedule,
        block: &ActivityBlock,
        timestamp: DateTime<Utc>,
        draws: &Draws,
    ) -> LocationFix {
        let (from, to) = transit_endpoints(sched, block);
        let total = block
            .end
            .signed_duration_since(block.start)
            .num_seconds()
            .max(1);
        let elapsed = timestamp
            .signed_duration_since(block.start)
            .num_seconds()
            .clamp(0, total);
        let t = f64::from(u32::try_from(elapsed).unwrap_or(0))
            / f64::from(u32::try_from(total).unwrap_or(1));

        let (from_lat, from_lon, from_alt) = coords(from);
        let (to_lat, to_lon, to_alt) = coords(to);

        let lat = lerp(from_lat, to_lat, t) + draws.wobble * 20.0 * DEG_PER_METER;
        let lon = lerp(from_lon, to_lon, t) + draws.jitter_lon * 20.0 * DEG_PER_METER;

        let heading = wrap_heading((to_lon - from_lon).atan2(to_lat - from_lat).to_degrees());
        self.heading = heading;

        // Occasional zero-speed station stops.
        let speed = if draws.station_roll < 0.15 {
            0.0
        } else {
            round_to(6.0 + draws.speed_frac * 6.0, 1)
        };

        self.lat = lat;
        self.lon = lon;

        LocationFix {
            latitude: round_to(lat, 6),
            longitude: round_to(lon, 6),
            altitude_m: round_to(lerp(from_alt, to_alt, t) + draws.alt_wobble * 0.5, 1),
            speed_mps: speed,
            heading_deg: heading,
            accuracy_m: round_to(draws.accuracy, 1),
            geofence: None,
            movement: MovementClass::Vehicle,
        }
    }

    fn running_fix(&mut self, _block: &ActivityBlock, draws: &Draws) -> LocationFix {
        let (center_lat, center_lon, alt) = coords("park");

        // Random-walk displacement at running pace, pulled back toward the
        // park center when the walk strays.
        self.run_bearing += draws.walk_turn;
        let step_m = 250.0 + draws.walk_step * 150.0;
        let mut lat = self.lat + self.run_bearing.cos() * step_m * DEG_PER_METER;
        let mut lon = self.lon + self.run_bearing.sin() * step_m * DEG_PER_METER;

        let max_radius_m = 450.0;
        let off_lat = (lat - center_lat) / DEG_PER_METER;
        let off_lon = (lon - center_lon) / DEG_PER_METER;
        let dist = (off_lat * off_lat + off_lon * off_lon).sqrt();
        if dist > max_radius_m {
            lat = center_lat + off_lat / dist * max_radius_m * DEG_PER_METER;
            lon = center_lon + off_lon / dist * max_radius_m * DEG_PER_METER;
        }

        // Heading from successive positions.
        let heading = wrap_heading((lon - self.lon).atan2(lat - self.lat).to_degrees());
        self.heading = heading;
        self.lat = lat;
        self.lon = lon;

        LocationFix {
            latitude: round_to(lat, 6),
            longitude: round_to(lon, 6),
            altitude_m: round_to(alt + draws.alt_wobble, 1),
            speed_mps: round_to(2.6 + draws.speed_frac * 0.8, 1),
            heading_deg: heading,
            accuracy_m: round_to(draws.accuracy, 1),
            geofence: None,
            movement: MovementClass::Running,
        }
    }

    fn crisis_fix(&mut self, _block: &ActivityBlock, draws: &Draws) -> LocationFix {
        let (_, _, alt) = coords("park");

        // Sub-meter continuing drift; the heading stays locked at its last
        // pre-crisis value and accuracy stays outdoor-normal.
        let lat = self.lat + draws.jitter_lat * 0.6 * DEG_PER_METER;
        let lon = self.lon + draws.jitter_lon * 0.6 * DEG_PER_METER;
        self.lat = lat;
        self.lon = lon;

        LocationFix {
            latitude: round_to(lat, 6),
            longitude: round_to(lon, 6),
            altitude_m: round_to(alt + draws.alt_wobble, 1),
            speed_mps: 0.0,
            heading_deg: self.heading,
            accuracy_m: round_to(draws.accuracy, 1),
            geofence: None,
            movement: MovementClass::Stationary,
        }
    }
}

/// Anchor keys on either side of a transit block.
fn transit_endpoints<'a>(sched: &'a PersonSchedule, block: &ActivityBlock) -> (&'a str, &'a str) {
    let blocks = sched.blocks();
    let idx = blocks
        .iter()
        .position(|b| b.start == block.start)
        .unwrap_or(0);
    let from = idx
        .checked_sub(1)
        .and_then(|i| blocks.get(i))
        .map_or("home", |b| b.location_key.as_str());
    let to = blocks
        .get(idx.saturating_add(1))
        .map_or("home", |b| b.location_key.as_str());
    (from, to)
}
