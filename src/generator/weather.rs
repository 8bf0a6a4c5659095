//! Weather module generator.
//!
//! A diurnal sinusoid drives temperature (cool morning, mid-afternoon peak,
//! evening cooling); humidity runs inverse to it. Wind speed and direction
//! random-walk so successive samples never flip; pressure, cloud cover, and
//! AQI drift slowly; the pollen level is chosen once per scenario; UV tracks
//! a sun arc. The environment does not know about the crisis, everything
//! keeps evolving through and after it.

use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::util::{round_to, round_u32, wrap_heading};
use crate::scenario::types::WeatherReport;

const POLLEN_LEVELS: [&str; 3] = ["low", "moderate", "high"];

/// Fixed per-heartbeat sample set.
struct Draws {
    temp_jitter: f64,
    wind_step: f64,
    dir_step: f64,
    pressure_step: f64,
    cloud_step: f64,
    aqi_step: f64,
    humidity_jitter: f64,
}

impl Draws {
    fn sample(rng: &mut StdRng) -> Self {
        Self {
            temp_jitter: rng.gen_range(-0.4..0.4),
            wind_step: rng.gen_range(-1.0..1.0),
            dir_step: rng.gen_range(-1.0..1.0),
            pressure_step: rng.gen_range(-0.01..0.01),
            cloud_step: rng.gen_range(-1.0..1.0),
            aqi_step: rng.gen_range(-1.0..1.0),
            humidity_jitter: rng.gen_range(-2.0..2.0),
        }
    }
}

/// Stateful weather generator; one instance per scenario.
#[derive(Debug)]
pub struct WeatherGenerator {
    mean_temp: f64,
    pollen_level: String,
    wind_speed: f64,
    wind_dir: f64,
    pressure: f64,
    cloud: f64,
    aqi: f64,
}

impl WeatherGenerator {
    /// Per-scenario setup: mean temperature, pollen level, and the initial
    /// states of every random walk.
    pub fn new(rng: &mut StdRng) -> Self {
        let mean_temp = rng.gen_range(14.0..20.0);
        let pollen_pick: usize = rng.gen_range(0..POLLEN_LEVELS.len());
        let wind_speed = rng.gen_range(4.0..14.0);
        let wind_dir = rng.gen_range(0.0..360.0);
        let pressure = rng.gen_range(1010.0..1022.0);
        let cloud = rng.gen_range(10.0..60.0);
        let aqi = rng.gen_range(12.0..45.0);
        Self {
            mean_temp,
            pollen_level: POLLEN_LEVELS
                .get(pollen_pick)
                .copied()
                .unwrap_or("low")
                .to_owned(),
            wind_speed,
            wind_dir,
            pressure,
            cloud,
            aqi,
        }
    }

    /// Produce the weather report for one heartbeat.
    pub fn generate(&mut self, timestamp: DateTime<Utc>, rng: &mut StdRng) -> WeatherReport {
        let draws = Draws::sample(rng);

        let hour = f64::from(timestamp.hour())
            + f64::from(timestamp.minute()) / 60.0;

        // Peak near 15:00, trough near 03:00.
        let diurnal = 4.5 * (std::f64::consts::TAU * (hour - 15.0) / 24.0).cos();
        let temp = self.mean_temp + diurnal + draws.temp_jitter;

        self.wind_speed = (self.wind_speed + draws.wind_step * 0.8).clamp(0.0, 32.0);
        self.wind_dir += draws.dir_step * 9.0;
        self.pressure += draws.pressure_step;
        self.cloud = (self.cloud + draws.cloud_step * 1.8).clamp(0.0, 100.0);
        self.aqi = (self.aqi + draws.aqi_step * 1.2).clamp(5.0, 90.0);

        let humidity = (82.0 - (temp - 10.0) * 2.4 + draws.humidity_jitter).clamp(20.0, 98.0);
        let feels_like = temp - self.wind_speed * 0.06;
        let dew_point = temp - (100.0 - humidity) / 5.0;

        // Sun arc: zero outside 06:00–20:00, peaked at midday.
        let uv = if (6.0..=20.0).contains(&hour) {
            5.8 * (std::f64::consts::PI * (hour - 6.0) / 14.0).sin()
        } else {
            0.0
        };

        WeatherReport {
            temp_c: round_to(temp, 1),
            feels_like_c: round_to(feels_like, 1),
            humidity_pct: round_u32(humidity),
            wind_speed_kmh: round_to(self.wind_speed, 1),
            wind_direction_deg: wrap_heading(self.wind_dir),
            uv_index: round_to(uv.max(0.0), 1),
            aqi: round_u32(self.aqi),
            pollen_level: self.pollen_level.clone(),
            pressure_hpa: round_to(self.pressure, 2),
            dew_point_c: round_to(dew_point, 1),
            cloud_cover_pct: round_u32(self.cloud),
        }
    }
}
