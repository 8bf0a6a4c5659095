//! Timeline backbone: the scripted day as an ordered block list.
//!
//! The day follows a cardiac-arrest narrative: wake, breakfast, commute,
//! office work punctuated by meetings and lunch, evening commute, a short
//! stretch at home, a run in the park, then a terminal `CRISIS` block.
//! Heartbeats fire every five minutes from the first block's start through
//! a trailing post-crisis window.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use super::GeneratorError;

/// Minimum allowed scenario year. Scenario dates are future-dated so they
/// fall outside any plausible training window for the agent model.
pub const MIN_SCENARIO_YEAR: i32 = 2027;

/// Minutes between heartbeats.
pub const HEARTBEAT_INTERVAL_MINS: i64 = 5;

/// Heartbeats emitted after the crisis begins.
pub const POST_CRISIS_HEARTBEATS: u32 = 20;

/// Activity name of the terminal block.
pub const CRISIS_ACTIVITY: &str = "CRISIS";

/// One contiguous stretch of the simulated day.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityBlock {
    /// Block start.
    pub start: DateTime<Utc>,
    /// Block end (exclusive, except for the terminal block).
    pub end: DateTime<Utc>,
    /// Activity label (e.g. `focused work`, `running`, `CRISIS`).
    pub activity: String,
    /// Key into the location table (`home`, `office`, `transit`, ...).
    pub location_key: String,
    /// Plausible heart-rate range for the activity; `(0, 0)` for CRISIS.
    pub heart_rate_range: (u32, u32),
}

impl ActivityBlock {
    /// Whether this is the terminal crisis block.
    pub fn is_crisis(&self) -> bool {
        self.activity == CRISIS_ACTIVITY
    }
}

/// The ordered day plan plus heartbeat arithmetic.
#[derive(Debug, Clone)]
pub struct PersonSchedule {
    scenario_date: NaiveDate,
    blocks: Vec<ActivityBlock>,
}

impl PersonSchedule {
    /// Build the scripted cardiac-arrest day for `scenario_date`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDate`] if the year is below
    /// [`MIN_SCENARIO_YEAR`].
    pub fn cardiac_arrest_day(scenario_date: NaiveDate) -> Result<Self, GeneratorError> {
        use chrono::Datelike;

        if scenario_date.year() < MIN_SCENARIO_YEAR {
            return Err(GeneratorError::InvalidDate(format!(
                "scenario year {} is below the minimum {MIN_SCENARIO_YEAR}",
                scenario_date.year()
            )));
        }

        let block = |sh, sm, eh, em, activity: &str, key: &str, lo, hi| {
            Ok::<_, GeneratorError>(ActivityBlock {
                start: at(scenario_date, sh, sm)?,
                end: at(scenario_date, eh, em)?,
                activity: activity.to_owned(),
                location_key: key.to_owned(),
                heart_rate_range: (lo, hi),
            })
        };

        let crisis_start = at(scenario_date, 18, 5)?;
        let trailing =
            Duration::minutes(i64::from(POST_CRISIS_HEARTBEATS).saturating_mul(HEARTBEAT_INTERVAL_MINS));
        let crisis_end = crisis_start.checked_add_signed(trailing).ok_or_else(|| {
            GeneratorError::InvalidDate("crisis window overflows the calendar".to_owned())
        })?;

        let blocks = vec![
            block(6, 30, 7, 0, "waking up", "home", 52, 64)?,
            block(7, 0, 7, 30, "breakfast", "home", 58, 70)?,
            block(7, 30, 8, 15, "commute to office", "transit", 68, 82)?,
            block(8, 15, 8, 30, "arriving at office", "office", 64, 76)?,
            block(8, 30, 10, 30, "focused work", "office", 58, 72)?,
            block(10, 30, 11, 0, "team standup", "office", 62, 76)?,
            block(11, 0, 12, 30, "focused work", "office", 58, 72)?,
            block(12, 30, 13, 15, "lunch", "lunch_spot", 66, 80)?,
            block(13, 15, 15, 0, "focused work", "office", 58, 72)?,
            block(15, 0, 16, 0, "design review", "office", 62, 78)?,
            block(16, 0, 17, 0, "focused work", "office", 58, 72)?,
            block(17, 0, 17, 40, "commute home", "transit", 68, 82)?,
            block(17, 40, 17, 50, "evening at home", "home", 62, 74)?,
            block(17, 50, 18, 5, "running", "park", 142, 166)?,
            ActivityBlock {
                start: crisis_start,
                end: crisis_end,
                activity: CRISIS_ACTIVITY.to_owned(),
                location_key: "park".to_owned(),
                heart_rate_range: (0, 0),
            },
        ];

        Ok(Self {
            scenario_date,
            blocks,
        })
    }

    /// The scenario date.
    pub fn scenario_date(&self) -> NaiveDate {
        self.scenario_date
    }

    /// The ordered block list.
    pub fn blocks(&self) -> &[ActivityBlock] {
        &self.blocks
    }

    /// Start of the terminal crisis block.
    pub fn crisis_start(&self) -> DateTime<Utc> {
        self.blocks.last().map(|b| b.start).unwrap_or_default()
    }

    /// All heartbeat timestamps, every five minutes from the first block's
    /// start through the end of the post-crisis window.
    pub fn heartbeat_timestamps(&self) -> Vec<DateTime<Utc>> {
        let Some(first) = self.blocks.first() else {
            return Vec::new();
        };
        let Some(last) = self.blocks.last() else {
            return Vec::new();
        };

        let mut timestamps = Vec::new();
        let mut ts = first.start;
        while ts <= last.end {
            timestamps.push(ts);
            match ts.checked_add_signed(Duration::minutes(HEARTBEAT_INTERVAL_MINS)) {
                Some(next) => ts = next,
                None => break,
            }
        }
        timestamps
    }

    /// The block active at `timestamp`: the last block whose start is at or
    /// before it. Timestamps before the first block clamp to the first
    /// block; timestamps after the last clamp to the last.
    pub fn block_at(&self, timestamp: DateTime<Utc>) -> &ActivityBlock {
        self.blocks
            .iter()
            .rev()
            .find(|b| b.start <= timestamp)
            .or_else(|| self.blocks.first())
            .expect("a schedule always carries at least one block")
    }

    /// Index of the first heartbeat whose timestamp is at or after the
    /// crisis block's start.
    pub fn crisis_heartbeat_id(&self) -> u32 {
        let crisis = self.crisis_start();
        let id = self
            .heartbeat_timestamps()
            .iter()
            .position(|ts| *ts >= crisis)
            .unwrap_or(0);
        u32::try_from(id).unwrap_or(u32::MAX)
    }

    /// Whether `timestamp` is the first heartbeat inside its block.
    pub fn is_first_heartbeat_of_block(&self, timestamp: DateTime<Utc>) -> bool {
        let block = self.block_at(timestamp);
        timestamp
            .checked_sub_signed(Duration::minutes(HEARTBEAT_INTERVAL_MINS))
            .is_none_or(|prev| prev < block.start)
    }
}

/// A wall-clock instant on the scenario date, treated as UTC.
fn at(date: NaiveDate, hour: u32, minute: u32) -> Result<DateTime<Utc>, GeneratorError> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        GeneratorError::InvalidDate(format!("invalid wall-clock time {hour:02}:{minute:02}"))
    })?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}
