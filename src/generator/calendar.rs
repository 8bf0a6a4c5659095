//! Calendar module generator.
//!
//! A fixed scripted event list bound to the scenario date. The upcoming
//! view is a sliding window: the three soonest events whose start is after
//! the current timestamp, with passed events dropping out. Reminders work
//! the same way. The day summary is generated once. No randomness is
//! consumed, this generator's fixed per-heartbeat draw count is zero.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

use super::schedule::PersonSchedule;
use super::GeneratorError;
use crate::scenario::types::{CalendarEvent, CalendarSnapshot, Reminder};

/// Scripted-calendar generator; one instance per scenario.
#[derive(Debug)]
pub struct CalendarGenerator {
    events: Vec<CalendarEvent>,
    reminders: Vec<Reminder>,
    day_summary: String,
}

impl CalendarGenerator {
    /// Build the scripted event list for the scenario date.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDate`] if a scripted wall-clock
    /// time cannot be represented.
    pub fn new(sched: &PersonSchedule) -> Result<Self, GeneratorError> {
        let date = sched.scenario_date();
        let at = |day_offset: i64, hour: u32, minute: u32| -> Result<DateTime<Utc>, GeneratorError> {
            let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
                GeneratorError::InvalidDate(format!("invalid event time {hour:02}:{minute:02}"))
            })?;
            let base = Utc.from_utc_datetime(&date.and_time(time));
            base.checked_add_signed(Duration::days(day_offset))
                .ok_or_else(|| GeneratorError::InvalidDate("event date overflow".to_owned()))
        };

        let event = |title: &str, start: DateTime<Utc>, location: &str, attendees: &[&str]| {
            CalendarEvent {
                title: title.to_owned(),
                start,
                location: location.to_owned(),
                attendees: attendees.iter().map(|a| (*a).to_owned()).collect(),
            }
        };

        let events = vec![
            event(
                "Team standup",
                at(0, 10, 30)?,
                "Conference room B",
                &["Daniel Reyes", "Priya Natarajan", "Tom Ellison"],
            ),
            event(
                "Lunch with Priya",
                at(0, 12, 30)?,
                "Verdant Bowls",
                &["Daniel Reyes", "Priya Natarajan"],
            ),
            event(
                "Design review",
                at(0, 15, 0)?,
                "Conference room A",
                &["Daniel Reyes", "Tom Ellison", "Sasha Kim"],
            ),
            event(
                "Dinner with Mara",
                at(0, 19, 30)?,
                "Home",
                &["Daniel Reyes", "Mara Reyes"],
            ),
            event(
                "Dentist appointment",
                at(1, 9, 0)?,
                "Lakeview Dental",
                &["Daniel Reyes"],
            ),
            event(
                "Quarterly demo",
                at(1, 11, 0)?,
                "Main auditorium",
                &["Daniel Reyes", "Priya Natarajan", "Sasha Kim"],
            ),
            event(
                "Cabin trip planning call",
                at(2, 18, 0)?,
                "Video call",
                &["Daniel Reyes", "Mara Reyes", "Elena Reyes"],
            ),
        ];

        let reminders = vec![
            Reminder {
                text: "Pick up dry cleaning on the way home".to_owned(),
                due: at(0, 17, 30)?,
            },
            Reminder {
                text: "Water the balcony plants".to_owned(),
                due: at(0, 20, 0)?,
            },
            Reminder {
                text: "Submit expense report".to_owned(),
                due: at(1, 9, 30)?,
            },
        ];

        let day_summary = "Busy midweek day: morning standup, lunch with Priya, \
                           afternoon design review, then dinner at home with Mara. \
                           Evening run planned before dinner."
            .to_owned();

        Ok(Self {
            events,
            reminders,
            day_summary,
        })
    }

    /// Produce the calendar view for one heartbeat.
    pub fn generate(&self, timestamp: DateTime<Utc>) -> CalendarSnapshot {
        let next_events = self
            .events
            .iter()
            .filter(|e| e.start > timestamp)
            .take(3)
            .cloned()
            .collect();

        let reminders = self
            .reminders
            .iter()
            .filter(|r| r.due > timestamp)
            .cloned()
            .collect();

        CalendarSnapshot {
            next_events,
            reminders,
            day_summary: self.day_summary.clone(),
        }
    }
}
