//! Communications module generator.
//!
//! A scripted event list, emails, chat messages, SMS, missed calls,
//! voicemails, platform notifications, with irregular, clustered timings.
//! Emission is strictly delta-based: each event appears in exactly the
//! first heartbeat whose timestamp is at or past its scheduled time and in
//! no other. Emails carry sender and subject only, never a body. Traffic
//! continues through and after the crisis; the world does not stop.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::schedule::{PersonSchedule, HEARTBEAT_INTERVAL_MINS};
use super::GeneratorError;
use crate::scenario::types::{
    AppNotification, ChatMessageRecord, CommunicationsDelta, EmailHeader, MissedCall, SmsMessage,
    Voicemail,
};

/// One scripted communications event.
#[derive(Debug, Clone)]
enum CommEvent {
    Email(EmailHeader),
    Chat(ChatMessageRecord),
    Sms(SmsMessage),
    MissedCall(MissedCall),
    Voicemail(Voicemail),
    Notification(AppNotification),
}

#[derive(Debug, Clone)]
struct Scheduled {
    at: DateTime<Utc>,
    event: CommEvent,
}

/// Scripted-communications generator; one instance per scenario.
#[derive(Debug)]
pub struct CommunicationsGenerator {
    schedule: Vec<Scheduled>,
}

impl CommunicationsGenerator {
    /// Build the scripted event list. Consumes exactly one jitter draw per
    /// scripted event, so the setup draw count is fixed.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidDate`] if a scripted time cannot be
    /// represented.
    pub fn new(sched: &PersonSchedule, rng: &mut StdRng) -> Result<Self, GeneratorError> {
        let date = sched.scenario_date();
        let base = |hour: u32, minute: u32| -> Result<DateTime<Utc>, GeneratorError> {
            let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
                GeneratorError::InvalidDate(format!(
                    "invalid communications time {hour:02}:{minute:02}"
                ))
            })?;
            Ok(Utc.from_utc_datetime(&date.and_time(time)))
        };

        let email = |sender: &str, subject: &str| {
            CommEvent::Email(EmailHeader {
                sender: sender.to_owned(),
                subject: subject.to_owned(),
            })
        };
        let chat = |channel: &str, sender: &str, text: &str| {
            CommEvent::Chat(ChatMessageRecord {
                channel: channel.to_owned(),
                sender: sender.to_owned(),
                text: text.to_owned(),
            })
        };
        let sms = |sender: &str, text: &str| {
            CommEvent::Sms(SmsMessage {
                sender: sender.to_owned(),
                text: text.to_owned(),
            })
        };
        let notification = |platform: &str, text: &str| {
            CommEvent::Notification(AppNotification {
                platform: platform.to_owned(),
                text: text.to_owned(),
            })
        };

        // Scripted day of traffic, clustered around the morning ramp-up,
        // lunch, and the late afternoon.
        let script: Vec<(DateTime<Utc>, CommEvent)> = vec![
            (base(7, 10)?, notification("podcasts", "New episode: The Long Form, ep. 214")),
            (base(8, 40)?, email("Priya Natarajan", "Standup notes doc")),
            (base(8, 55)?, chat("#design", "Tom Ellison", "pushed the updated nav mockups, take a look when you can")),
            (base(9, 5)?, email("Lakeview Dental", "Reminder: appointment tomorrow 9:00")),
            (base(9, 10)?, chat("#general", "Sasha Kim", "coffee machine on 4 is fixed, rejoice")),
            (base(9, 45)?, email("Atlas Cloud", "Your invoice for June is available")),
            (base(10, 20)?, sms("Mara", "don't forget dry cleaning on your way home!")),
            (base(11, 15)?, chat("#design", "Priya Natarajan", "moved the review to room A, same time")),
            (base(12, 10)?, notification("fitness", "You hit your stand goal 5 days in a row")),
            (base(12, 50)?, email("City Parks Dept", "Summer trail volunteering signup open")),
            (base(13, 30)?, chat("#general", "Tom Ellison", "lunch crew verdict: the new bowls place is a keeper")),
            (base(14, 25)?, email("Priya Natarajan", "Re: design review agenda")),
            (base(15, 40)?, sms("Elena", "call me this weekend? want to plan the cabin trip")),
            (base(16, 10)?, notification("news", "Your Wednesday briefing is ready")),
            (base(16, 45)?, email("Tom Ellison", "Follow-ups from design review")),
            (base(17, 25)?, chat("#design", "Sasha Kim", "final icon set uploaded, closing the ticket")),
            (base(17, 55)?, notification("music", "Running mix updated with 12 new tracks")),
            // Traffic keeps arriving after 18:05. Nobody knows yet.
            (base(18, 20)?, email("Atlas Cloud", "Scheduled maintenance this weekend")),
            (base(18, 40)?, chat("#general", "Priya Natarajan", "left my notes in room A, grabbing them tomorrow")),
            (base(19, 0)?, CommEvent::MissedCall(MissedCall { caller: "Mara".to_owned() })),
            (base(19, 10)?, sms("Mara", "dinner's almost ready, are you close?")),
            (base(19, 25)?, CommEvent::Voicemail(Voicemail { caller: "Mara".to_owned(), duration_secs: 14 })),
        ];

        // Irregular timings: jitter each scripted time by a couple of
        // minutes, one draw per event.
        let mut schedule = Vec::with_capacity(script.len());
        for (at, event) in script {
            let jitter_secs: i64 = rng.gen_range(-150..150);
            let at = at
                .checked_add_signed(Duration::seconds(jitter_secs))
                .unwrap_or(at);
            schedule.push(Scheduled { at, event });
        }
        schedule.sort_by_key(|s| s.at);

        Ok(Self { schedule })
    }

    /// Produce the delta for one heartbeat: events scheduled in the
    /// half-open window `(timestamp - 5min, timestamp]`.
    pub fn generate(&self, timestamp: DateTime<Utc>) -> CommunicationsDelta {
        let window_start =
            timestamp.checked_sub_signed(Duration::minutes(HEARTBEAT_INTERVAL_MINS));

        let mut delta = CommunicationsDelta::default();
        for item in &self.schedule {
            let after_start = window_start.is_none_or(|ws| item.at > ws);
            if after_start && item.at <= timestamp {
                match &item.event {
                    CommEvent::Email(e) => delta.emails.push(e.clone()),
                    CommEvent::Chat(c) => delta.chat_messages.push(c.clone()),
                    CommEvent::Sms(s) => delta.sms.push(s.clone()),
                    CommEvent::MissedCall(m) => delta.missed_calls.push(m.clone()),
                    CommEvent::Voicemail(v) => delta.voicemails.push(v.clone()),
                    CommEvent::Notification(n) => delta.notifications.push(n.clone()),
                }
            }
        }
        delta
    }
}
