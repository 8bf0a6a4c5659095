//! Published scenario record types.
//!
//! All records serialize with lower-snake-case keys. Module slots on
//! [`HeartbeatPayload`] are `Option`s serialized as explicit `null` when a
//! tier drops them; the runtime's prompt builder elides the nulls before the
//! agent ever sees the payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hash::content_hash;
use super::ScenarioError;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// The scripted emergency a scenario is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisType {
    /// Sudden cardiac arrest during an evening run.
    CardiacArrest,
}

impl std::fmt::Display for CrisisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CardiacArrest => f.write_str("cardiac_arrest"),
        }
    }
}

impl std::str::FromStr for CrisisType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cardiac_arrest" => Ok(Self::CardiacArrest),
            other => Err(anyhow::anyhow!("unknown crisis type: {other}")),
        }
    }
}

/// Noise tier controlling which modules and tools the agent sees.
///
/// Ordering is meaningful: every tier's module set is a subset of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseTier {
    /// Wearable only, core tools only.
    T1,
    /// Adds location and weather.
    T2,
    /// Adds calendar, communications, and dotted noise tools.
    T3,
    /// Adds financial data and tools.
    T4,
}

impl NoiseTier {
    /// All tiers in ascending order.
    pub const ALL: [Self; 4] = [Self::T1, Self::T2, Self::T3, Self::T4];
}

impl std::fmt::Display for NoiseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::T1 => f.write_str("t1"),
            Self::T2 => f.write_str("t2"),
            Self::T3 => f.write_str("t3"),
            Self::T4 => f.write_str("t4"),
        }
    }
}

impl std::str::FromStr for NoiseTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "t1" => Ok(Self::T1),
            "t2" => Ok(Self::T2),
            "t3" => Ok(Self::T3),
            "t4" => Ok(Self::T4),
            other => Err(anyhow::anyhow!("unknown noise tier: {other}")),
        }
    }
}

/// Named geofence the person has registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeofenceStatus {
    /// Inside the home geofence.
    Home,
    /// Inside the office geofence.
    Office,
}

/// Coarse movement classification derived from speed and position history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementClass {
    /// No significant displacement.
    Stationary,
    /// Walking pace.
    Walking,
    /// Running pace.
    Running,
    /// In a vehicle or on transit.
    Vehicle,
}

// ---------------------------------------------------------------------------
// Module payloads
// ---------------------------------------------------------------------------

/// One wearable sample: vitals-adjacent sensor readings for a 5-minute tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WearableReading {
    /// Heart rate in beats per minute.
    pub heart_rate: u32,
    /// Blood oxygen saturation percentage.
    pub blood_oxygen: u32,
    /// Steps taken during the last interval.
    pub steps: u32,
    /// Skin temperature in degrees Celsius, one-decimal precision.
    pub skin_temp_c: f64,
    /// Free-text ECG rhythm summary.
    pub ecg_summary: String,
    /// Interstitial blood glucose in mg/dL.
    pub blood_glucose: f64,
    /// Calories burned during the last interval.
    pub calories_burned: f64,
    /// Current sleep stage label (`awake` throughout a daytime scenario).
    pub sleep_stage: String,
    /// Respiratory rate in breaths per minute.
    pub respiratory_rate: u32,
    /// Device "body battery" energy estimate, 0–100.
    pub body_battery: u32,
}

/// One GPS fix with derived motion fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Altitude above sea level in meters.
    pub altitude_m: f64,
    /// Ground speed in meters per second.
    pub speed_mps: f64,
    /// Heading in integer degrees, 0–360.
    pub heading_deg: u32,
    /// Estimated horizontal accuracy in meters.
    pub accuracy_m: f64,
    /// Geofence the fix falls inside, if any.
    pub geofence: Option<GeofenceStatus>,
    /// Movement classification.
    pub movement: MovementClass,
}

/// One weather observation for the person's current area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Air temperature in degrees Celsius.
    pub temp_c: f64,
    /// Feels-like temperature in degrees Celsius.
    pub feels_like_c: f64,
    /// Relative humidity percentage.
    pub humidity_pct: u32,
    /// Wind speed in km/h.
    pub wind_speed_kmh: f64,
    /// Wind direction in integer degrees.
    pub wind_direction_deg: u32,
    /// UV index.
    pub uv_index: f64,
    /// Air quality index.
    pub aqi: u32,
    /// Pollen level label, chosen once per scenario.
    pub pollen_level: String,
    /// Barometric pressure in hPa.
    pub pressure_hpa: f64,
    /// Dew point in degrees Celsius.
    pub dew_point_c: f64,
    /// Cloud cover percentage.
    pub cloud_cover_pct: u32,
}

/// A calendar event as shown in the sliding upcoming-events window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title.
    pub title: String,
    /// Event start time.
    pub start: DateTime<Utc>,
    /// Event location text.
    pub location: String,
    /// Attendee display names.
    pub attendees: Vec<String>,
}

/// A pending reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Reminder text.
    pub text: String,
    /// When the reminder fires.
    pub due: DateTime<Utc>,
}

/// Calendar view for one heartbeat: a sliding window over the scripted day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSnapshot {
    /// The three soonest events starting after the current timestamp.
    pub next_events: Vec<CalendarEvent>,
    /// Reminders still in the future.
    pub reminders: Vec<Reminder>,
    /// Static natural-language summary of the day, generated once.
    pub day_summary: String,
}

/// An email header (sender and subject only, never a body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailHeader {
    /// Sender display string.
    pub sender: String,
    /// Subject line.
    pub subject: String,
}

/// A chat message with full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    /// Channel or room name.
    pub channel: String,
    /// Sender display name.
    pub sender: String,
    /// Full message text.
    pub text: String,
}

/// An SMS with full text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    /// Sender display string or number.
    pub sender: String,
    /// Full message text.
    pub text: String,
}

/// A missed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedCall {
    /// Caller display string or number.
    pub caller: String,
}

/// A voicemail notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voicemail {
    /// Caller display string or number.
    pub caller: String,
    /// Recording length in seconds.
    pub duration_secs: u32,
}

/// A platform notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppNotification {
    /// Originating platform or app name.
    pub platform: String,
    /// Notification text.
    pub text: String,
}

/// Per-heartbeat communications deltas. Each scripted event appears in
/// exactly one heartbeat and never again.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommunicationsDelta {
    /// New emails since the previous heartbeat.
    pub emails: Vec<EmailHeader>,
    /// New chat messages since the previous heartbeat.
    pub chat_messages: Vec<ChatMessageRecord>,
    /// New SMS since the previous heartbeat.
    pub sms: Vec<SmsMessage>,
    /// New missed calls since the previous heartbeat.
    pub missed_calls: Vec<MissedCall>,
    /// New voicemails since the previous heartbeat.
    pub voicemails: Vec<Voicemail>,
    /// New platform notifications since the previous heartbeat.
    pub notifications: Vec<AppNotification>,
}

impl CommunicationsDelta {
    /// Whether this delta carries no events at all.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.chat_messages.is_empty()
            && self.sms.is_empty()
            && self.missed_calls.is_empty()
            && self.voicemails.is_empty()
            && self.notifications.is_empty()
    }
}

/// A completed card transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Merchant name.
    pub merchant: String,
    /// Amount in account currency.
    pub amount: f64,
    /// When the transaction posted.
    pub time: DateTime<Utc>,
}

/// A pending (not yet posted) charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCharge {
    /// Merchant name.
    pub merchant: String,
    /// Amount in account currency.
    pub amount: f64,
}

/// A watchlist quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerQuote {
    /// Ticker symbol.
    pub symbol: String,
    /// Last price.
    pub price: f64,
}

/// Financial view for one heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Three most recent completed transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
    /// Current account balance.
    pub account_balance: f64,
    /// Static pending charges.
    pub pending_charges: Vec<PendingCharge>,
    /// Stock watchlist quotes.
    pub stock_watchlist: Vec<TickerQuote>,
    /// Crypto watchlist quotes.
    pub crypto_watchlist: Vec<TickerQuote>,
    /// Spend-versus-budget summary, recomputed as transactions accumulate.
    pub budget_summary: String,
}

// ---------------------------------------------------------------------------
// Heartbeat payload
// ---------------------------------------------------------------------------

/// One 5-minute simulation tick as the agent receives it.
///
/// Absent modules are explicit `null`s in the serialized payload; tier
/// filtering is the only thing that blanks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatPayload {
    /// Zero-based index into the scenario's heartbeat list.
    pub heartbeat_id: u32,
    /// Tick timestamp.
    pub timestamp: DateTime<Utc>,
    /// Wearable module, present in every tier.
    pub wearable: Option<WearableReading>,
    /// Location module, T2 and up.
    pub location: Option<LocationFix>,
    /// Weather module, T2 and up.
    pub weather: Option<WeatherReport>,
    /// Calendar module, T3 and up.
    pub calendar: Option<CalendarSnapshot>,
    /// Communications module, T3 and up.
    pub communications: Option<CommunicationsDelta>,
    /// Financial module, T4 only.
    pub financial: Option<FinancialSnapshot>,
}

// ---------------------------------------------------------------------------
// People, tools, memory
// ---------------------------------------------------------------------------

/// A contact the agent can discover via `get_contacts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Stable contact identifier.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Relationship to the person (e.g. `spouse`, `colleague`).
    pub relationship: String,
    /// Phone number.
    pub phone: String,
}

/// The simulated person the agent assists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Occupation.
    pub occupation: String,
    /// Home street address.
    pub home_address: String,
    /// Office street address.
    pub office_address: String,
    /// Birthday as a display string.
    pub birthday: String,
}

/// The agent's own identity as presented in its system prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Agent name.
    pub name: String,
    /// Personality description.
    pub personality: String,
}

/// A parameter on a tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name.
    pub name: String,
    /// JSON type label (`string`, `integer`, ...).
    #[serde(rename = "type")]
    pub param_type: String,
    /// Description shown to the agent.
    pub description: String,
    /// Whether the parameter is required.
    pub required: bool,
}

/// A tool as presented to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name. Flat snake_case for built-ins, `server.action` for
    /// external noise tools.
    pub name: String,
    /// Description shown to the agent.
    pub description: String,
    /// Parameter list.
    pub parameters: Vec<ToolParameter>,
}

/// One seeded memory file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFile {
    /// File stem; becomes `{key}.md` in the working memory directory.
    pub key: String,
    /// Free-form markdown content.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// A validated SHA-256 digest: exactly 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// The digest as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ScenarioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let valid = value.len() == 64
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if valid {
            Ok(Self(value))
        } else {
            Err(ScenarioError::Validation(format!(
                "content hash must be 64 lowercase hex characters, got {value:?}"
            )))
        }
    }
}

impl From<ContentHash> for String {
    fn from(value: ContentHash) -> Self {
        value.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integrity and provenance record for a generated package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioManifest {
    /// SHA-256 of the canonical serialization of the heartbeat list.
    pub content_hash: ContentHash,
    /// Version of the generator that produced the package.
    pub generator_version: String,
    /// Generation timestamp. Derived from the scenario date so identical
    /// inputs yield byte-identical manifests.
    pub generated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Scenario package
// ---------------------------------------------------------------------------

/// The complete scenario: everything the runtime needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPackage {
    /// Stable identifier, `{crisis_type}_{tier}_s{seed}`.
    pub scenario_id: String,
    /// Package schema version.
    pub version: String,
    /// Seed the generator was invoked with.
    pub seed: u64,
    /// The scripted emergency.
    pub crisis_type: CrisisType,
    /// Noise tier.
    pub noise_tier: NoiseTier,
    /// Index of the first heartbeat at which the crisis is visible.
    pub crisis_heartbeat_id: u32,
    /// The simulated person.
    pub person: PersonProfile,
    /// The person's contacts. Deliberately absent from the system prompt;
    /// the agent discovers them through `get_contacts`.
    pub contacts: Vec<Contact>,
    /// The agent's identity.
    pub agent_identity: AgentIdentity,
    /// The full heartbeat sequence in emission order.
    pub heartbeats: Vec<HeartbeatPayload>,
    /// Tools visible to the agent at this tier.
    pub tool_definitions: Vec<ToolDefinition>,
    /// Seed content for the working memory directory.
    pub memory_files: Vec<MemoryFile>,
    /// Persona document for the external user simulator.
    pub persona_document: String,
    /// Integrity manifest.
    pub manifest: ScenarioManifest,
}

impl ScenarioPackage {
    /// Check the package invariants.
    ///
    /// (a) `crisis_heartbeat_id` indexes into `heartbeats`; (b) wearable and
    /// location modules carry crisis values from that index onward when
    /// present; (c) the manifest hash matches the heartbeat list; (d)
    /// heartbeat ids are dense and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Validation`] or [`ScenarioError::HashMismatch`]
    /// on any violated invariant.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let crisis_idx = usize::try_from(self.crisis_heartbeat_id).unwrap_or(usize::MAX);
        if crisis_idx >= self.heartbeats.len() {
            return Err(ScenarioError::Validation(format!(
                "crisis_heartbeat_id {} out of range for {} heartbeats",
                self.crisis_heartbeat_id,
                self.heartbeats.len()
            )));
        }

        for (idx, hb) in self.heartbeats.iter().enumerate() {
            if usize::try_from(hb.heartbeat_id).ok() != Some(idx) {
                return Err(ScenarioError::Validation(format!(
                    "heartbeat at position {idx} carries id {}",
                    hb.heartbeat_id
                )));
            }
        }

        for hb in &self.heartbeats[crisis_idx..] {
            if let Some(w) = &hb.wearable {
                if w.heart_rate != 0 || w.blood_oxygen != 0 || w.steps != 0 {
                    return Err(ScenarioError::Validation(format!(
                        "heartbeat {} inside the crisis window carries non-crisis wearable values",
                        hb.heartbeat_id
                    )));
                }
            }
            if let Some(l) = &hb.location {
                if l.speed_mps != 0.0 {
                    return Err(ScenarioError::Validation(format!(
                        "heartbeat {} inside the crisis window carries non-zero speed",
                        hb.heartbeat_id
                    )));
                }
            }
        }

        let actual = content_hash(&self.heartbeats)?;
        if actual != self.manifest.content_hash.as_str() {
            return Err(ScenarioError::HashMismatch {
                expected: self.manifest.content_hash.to_string(),
                actual,
            });
        }

        Ok(())
    }
}
