//! Crisis enforcement pass.
//!
//! The module generators already encode their own crisis behaviour; this
//! pass is a narrow defensive overlay that runs after generation and before
//! packaging. It asserts the core invariants, heart rate, blood oxygen,
//! and steps zero on the wearable; speed zero on the location, from the
//! crisis heartbeat onward, and fails loudly if a required module is absent
//! in the crisis window, which indicates an upstream pipeline bug. It never
//! rewrites realism fields (GPS drift, heading, altitude, accuracy, the
//! skin-temperature curve, the frozen body battery). Applying it twice
//! yields the same heartbeats.

use tracing::debug;

use super::GeneratorError;
use crate::scenario::types::HeartbeatPayload;

/// Overlay crisis invariants on `heartbeats` from `crisis_heartbeat_id` on.
///
/// # Errors
///
/// Returns [`GeneratorError::Enforcement`] if the crisis index is out of
/// range or a wearable/location module is missing inside the crisis window.
pub fn enforce(
    heartbeats: &mut [HeartbeatPayload],
    crisis_heartbeat_id: u32,
) -> Result<(), GeneratorError> {
    let start = usize::try_from(crisis_heartbeat_id).unwrap_or(usize::MAX);
    if start >= heartbeats.len() {
        return Err(GeneratorError::Enforcement(format!(
            "crisis heartbeat {crisis_heartbeat_id} out of range for {} heartbeats",
            heartbeats.len()
        )));
    }

    for hb in &mut heartbeats[start..] {
        let wearable = hb.wearable.as_mut().ok_or_else(|| {
            GeneratorError::Enforcement(format!(
                "wearable module missing at heartbeat {} inside the crisis window",
                hb.heartbeat_id
            ))
        })?;
        wearable.heart_rate = 0;
        wearable.blood_oxygen = 0;
        wearable.steps = 0;
        wearable.respiratory_rate = 0;

        let location = hb.location.as_mut().ok_or_else(|| {
            GeneratorError::Enforcement(format!(
                "location module missing at heartbeat {} inside the crisis window",
                hb.heartbeat_id
            ))
        })?;
        location.speed_mps = 0.0;
    }

    debug!(
        crisis_heartbeat_id,
        enforced = heartbeats.len().saturating_sub(start),
        "crisis invariants enforced"
    );
    Ok(())
}
