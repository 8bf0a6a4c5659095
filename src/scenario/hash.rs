//! Canonical JSON serialization and the scenario content hash.
//!
//! The canonical form is what the manifest hash is computed over and what
//! the package writer puts on disk: object keys sorted lexicographically,
//! no insignificant whitespace, no trailing newline, UTF-8. Key ordering is
//! enforced here rather than relying on map-implementation details so the
//! bytes stay stable regardless of serde_json feature flags.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::ScenarioError;

/// Serialize a value to its canonical JSON string.
///
/// # Errors
///
/// Returns [`ScenarioError::Serialize`] if the value cannot be represented
/// as JSON.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, ScenarioError> {
    let tree = serde_json::to_value(value)?;
    let mut out = String::new();
    write_canonical(&tree, &mut out)?;
    Ok(out)
}

/// SHA-256 of the canonical JSON serialization, as lowercase hex.
///
/// # Errors
///
/// Returns [`ScenarioError::Serialize`] if the value cannot be serialized.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String, ScenarioError> {
    let canonical = canonical_json(value)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// SHA-256 of raw bytes, as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Recursively write a JSON value with sorted object keys.
///
/// Scalar leaves are delegated to serde_json so number formatting matches
/// its output exactly.
fn write_canonical(value: &Value, out: &mut String) -> Result<(), ScenarioError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                if let Some(child) = map.get(*key) {
                    write_canonical(child, out)?;
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}
