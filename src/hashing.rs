//! Hashing - SHA-256 Digests for Submissions
//!
//! Identical input always yields the identical digest, so handlers can
//! correlate log lines and spot double submissions.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::Value;

use crate::values::FormValues;

/// Hex-encoded SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Canonical JSON: object keys sorted at every depth, no whitespace
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sorted(serde_json::to_value(value)?))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// payload_digest = sha256(form_id + ":" + canonical_values)
///
/// Choice sets keep their selection order, so the same options picked in
/// a different order digest differently.
pub fn payload_digest(form_id: &str, values: &FormValues) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(values)?;
    Ok(sha256_hex(format!("{}:{}", form_id, canonical).as_bytes()))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
