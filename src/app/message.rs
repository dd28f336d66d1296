//! Telemetry message encoding.
//!
//! Wire shape (JSON object, every value a string):
//!
//! ```text
//! {"sensor_id":"temperature","value":"12","timestamp":"1700000000"}
//! ```
//!
//! `sensor_id` carries the configured sensor *label*, not a per-device
//! identifier; existing subscribers key on this exact shape.

use serde::{Deserialize, Serialize};

/// The structured record published once per sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub sensor_id: String,
    pub value: String,
    pub timestamp: String,
}

impl TelemetryRecord {
    pub fn new(label: &str, celsius: f64, epoch_secs: u64) -> Self {
        Self {
            sensor_id: label.to_owned(),
            value: (celsius.trunc() as i64).to_string(),
            timestamp: epoch_secs.to_string(),
        }
    }
}

/// Serialise a record for `label` to the transport payload.
pub fn encode(label: &str, celsius: f64, epoch_secs: u64) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&TelemetryRecord::new(label, celsius, epoch_secs))
}

/// Parse a payload produced by [`encode`].
pub fn decode(payload: &[u8]) -> Result<TelemetryRecord, serde_json::Error> {
    serde_json::from_slice(payload)
}
