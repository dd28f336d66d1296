//! Fuzz target: `message::decode`
//!
//! Arbitrary payloads must either be rejected or re-encode to a record
//! that decodes to the same value.
//!
//! cargo fuzz run fuzz_telemetry_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermolink::app::message;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = message::decode(data) {
        let bytes = serde_json::to_vec(&record).unwrap();
        assert_eq!(message::decode(&bytes).unwrap(), record);
    }
});
