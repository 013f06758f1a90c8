//! Fuzz test for canonical geometry payloads
//!
//! Feeds arbitrary JSON into `GeoPayload` and checks that:
//! - canonicalization never panics
//! - the canonical form is itself valid JSON
//! - canonicalizing the canonical form is a fixed point
//!
//! Run with: cargo +nightly fuzz run canonical_fuzz -- -max_total_time=60

#![no_main]

use landcert_core::{canonical_json, GeoPayload};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let payload = GeoPayload::new(value);

    let reparsed: serde_json::Value = serde_json::from_str(payload.canonical())
        .expect("canonical form must be valid JSON");
    assert_eq!(
        canonical_json(&reparsed),
        payload.canonical(),
        "canonical form must be a fixed point"
    );
    assert_eq!(GeoPayload::new(reparsed), payload);
});
