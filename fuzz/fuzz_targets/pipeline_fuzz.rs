//! Fuzz test for the conflict pipeline
//!
//! Decodes arbitrary bytes as a request collection and runs every code
//! through the pipeline. Malformed input must be rejected by the decoder,
//! never by a panic further down.
//!
//! Run with: cargo +nightly fuzz run pipeline_fuzz -- -max_total_time=60

#![no_main]

use landcert_conflict::pipeline;
use landcert_core::{LandRequest, ResolverConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(requests) = serde_json::from_slice::<Vec<LandRequest>>(data) else {
        return;
    };
    let config = ResolverConfig::default();

    let all = pipeline::run_all(&requests, &config).expect("default config is valid");
    for request in &requests {
        let single =
            pipeline::run(&requests, &request.code, &config).expect("default config is valid");
        if let Some(record) = &single {
            assert_eq!(record.code, request.code);
            assert!(all.iter().any(|r| r.code == record.code));
        }
    }
});
