//! Property-Based Tests for Conflict Resolution
//!
//! Generated collections use small value pools so that crops match, seasons
//! coincide and structural duplicates occur often.

use landcert_conflict::{pipeline, ConflictResolver};
use landcert_core::{RequestCode, ResolverConfig};
use landcert_test_utils::assertions::{assert_no_duplicates, assert_record_consistent};
use landcert_test_utils::{fixtures, generators, InMemoryRequestStore};
use proptest::prelude::*;
use std::sync::Arc;

fn full_scan() -> ResolverConfig {
    ResolverConfig {
        push_down_target_filter: false,
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every record satisfies the conflict invariants.
    #[test]
    fn prop_records_are_consistent(requests in generators::arb_request_collection(6)) {
        let offset = chrono::FixedOffset::east_opt(0).unwrap();
        for record in pipeline::run_all(&requests, &ResolverConfig::default()).unwrap() {
            assert_record_consistent(&record, offset);
        }
    }

    /// Pushing the target filter before the join never changes a record.
    #[test]
    fn prop_push_down_is_transparent(requests in generators::arb_request_collection(6)) {
        for request in &requests {
            let pushed = pipeline::run(&requests, &request.code, &ResolverConfig::default());
            let full = pipeline::run(&requests, &request.code, &full_scan());
            prop_assert_eq!(pushed.unwrap(), full.unwrap());
        }
    }

    /// The batch form and the single-target form agree.
    #[test]
    fn prop_run_all_matches_run(requests in generators::arb_request_collection(6)) {
        let config = ResolverConfig::default();
        let all = pipeline::run_all(&requests, &config).unwrap();

        for request in &requests {
            let single = pipeline::run(&requests, &request.code, &config).unwrap();
            let batched = all.iter().find(|r| r.code == request.code).cloned();
            prop_assert_eq!(single, batched);
        }
    }

    /// The store-backed resolver agrees with the pure pipeline.
    #[test]
    fn prop_resolver_matches_pipeline(requests in generators::arb_request_collection(5)) {
        let store = InMemoryRequestStore::from_requests(requests.clone()).unwrap();
        let resolver = ConflictResolver::new(Arc::new(store), ResolverConfig::default()).unwrap();

        for request in &requests {
            let expected = pipeline::run(&requests, &request.code, &full_scan()).unwrap();
            prop_assert_eq!(resolver.resolve_conflicts(&request.code).unwrap(), expected);
        }
    }

    /// Re-running produces byte-identical output.
    #[test]
    fn prop_rerun_is_idempotent(requests in generators::arb_request_collection(6)) {
        let config = ResolverConfig::default();
        let first = pipeline::run_all(&requests, &config).unwrap();
        let second = pipeline::run_all(&requests, &config).unwrap();
        let first = serde_json::to_string(&first).unwrap();
        let second = serde_json::to_string(&second).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Codes outside the collection never produce a record.
    #[test]
    fn prop_unknown_code_is_empty(
        requests in generators::arb_request_collection(4),
        code in generators::arb_request_code(),
    ) {
        let record = pipeline::run(&requests, &code, &ResolverConfig::default()).unwrap();
        prop_assert!(record.is_none());
    }

    /// Duplicated raw intersections never duplicate output entries.
    #[test]
    fn prop_duplicated_intersections_collapse(requests in generators::arb_request_collection(5)) {
        let doubled: Vec<_> = requests
            .iter()
            .cloned()
            .map(|mut request| {
                for polygon in &mut request.polygons {
                    let copy = polygon.intersections.clone();
                    polygon.intersections.extend(copy);
                }
                request
            })
            .collect();

        for request in &requests {
            let code: &RequestCode = &request.code;
            let once = pipeline::run(&requests, code, &ResolverConfig::default()).unwrap();
            let twice = pipeline::run(&doubled, code, &ResolverConfig::default()).unwrap();
            if let Some(record) = &twice {
                assert_no_duplicates(record);
            }
            prop_assert_eq!(
                once.map(|r| (r.land_codes().len(), r.intersections_data.len())),
                twice.map(|r| (r.land_codes().len(), r.intersections_data.len()))
            );
        }
    }
}

#[test]
fn fixture_pool_codes_match_generators() {
    assert_eq!(fixtures::pooled_code(3), "R3");
}
