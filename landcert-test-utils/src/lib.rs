//! LANDCERT Test Utilities
//!
//! Centralized test infrastructure for the LANDCERT workspace:
//! - Proptest generators for land requests and whole collections
//! - Test fixtures for common conflict scenarios
//! - Custom assertions for conflict records

pub use landcert_storage::InMemoryRequestStore;

pub use landcert_core::{
    Area, ConfigError, ConflictRecord, CropId, Farm, GeoPayload, Intersection, LandCertError,
    LandCertResult, LandRequest, PipelineError, Polygon, RequestCode, ResolverConfig, Season,
    StorageError, Timestamp,
};

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for LANDCERT entity types.
    //!
    //! Value pools are deliberately small so that generated collections
    //! contain matching crops, equal seasons and structural duplicates.

    use super::*;
    use proptest::prelude::*;

    /// Generate a request code such as `K2024`.
    pub fn arb_request_code() -> impl Strategy<Value = RequestCode> {
        "[A-Z][0-9]{4}".prop_map(RequestCode::new)
    }

    /// One of the fixture crops.
    pub fn arb_crop() -> impl Strategy<Value = CropId> {
        prop_oneof![Just(fixtures::wheat()), Just(fixtures::maize())]
    }

    /// Generate a timestamp inside the 2023 or 2024 season (UTC).
    pub fn arb_season_timestamp() -> impl Strategy<Value = Timestamp> {
        (2023i32..=2024, 0i64..300 * 24).prop_map(|(year, hours)| {
            fixtures::season_start(year) + Duration::hours(hours)
        })
    }

    pub fn arb_area() -> impl Strategy<Value = Area> {
        prop_oneof![
            Just(Area::new(120.5)),
            Just(Area::new(40.0)),
            (1u32..1000).prop_map(|n| Area::new(f64::from(n) / 4.0)),
        ]
    }

    /// Generate a small polygon payload. Some points are written as floats
    /// so structurally equal payloads differ in their raw JSON.
    pub fn arb_geo_payload() -> impl Strategy<Value = GeoPayload> {
        prop::collection::vec((0i64..3, 0i64..3, any::<bool>()), 1..3).prop_map(|points| {
            let ring: Vec<_> = points
                .iter()
                .map(|&(x, y, as_float)| {
                    if as_float {
                        json!([x as f64, y as f64])
                    } else {
                        json!([x, y])
                    }
                })
                .collect();
            GeoPayload::new(json!({"type": "Polygon", "coordinates": [ring]}))
        })
    }

    /// Generate an intersection pointing at one of `R0..R{pool}`.
    pub fn arb_intersection(pool: usize) -> impl Strategy<Value = Intersection> {
        (0..pool, arb_area(), arb_geo_payload(), arb_geo_payload()).prop_map(
            |(index, area, piece, coords)| Intersection {
                land_intersects_with: fixtures::pooled_code(index),
                area_of_intersection: area,
                piece_intersected: piece,
                intersection_coords: coords,
            },
        )
    }

    pub fn arb_polygon(
        code: RequestCode,
        farm_name: String,
        pool: usize,
    ) -> impl Strategy<Value = Polygon> {
        (arb_geo_payload(), prop::collection::vec(arb_intersection(pool), 0..4)).prop_map(
            move |(point, intersections)| Polygon {
                code: code.clone(),
                point,
                farm_name: farm_name.clone(),
                intersections,
            },
        )
    }

    /// Generate a request with the given code whose intersections point into
    /// a pool of `pool` codes.
    pub fn arb_land_request(code: RequestCode, pool: usize) -> impl Strategy<Value = LandRequest> {
        let farm_name = format!("farm-{}", code);
        (
            arb_crop(),
            arb_season_timestamp(),
            prop::collection::vec(arb_polygon(code.clone(), farm_name.clone(), pool), 0..3),
        )
            .prop_map(move |(crop, gpx_timestamp, polygons)| LandRequest {
                code: code.clone(),
                crop,
                farm: Farm {
                    name: farm_name.clone(),
                },
                gpx_timestamp,
                polygons,
            })
    }

    /// Generate a collection with unique codes `R0..R{n}`.
    ///
    /// Intersections may point at `R{n}`, which never exists, so dangling
    /// references are covered too.
    pub fn arb_request_collection(max_requests: usize) -> impl Strategy<Value = Vec<LandRequest>> {
        (1..=max_requests.max(1))
            .prop_flat_map(|n| {
                prop::collection::vec(arb_land_request(RequestCode::new("R?"), n + 1), n)
            })
            .prop_map(|requests| {
                requests
                    .into_iter()
                    .enumerate()
                    .map(|(index, request)| {
                        fixtures::relabel(request, fixtures::pooled_code(index))
                    })
                    .collect::<Vec<_>>()
            })
    }

    /// Generate a valid ResolverConfig.
    pub fn arb_valid_config() -> impl Strategy<Value = ResolverConfig> {
        (
            -landcert_core::MAX_UTC_OFFSET_MINUTES..=landcert_core::MAX_UTC_OFFSET_MINUTES,
            1u64..120_000,
            any::<bool>(),
        )
            .prop_map(
                |(season_utc_offset_minutes, resolve_timeout_ms, push_down_target_filter)| {
                    ResolverConfig {
                        season_utc_offset_minutes,
                        resolve_timeout_ms,
                        push_down_target_filter,
                    }
                },
            )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built land requests and collections for common scenarios.

    use super::*;

    /// Catalogue id in object-id form.
    pub fn wheat() -> CropId {
        CropId::new("65f1c2a9e4b0a1b2c3d4e5f6")
    }

    /// Catalogue id in UUID form.
    pub fn maize() -> CropId {
        CropId::new(Uuid::from_u128(0x4d41_495a_45).to_string())
    }

    /// First instant of `year` in UTC.
    pub fn season_start(year: i32) -> Timestamp {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// A mid-season timestamp for `year`.
    pub fn in_season(year: i32) -> Timestamp {
        Utc.with_ymd_and_hms(year, 5, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Code `R{index}`, as used by the generators.
    pub fn pooled_code(index: usize) -> RequestCode {
        RequestCode::new(format!("R{}", index))
    }

    /// Move `request` and its polygons to `code`.
    pub fn relabel(mut request: LandRequest, code: RequestCode) -> LandRequest {
        let farm_name = format!("farm-{}", code);
        for polygon in &mut request.polygons {
            polygon.code = code.clone();
            polygon.farm_name = farm_name.clone();
        }
        request.farm.name = farm_name;
        request.code = code;
        request
    }

    /// A square polygon payload anchored at (`x`, `y`).
    pub fn square(x: i64, y: i64) -> GeoPayload {
        GeoPayload::new(json!({
            "type": "Polygon",
            "coordinates": [[[x, y], [x + 1, y], [x + 1, y + 1], [x, y + 1], [x, y]]]
        }))
    }

    /// An intersection with `with`, geometry derived from the code and area.
    pub fn intersection(with: &str, area: f64) -> Intersection {
        Intersection {
            land_intersects_with: RequestCode::new(with),
            area_of_intersection: Area::new(area),
            piece_intersected: GeoPayload::new(json!({"type": "Polygon", "piece": with})),
            intersection_coords: GeoPayload::new(json!([[area, 0.0], [0.0, area]])),
        }
    }

    /// Builder for land requests.
    ///
    /// Defaults: wheat, 2024 season, farm `farm-<code>`, no polygons.
    /// `intersects` appends to the last polygon, creating one if needed.
    #[derive(Debug, Clone)]
    pub struct LandRequestBuilder {
        request: LandRequest,
    }

    impl LandRequestBuilder {
        pub fn new(code: &str) -> Self {
            Self {
                request: LandRequest {
                    code: RequestCode::new(code),
                    crop: wheat(),
                    farm: Farm {
                        name: format!("farm-{}", code),
                    },
                    gpx_timestamp: in_season(2024),
                    polygons: Vec::new(),
                },
            }
        }

        pub fn crop(mut self, crop: CropId) -> Self {
            self.request.crop = crop;
            self
        }

        pub fn farm(mut self, name: &str) -> Self {
            self.request.farm.name = name.to_string();
            for polygon in &mut self.request.polygons {
                polygon.farm_name = name.to_string();
            }
            self
        }

        pub fn season(self, year: i32) -> Self {
            self.timestamp(in_season(year))
        }

        pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
            self.request.gpx_timestamp = timestamp;
            self
        }

        /// Start a new polygon with the given raw geometry.
        pub fn polygon(mut self, point: serde_json::Value) -> Self {
            self.request.polygons.push(Polygon {
                code: self.request.code.clone(),
                point: GeoPayload::new(point),
                farm_name: self.request.farm.name.clone(),
                intersections: Vec::new(),
            });
            self
        }

        pub fn intersects(self, with: &str, area: f64) -> Self {
            self.with_intersection(intersection(with, area))
        }

        pub fn with_intersection(mut self, intersection: Intersection) -> Self {
            if self.request.polygons.is_empty() {
                let point = json!({"type": "Polygon", "owner": self.request.code.as_str()});
                self = self.polygon(point);
            }
            if let Some(polygon) = self.request.polygons.last_mut() {
                polygon.intersections.push(intersection);
            }
            self
        }

        pub fn build(self) -> LandRequest {
            self.request
        }
    }

    /// `A2024` (wheat, 2024) overlaps `B2024` (wheat, 2024, 120.5) and
    /// `C2023` (wheat, 2023). Only B conflicts with A.
    pub fn worked_example() -> Vec<LandRequest> {
        vec![
            LandRequestBuilder::new("A2024")
                .polygon(square(0, 0).into_value())
                .intersects("B2024", 120.5)
                .intersects("C2023", 40.0)
                .build(),
            LandRequestBuilder::new("B2024")
                .polygon(square(1, 0).into_value())
                .intersects("A2024", 120.5)
                .build(),
            LandRequestBuilder::new("C2023")
                .season(2023)
                .polygon(square(0, 1).into_value())
                .intersects("A2024", 40.0)
                .build(),
        ]
    }

    /// A busier field: crop and season mismatches, duplicate raw
    /// intersections, a request with two conflicting polygons, a
    /// self-intersection and a dangling reference.
    pub fn crowded_field() -> Vec<LandRequest> {
        vec![
            LandRequestBuilder::new("F1")
                .polygon(square(0, 0).into_value())
                .intersects("F2", 10.0)
                .intersects("F2", 10.0)
                .intersects("F3", 5.0)
                .polygon(square(5, 5).into_value())
                .intersects("F4", 7.5)
                .intersects("GONE", 1.0)
                .build(),
            LandRequestBuilder::new("F2")
                .farm("Hillside")
                .polygon(square(1, 0).into_value())
                .intersects("F1", 10.0)
                .build(),
            LandRequestBuilder::new("F3")
                .crop(maize())
                .polygon(square(0, 1).into_value())
                .intersects("F1", 5.0)
                .build(),
            LandRequestBuilder::new("F4")
                .polygon(square(5, 6).into_value())
                .intersects("F1", 7.5)
                .intersects("F4", 2.0)
                .build(),
            LandRequestBuilder::new("F5")
                .season(2023)
                .polygon(square(9, 9).into_value())
                .intersects("F1", 3.0)
                .build(),
            LandRequestBuilder::new("F6").polygon(square(20, 20).into_value()).build(),
        ]
    }

    /// In-memory store seeded with `requests`.
    pub fn store(requests: Vec<LandRequest>) -> LandCertResult<InMemoryRequestStore> {
        InMemoryRequestStore::from_requests(requests)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion functions for LANDCERT-specific validation.

    use super::*;
    use chrono::FixedOffset;
    use std::collections::HashSet;

    /// Assert that a LandCertResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &LandCertResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a LandCertResult is a timeout for `code`.
    #[track_caller]
    pub fn assert_timed_out<T: std::fmt::Debug>(result: &LandCertResult<T>, code: &str) {
        match result {
            Err(LandCertError::Pipeline(PipelineError::TimedOut { code: c, .. })) => {
                assert_eq!(c.as_str(), code, "Wrong code in TimedOut error");
            }
            other => panic!("Expected TimedOut for {}, got: {:?}", code, other),
        }
    }

    /// Assert the lands of `record`, in order, by code.
    #[track_caller]
    pub fn assert_lands(record: &ConflictRecord, expected: &[&str]) {
        let codes: Vec<&str> = record.lands.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, expected, "Unexpected lands in record {}", record.code);
    }

    /// Assert that neither list of `record` holds structural duplicates.
    #[track_caller]
    pub fn assert_no_duplicates(record: &ConflictRecord) {
        let mut lands = HashSet::new();
        for land in &record.lands {
            assert!(lands.insert(land), "Duplicate land {} in record {}", land.code, record.code);
        }
        let mut details = HashSet::new();
        for detail in &record.intersections_data {
            assert!(
                details.insert(detail),
                "Duplicate detail with {} in record {}",
                detail.land_intersects_with,
                record.code
            );
        }
    }

    /// Assert the invariants every record satisfies: the original comes
    /// first, every other land shares its crop and season, and every detail
    /// names a land in the record.
    #[track_caller]
    pub fn assert_record_consistent(record: &ConflictRecord, offset: FixedOffset) {
        assert_no_duplicates(record);
        let Some(original) = record.lands.first() else {
            panic!("Record {} has no lands", record.code);
        };
        assert_eq!(original.code, record.code, "Original must come first");
        let season = Season::from_timestamp(&original.gpx_timestamp, offset);

        for land in record.conflicting_lands() {
            assert_eq!(land.crop, original.crop, "Crop mismatch for {}", land.code);
            assert_eq!(
                Season::from_timestamp(&land.gpx_timestamp, offset),
                season,
                "Season mismatch for {}",
                land.code
            );
        }

        let codes: HashSet<&RequestCode> = record.lands.iter().map(|l| &l.code).collect();
        for detail in &record.intersections_data {
            assert!(
                codes.contains(&detail.land_intersects_with),
                "Detail points at {} which is not in the record",
                detail.land_intersects_with
            );
        }
    }

    /// Assert that a ResolverConfig is valid.
    #[track_caller]
    pub fn assert_config_valid(config: &ResolverConfig) {
        if let Err(e) = config.validate() {
            panic!("Config validation failed: {:?}", e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
