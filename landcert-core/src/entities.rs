//! Core entity structures

use crate::{Area, CropId, GeoPayload, RequestCode, Timestamp};
use serde::{Deserialize, Serialize};

/// Farm information attached to a land request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Farm {
    pub name: String,
}

/// Land request - one submitted parcel awaiting certification.
/// Read-only for conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandRequest {
    pub code: RequestCode,
    pub crop: CropId,
    pub farm: Farm,
    /// Survey timestamp; its calendar year is the growing season.
    pub gpx_timestamp: Timestamp,
    #[serde(default)]
    pub polygons: Vec<Polygon>,
}

/// Surveyed polygon owned by a land request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    /// Same as the owning request's code.
    pub code: RequestCode,
    /// Original piece geometry.
    pub point: GeoPayload,
    pub farm_name: String,
    #[serde(default)]
    pub intersections: Vec<Intersection>,
}

/// Precomputed overlap from the owning polygon to another request's parcel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    pub land_intersects_with: RequestCode,
    pub area_of_intersection: Area,
    pub piece_intersected: GeoPayload,
    pub intersection_coords: GeoPayload,
}

/// Intersection details as reported in a conflict record.
/// `farm_name` is the farm of the *intersected* parcel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionDetail {
    pub farm_name: String,
    pub area_of_intersection: Area,
    pub original_piece: GeoPayload,
    pub land_intersects_with: RequestCode,
    pub intersection_coords: GeoPayload,
    pub piece_intersected: GeoPayload,
}

/// Conflict report for one request code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    pub code: RequestCode,
    /// The original request first, then every distinct conflicting request.
    pub lands: Vec<LandRequest>,
    pub intersections_data: Vec<IntersectionDetail>,
}

impl ConflictRecord {
    /// Codes of all lands in report order.
    pub fn land_codes(&self) -> Vec<&RequestCode> {
        self.lands.iter().map(|l| &l.code).collect()
    }

    /// Conflicting requests, excluding the original.
    pub fn conflicting_lands(&self) -> impl Iterator<Item = &LandRequest> {
        self.lands.iter().filter(move |l| l.code != self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_land_request_deserializes_camel_case() {
        let raw = json!({
            "code": "A2024",
            "crop": "6f1b2a3c-0000-4000-8000-000000000001",
            "farm": { "name": "North Farm" },
            "gpxTimestamp": "2024-04-01T08:00:00Z",
            "polygons": [{
                "code": "A2024",
                "point": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] },
                "farmName": "North Farm",
                "intersections": [{
                    "landIntersectsWith": "B2024",
                    "areaOfIntersection": 120.5,
                    "pieceIntersected": { "type": "Polygon" },
                    "intersectionCoords": [[0.5, 0.5]]
                }]
            }]
        });

        let land: LandRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(land.code, "A2024");
        assert_eq!(land.farm.name, "North Farm");
        assert_eq!(land.gpx_timestamp, Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap());
        assert_eq!(land.polygons[0].intersections.len(), 1);
        let intersection = &land.polygons[0].intersections[0];
        assert_eq!(intersection.land_intersects_with, "B2024");
        assert_eq!(intersection.area_of_intersection, Area::new(120.5));
    }

    #[test]
    fn test_land_request_accepts_object_id_crop() {
        let raw = json!({
            "code": "A2024",
            "crop": "65f1c2a9e4b0a1b2c3d4e5f6",
            "farm": { "name": "North Farm" },
            "gpxTimestamp": "2024-04-01T08:00:00Z"
        });

        let land: LandRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(land.crop.as_str(), "65f1c2a9e4b0a1b2c3d4e5f6");
        assert_eq!(serde_json::to_value(&land).unwrap()["crop"], "65f1c2a9e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_missing_polygons_default_to_empty() {
        let raw = json!({
            "code": "Z1",
            "crop": "6f1b2a3c-0000-4000-8000-000000000001",
            "farm": { "name": "Z" },
            "gpxTimestamp": "2023-01-01T00:00:00Z"
        });
        let land: LandRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(land.crop, CropId::new("6f1b2a3c-0000-4000-8000-000000000001"));
        assert!(land.polygons.is_empty());
    }

    #[test]
    fn test_conflict_record_serializes_intersections_data() {
        let record = ConflictRecord {
            code: RequestCode::new("A"),
            lands: vec![],
            intersections_data: vec![],
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("intersectionsData").is_some());
        assert_eq!(value["code"], "A");
    }
}
