//! Stage 1: expand polygon intersections into flat records.

use landcert_core::{GeoPayload, Intersection, LandRequest, RequestCode};

/// One (polygon, intersection entry) pair, borrowed from its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlatIntersection<'a> {
    /// Code carried by the polygon.
    pub code: &'a RequestCode,
    /// Farm name carried by the polygon.
    pub farm_name: &'a str,
    /// The polygon's own geometry.
    pub original_piece: &'a GeoPayload,
    pub intersection: &'a Intersection,
}

/// Lazily yield one flat record per intersection entry of every polygon.
/// Polygons without intersections contribute nothing.
pub fn flatten(request: &LandRequest) -> impl Iterator<Item = FlatIntersection<'_>> {
    request.polygons.iter().flat_map(|polygon| {
        polygon
            .intersections
            .iter()
            .map(move |intersection| FlatIntersection {
                code: &polygon.code,
                farm_name: &polygon.farm_name,
                original_piece: &polygon.point,
                intersection,
            })
    })
}
