//! Stage 5: group conflicts and deduplicate by structural equality.
//!
//! This is the only stage holding state. Memory grows with the number of
//! distinct groups among conflicting pairs, not with raw intersections.

use crate::season::SeasonedPair;
use landcert_core::{GeoPayload, Intersection, IntersectionDetail, LandRequest, RequestCode};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

// ============================================================================
// ORDERED SET
// ============================================================================

/// Set that remembers first-insertion order, so output is deterministic.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T: Eq + Hash + Copy> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item`; returns false when an equal item is already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.seen.insert(item) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Eq + Hash + Copy> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T: Eq + Hash + Copy> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

// ============================================================================
// GROUP KEY AND DETAIL VIEW
// ============================================================================

/// Composite grouping key. References hash and compare by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupKey<'a> {
    pub code: &'a RequestCode,
    pub original_piece: &'a GeoPayload,
    pub original_land: &'a LandRequest,
}

/// Borrowed intersection detail with the intersected farm's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetailRef<'a> {
    pub farm_name: &'a str,
    pub original_piece: &'a GeoPayload,
    pub intersection: &'a Intersection,
}

impl DetailRef<'_> {
    pub fn to_detail(&self) -> IntersectionDetail {
        IntersectionDetail {
            farm_name: self.farm_name.to_string(),
            area_of_intersection: self.intersection.area_of_intersection,
            original_piece: self.original_piece.clone(),
            land_intersects_with: self.intersection.land_intersects_with.clone(),
            intersection_coords: self.intersection.intersection_coords.clone(),
            piece_intersected: self.intersection.piece_intersected.clone(),
        }
    }
}

// ============================================================================
// GROUPS
// ============================================================================

/// Accumulated state for one group key.
#[derive(Debug, Clone)]
pub struct ConflictGroup<'a> {
    pub key: GroupKey<'a>,
    /// Distinct intersected requests.
    pub lands: OrderedSet<&'a LandRequest>,
    /// Distinct details, farm name rewritten to the intersected farm.
    pub intersections_data: OrderedSet<DetailRef<'a>>,
    /// The original request (a singleton by construction of the key).
    pub original: OrderedSet<&'a LandRequest>,
}

impl<'a> ConflictGroup<'a> {
    fn new(key: GroupKey<'a>) -> Self {
        Self {
            key,
            lands: OrderedSet::new(),
            intersections_data: OrderedSet::new(),
            original: OrderedSet::new(),
        }
    }

    fn accumulate(&mut self, pair: &SeasonedPair<'a>) {
        self.lands.insert(pair.pair.intersected_land);
        self.intersections_data.insert(DetailRef {
            farm_name: pair.intersected_farm_name,
            original_piece: pair.pair.flat.original_piece,
            intersection: pair.pair.flat.intersection,
        });
        self.original.insert(pair.pair.original_land);
    }

    pub fn code(&self) -> &'a RequestCode {
        self.key.code
    }
}

/// All groups, in order of first appearance.
#[derive(Debug, Default)]
pub struct ConflictGroups<'a> {
    groups: Vec<ConflictGroup<'a>>,
    by_key: HashMap<GroupKey<'a>, usize>,
}

impl<'a> ConflictGroups<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one conflicting pair into its group.
    pub fn accumulate(&mut self, pair: SeasonedPair<'a>) {
        let key = GroupKey {
            code: pair.pair.flat.code,
            original_piece: pair.pair.flat.original_piece,
            original_land: pair.pair.original_land,
        };
        let next = self.groups.len();
        let index = *self.by_key.entry(key).or_insert(next);
        if index == next {
            self.groups.push(ConflictGroup::new(key));
        }
        self.groups[index].accumulate(&pair);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConflictGroup<'a>> {
        self.groups.iter()
    }
}

impl<'a> Extend<SeasonedPair<'a>> for ConflictGroups<'a> {
    fn extend<I: IntoIterator<Item = SeasonedPair<'a>>>(&mut self, iter: I) {
        for pair in iter {
            self.accumulate(pair);
        }
    }
}

/// Group a stream of conflicting pairs.
pub fn group<'a, I>(pairs: I) -> ConflictGroups<'a>
where
    I: IntoIterator<Item = SeasonedPair<'a>>,
{
    let mut groups = ConflictGroups::new();
    groups.extend(pairs);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::FlatIntersection;
    use crate::join::ResolvedPair;
    use chrono::{TimeZone, Utc};
    use landcert_core::{Area, CropId, Farm, Season};
    use serde_json::json;

    fn land(code: &str, farm: &str) -> LandRequest {
        LandRequest {
            code: RequestCode::new(code),
            crop: CropId::new("wheat"),
            farm: Farm {
                name: farm.to_string(),
            },
            gpx_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            polygons: vec![],
        }
    }

    fn intersection(with: &str, area: f64) -> Intersection {
        Intersection {
            land_intersects_with: RequestCode::new(with),
            area_of_intersection: Area::new(area),
            piece_intersected: GeoPayload::new(json!({"piece": with})),
            intersection_coords: GeoPayload::new(json!([[area, area]])),
        }
    }

    fn seasoned<'a>(
        original: &'a LandRequest,
        point: &'a GeoPayload,
        intersection: &'a Intersection,
        other: &'a LandRequest,
    ) -> SeasonedPair<'a> {
        SeasonedPair {
            pair: ResolvedPair {
                flat: FlatIntersection {
                    code: &original.code,
                    farm_name: &original.farm.name,
                    original_piece: point,
                    intersection,
                },
                original_land: original,
                intersected_land: other,
            },
            original_crop: &original.crop,
            intersected_crop: &other.crop,
            original_season: Season::new(2024),
            intersected_season: Season::new(2024),
            intersected_farm_name: &other.farm.name,
        }
    }

    #[test]
    fn test_ordered_set_keeps_first_insertion_order() {
        let mut set = OrderedSet::new();
        assert!(set.insert(3));
        assert!(set.insert(1));
        assert!(!set.insert(3));
        assert!(set.insert(2));
        assert_eq!(set.into_vec(), vec![3, 1, 2]);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let a = land("A", "North");
        let b = land("B", "South");
        let point = GeoPayload::new(json!([1]));
        let first = intersection("B", 120.5);
        let copy = intersection("B", 120.5);

        let groups = group(vec![
            seasoned(&a, &point, &first, &b),
            seasoned(&a, &point, &copy, &b),
        ]);

        assert_eq!(groups.len(), 1);
        let g = groups.iter().next().unwrap();
        assert_eq!(g.lands.len(), 1);
        assert_eq!(g.intersections_data.len(), 1);
        assert_eq!(g.original.len(), 1);
    }

    #[test]
    fn test_detail_reports_intersected_farm_name() {
        let a = land("A", "North");
        let b = land("B", "South");
        let point = GeoPayload::new(json!([1]));
        let i = intersection("B", 7.0);

        let groups = group(vec![seasoned(&a, &point, &i, &b)]);
        let first = groups.iter().next().unwrap();
        let detail = first.intersections_data.iter().next().unwrap().to_detail();

        assert_eq!(detail.farm_name, "South");
        assert_eq!(detail.land_intersects_with, "B");
        assert_eq!(detail.area_of_intersection, Area::new(7.0));
        assert_eq!(detail.original_piece, point);
    }

    #[test]
    fn test_different_polygons_form_different_groups() {
        let a = land("A", "North");
        let b = land("B", "South");
        let c = land("C", "East");
        let p1 = GeoPayload::new(json!([1]));
        let p2 = GeoPayload::new(json!([2]));
        let ib = intersection("B", 1.0);
        let ic = intersection("C", 2.0);

        let groups = group(vec![seasoned(&a, &p1, &ib, &b), seasoned(&a, &p2, &ic, &c)]);

        assert_eq!(groups.len(), 2);
        let codes: Vec<_> = groups.iter().map(|g| g.code().as_str()).collect();
        assert_eq!(codes, vec!["A", "A"]);
    }

    #[test]
    fn test_structurally_equal_polygons_share_a_group() {
        let a = land("A", "North");
        let b = land("B", "South");
        let c = land("C", "East");
        let p1 = GeoPayload::new(json!({"x": 1, "y": 2}));
        let p1_reordered = GeoPayload::new(json!({"y": 2.0, "x": 1}));
        let ib = intersection("B", 1.0);
        let ic = intersection("C", 2.0);

        let groups = group(vec![
            seasoned(&a, &p1, &ib, &b),
            seasoned(&a, &p1_reordered, &ic, &c),
        ]);

        assert_eq!(groups.len(), 1);
        let g = groups.iter().next().unwrap();
        let lands: Vec<_> = g.lands.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(lands, vec!["B", "C"]);
        assert_eq!(g.intersections_data.len(), 2);
    }

    #[test]
    fn test_distinct_areas_are_distinct_details() {
        let a = land("A", "North");
        let b = land("B", "South");
        let point = GeoPayload::new(json!([1]));
        let small = intersection("B", 1.0);
        let large = intersection("B", 2.0);

        let groups = group(vec![
            seasoned(&a, &point, &small, &b),
            seasoned(&a, &point, &large, &b),
        ]);

        let g = groups.iter().next().unwrap();
        assert_eq!(g.lands.len(), 1);
        assert_eq!(g.intersections_data.len(), 2);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// An ordered set holds each distinct value once, in first-seen order.
        #[test]
        fn prop_ordered_set_matches_first_occurrences(
            values in prop::collection::vec(0u8..16, 0..64)
        ) {
            let set: OrderedSet<u8> = values.iter().copied().collect();

            let mut expected = Vec::new();
            for v in &values {
                if !expected.contains(v) {
                    expected.push(*v);
                }
            }

            prop_assert_eq!(set.len(), expected.len());
            prop_assert_eq!(set.into_vec(), expected);
        }
    }
}
