//! Stage 3: derive seasons and copy the fields the filter and grouper need.

use crate::join::ResolvedPair;
use chrono::FixedOffset;
use landcert_core::{CropId, Season};

/// A resolved pair annotated with crop and season on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonedPair<'a> {
    pub pair: ResolvedPair<'a>,
    pub original_crop: &'a CropId,
    pub intersected_crop: &'a CropId,
    pub original_season: Season,
    pub intersected_season: Season,
    /// Farm name of the intersected request.
    pub intersected_farm_name: &'a str,
}

/// Annotate `pair`. Seasons are calendar years at `offset` (UTC when zero).
pub fn extract_season(pair: ResolvedPair<'_>, offset: FixedOffset) -> SeasonedPair<'_> {
    SeasonedPair {
        pair,
        original_crop: &pair.original_land.crop,
        intersected_crop: &pair.intersected_land.crop,
        original_season: Season::from_timestamp(&pair.original_land.gpx_timestamp, offset),
        intersected_season: Season::from_timestamp(&pair.intersected_land.gpx_timestamp, offset),
        intersected_farm_name: &pair.intersected_land.farm.name,
    }
}
