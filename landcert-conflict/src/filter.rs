//! Stage 4: keep only genuine conflicts.
//!
//! A geometric overlap is a certification conflict only when both parcels
//! claim the same crop in the same season.

use crate::season::SeasonedPair;

/// Why a pair was pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PruneReason {
    CropMismatch,
    SeasonMismatch,
}

pub fn crop_matches(pair: &SeasonedPair<'_>) -> bool {
    pair.original_crop == pair.intersected_crop
}

pub fn season_matches(pair: &SeasonedPair<'_>) -> bool {
    pair.original_season == pair.intersected_season
}

/// Apply both predicates in order. `Err` names the first one that failed.
pub fn check_conflict(pair: &SeasonedPair<'_>) -> Result<(), PruneReason> {
    if !crop_matches(pair) {
        return Err(PruneReason::CropMismatch);
    }
    if !season_matches(pair) {
        return Err(PruneReason::SeasonMismatch);
    }
    Ok(())
}

pub fn is_conflict(pair: &SeasonedPair<'_>) -> bool {
    check_conflict(pair).is_ok()
}

/// Keep conflicting pairs only.
pub fn filter_conflicts<'a, I>(pairs: I) -> impl Iterator<Item = SeasonedPair<'a>>
where
    I: IntoIterator<Item = SeasonedPair<'a>>,
{
    pairs.into_iter().filter(is_conflict)
}
