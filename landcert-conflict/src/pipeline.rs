//! The full conflict pipeline over an in-memory request collection.
//!
//! Stages 1-4 stream one record at a time; stage 5 folds the survivors into
//! groups; stage 6 assembles records. No stage looks back at a later one.

use crate::assemble::{assemble, assemble_all};
use crate::filter::{check_conflict, PruneReason};
use crate::flatten::flatten;
use crate::group::ConflictGroups;
use crate::join::{resolve_pairs, RequestIndex};
use crate::season::extract_season;
use chrono::FixedOffset;
use landcert_core::{ConflictRecord, LandCertResult, LandRequest, RequestCode, ResolverConfig};
use std::cell::Cell;

/// Per-run counters, logged at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Flat records produced by stage 1 (after any target push-down).
    pub flattened: usize,
    /// Flat records dropped because a side had no matching request.
    pub missing_reference: usize,
    /// Pairs produced by the join.
    pub resolved: usize,
    pub crop_pruned: usize,
    pub season_pruned: usize,
    /// Pairs that reached the grouper.
    pub conflicts: usize,
    pub groups: usize,
}

#[derive(Default)]
struct Counters {
    flattened: Cell<usize>,
    missing_reference: Cell<usize>,
    resolved: Cell<usize>,
    crop_pruned: Cell<usize>,
    season_pruned: Cell<usize>,
    conflicts: Cell<usize>,
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

impl Counters {
    fn finish(self, groups: usize) -> PipelineStats {
        PipelineStats {
            flattened: self.flattened.get(),
            missing_reference: self.missing_reference.get(),
            resolved: self.resolved.get(),
            crop_pruned: self.crop_pruned.get(),
            season_pruned: self.season_pruned.get(),
            conflicts: self.conflicts.get(),
            groups,
        }
    }
}

/// Run stages 1-5 over `requests`.
///
/// With `target` set, flat records of other codes are discarded before the
/// join. The group key contains the code, so the final record is the same.
pub fn collect_conflicts<'a>(
    requests: &'a [LandRequest],
    target: Option<&RequestCode>,
    offset: FixedOffset,
) -> (ConflictGroups<'a>, PipelineStats) {
    let index = RequestIndex::build(requests);
    let counters = Counters::default();

    let conflicts = requests
        .iter()
        .flat_map(flatten)
        .filter(|flat| target.map_or(true, |code| flat.code == code))
        .inspect(|_| bump(&counters.flattened))
        .filter_map(|flat| {
            let pairs = resolve_pairs(flat, &index);
            if pairs.is_none() {
                bump(&counters.missing_reference);
                tracing::trace!(
                    code = %flat.code,
                    intersects_with = %flat.intersection.land_intersects_with,
                    "Dropped intersection without matching request"
                );
            }
            pairs
        })
        .flatten()
        .inspect(|_| bump(&counters.resolved))
        .map(|pair| extract_season(pair, offset))
        .filter(|pair| match check_conflict(pair) {
            Ok(()) => true,
            Err(PruneReason::CropMismatch) => {
                bump(&counters.crop_pruned);
                false
            }
            Err(PruneReason::SeasonMismatch) => {
                bump(&counters.season_pruned);
                false
            }
        })
        .inspect(|_| bump(&counters.conflicts));

    let mut groups = ConflictGroups::new();
    groups.extend(conflicts);

    let stats = counters.finish(groups.len());
    tracing::debug!(
        requests = requests.len(),
        flattened = stats.flattened,
        missing_reference = stats.missing_reference,
        resolved = stats.resolved,
        crop_pruned = stats.crop_pruned,
        season_pruned = stats.season_pruned,
        conflicts = stats.conflicts,
        groups = stats.groups,
        "Conflict pipeline finished"
    );
    (groups, stats)
}

/// Resolve the conflict record for `target` over `requests`.
pub fn run(
    requests: &[LandRequest],
    target: &RequestCode,
    config: &ResolverConfig,
) -> LandCertResult<Option<ConflictRecord>> {
    config.validate()?;
    let offset = config.season_offset()?;
    let push_down = config.push_down_target_filter.then_some(target);
    let (groups, _) = collect_conflicts(requests, push_down, offset);
    Ok(assemble(&groups, target))
}

/// Resolve records for every code with at least one conflict.
pub fn run_all(
    requests: &[LandRequest],
    config: &ResolverConfig,
) -> LandCertResult<Vec<ConflictRecord>> {
    config.validate()?;
    let offset = config.season_offset()?;
    let (groups, _) = collect_conflicts(requests, None, offset);
    Ok(assemble_all(&groups))
}
