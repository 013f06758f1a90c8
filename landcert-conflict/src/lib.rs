//! LANDCERT Conflict - Certification Conflict Resolution
//!
//! Finds, for one land request, every other request whose parcel overlaps
//! it, claims the same crop and falls in the same season. The work runs as a
//! staged pipeline over borrowed requests:
//!
//! 1. [`flatten`] expands polygon intersections into flat records.
//! 2. [`join`] resolves both sides of each record by code.
//! 3. [`season`] derives the calendar-year season of each side.
//! 4. [`filter`] keeps same-crop, same-season pairs.
//! 5. [`group`] groups survivors and removes structural duplicates.
//! 6. [`assemble`] emits at most one record per code.
//!
//! [`pipeline`] wires the stages over an in-memory slice and [`resolver`]
//! reads from a request store.

pub mod assemble;
pub mod filter;
pub mod flatten;
pub mod group;
pub mod join;
pub mod pipeline;
pub mod resolver;
pub mod season;

pub use assemble::{assemble, assemble_all, assemble_group};
pub use filter::{
    check_conflict, crop_matches, filter_conflicts, is_conflict, season_matches, PruneReason,
};
pub use flatten::{flatten, FlatIntersection};
pub use group::{group, ConflictGroup, ConflictGroups, DetailRef, GroupKey, OrderedSet};
pub use join::{resolve, resolve_pairs, RequestIndex, ResolvedPair};
pub use pipeline::{collect_conflicts, run, run_all, PipelineStats};
pub use resolver::{AsyncConflictResolver, ConflictResolver};
pub use season::{extract_season, SeasonedPair};
