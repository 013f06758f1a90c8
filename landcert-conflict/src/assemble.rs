//! Stage 6: turn groups into conflict records.

use crate::group::{ConflictGroup, ConflictGroups, DetailRef, OrderedSet};
use landcert_core::{ConflictRecord, LandRequest, RequestCode};
use std::collections::HashMap;

/// Lands and details collected for one code across its groups.
struct RecordBuilder<'a> {
    code: &'a RequestCode,
    lands: OrderedSet<&'a LandRequest>,
    details: OrderedSet<DetailRef<'a>>,
}

impl<'a> RecordBuilder<'a> {
    fn new(code: &'a RequestCode) -> Self {
        Self {
            code,
            lands: OrderedSet::new(),
            details: OrderedSet::new(),
        }
    }

    /// Original first, then the conflicting lands.
    fn add_group(&mut self, group: &ConflictGroup<'a>) {
        self.lands.extend(group.original.iter().copied());
        self.lands.extend(group.lands.iter().copied());
        self.details.extend(group.intersections_data.iter().copied());
    }

    fn build(self) -> ConflictRecord {
        ConflictRecord {
            code: self.code.clone(),
            lands: self.lands.iter().map(|&land| land.clone()).collect(),
            intersections_data: self.details.iter().map(DetailRef::to_detail).collect(),
        }
    }
}

/// Assemble a single group into a record.
pub fn assemble_group(group: &ConflictGroup<'_>) -> ConflictRecord {
    let mut builder = RecordBuilder::new(group.code());
    builder.add_group(group);
    builder.build()
}

/// The record for `target`, folding every group with that code.
/// `None` when no group matches.
pub fn assemble(groups: &ConflictGroups<'_>, target: &RequestCode) -> Option<ConflictRecord> {
    let mut builder: Option<RecordBuilder<'_>> = None;
    for group in groups.iter().filter(|g| g.code() == target) {
        builder
            .get_or_insert_with(|| RecordBuilder::new(group.code()))
            .add_group(group);
    }
    builder.map(RecordBuilder::build)
}

/// One record per code, in order of first appearance.
pub fn assemble_all(groups: &ConflictGroups<'_>) -> Vec<ConflictRecord> {
    let mut builders: Vec<RecordBuilder<'_>> = Vec::new();
    let mut by_code: HashMap<&RequestCode, usize> = HashMap::new();
    for group in groups.iter() {
        let next = builders.len();
        let index = *by_code.entry(group.code()).or_insert(next);
        if index == next {
            builders.push(RecordBuilder::new(group.code()));
        }
        builders[index].add_group(group);
    }
    builders.into_iter().map(RecordBuilder::build).collect()
}
