//! Stage 2: resolve both sides of each flat record by code.

use crate::flatten::FlatIntersection;
use landcert_core::{LandRequest, RequestCode};
use std::collections::HashMap;

/// Hash index over a request collection, keyed by code.
///
/// Codes are unique in a well-formed collection. When they are not, every
/// request sharing a code is a match, as with an equality join.
#[derive(Debug, Default)]
pub struct RequestIndex<'a> {
    by_code: HashMap<&'a RequestCode, Vec<&'a LandRequest>>,
}

impl<'a> RequestIndex<'a> {
    pub fn build(requests: impl IntoIterator<Item = &'a LandRequest>) -> Self {
        let mut by_code: HashMap<&'a RequestCode, Vec<&'a LandRequest>> = HashMap::new();
        for request in requests {
            by_code.entry(&request.code).or_default().push(request);
        }
        Self { by_code }
    }

    /// All requests with `code`; empty when unknown.
    pub fn lookup(&self, code: &RequestCode) -> &[&'a LandRequest] {
        self.by_code.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, code: &RequestCode) -> bool {
        self.by_code.contains_key(code)
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// A flat record with both requests attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPair<'a> {
    pub flat: FlatIntersection<'a>,
    pub original_land: &'a LandRequest,
    pub intersected_land: &'a LandRequest,
}

/// Join one flat record against `index`.
///
/// Returns `None` when either side has no match (the record is dropped).
pub fn resolve_pairs<'a, 'b>(
    flat: FlatIntersection<'a>,
    index: &'b RequestIndex<'a>,
) -> Option<impl Iterator<Item = ResolvedPair<'a>> + 'b>
where
    'a: 'b,
{
    let originals = index.lookup(flat.code);
    let intersecteds = index.lookup(&flat.intersection.land_intersects_with);
    if originals.is_empty() || intersecteds.is_empty() {
        return None;
    }

    Some(originals.iter().flat_map(move |&original_land| {
        intersecteds.iter().map(move |&intersected_land| ResolvedPair {
            flat,
            original_land,
            intersected_land,
        })
    }))
}

/// Inner-join a stream of flat records against `index`.
pub fn resolve<'a, 'b, I>(
    flats: I,
    index: &'b RequestIndex<'a>,
) -> impl Iterator<Item = ResolvedPair<'a>> + 'b
where
    I: IntoIterator<Item = FlatIntersection<'a>>,
    I::IntoIter: 'b,
    'a: 'b,
{
    flats
        .into_iter()
        .filter_map(move |flat| resolve_pairs(flat, index))
        .flatten()
}
