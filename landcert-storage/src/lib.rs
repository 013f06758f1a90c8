//! LANDCERT Storage - Request Store Traits and In-Memory Implementation
//!
//! Defines the read-only access layer over the land request collection.
//! Persistence itself belongs to the surrounding service; the in-memory store
//! backs tests, the CLI, and embedding services that load snapshots.

pub mod async_trait;

pub use async_trait::AsyncRequestStore;

use landcert_core::{LandCertError, LandCertResult, LandRequest, RequestCode, StorageError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// REQUEST STORE TRAIT
// ============================================================================

/// Read access to land requests keyed by unique code.
pub trait RequestStore: Send + Sync {
    /// Get a request by code.
    fn request_get(&self, code: &RequestCode) -> LandCertResult<Option<LandRequest>>;

    /// List every request in a stable order.
    fn request_list(&self) -> LandCertResult<Vec<LandRequest>>;

    /// Number of stored requests.
    fn request_count(&self) -> LandCertResult<usize>;

    /// Get several requests by code. Unknown codes are skipped.
    fn request_get_many(&self, codes: &[RequestCode]) -> LandCertResult<Vec<LandRequest>> {
        let mut found = Vec::with_capacity(codes.len());
        for code in codes {
            if let Some(request) = self.request_get(code)? {
                found.push(request);
            }
        }
        Ok(found)
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug, Default)]
struct Inner {
    requests: Vec<LandRequest>,
    by_code: HashMap<RequestCode, usize>,
}

/// In-memory request store. Listing preserves insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRequestStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryRequestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `requests`, rejecting duplicate codes.
    pub fn from_requests(requests: impl IntoIterator<Item = LandRequest>) -> LandCertResult<Self> {
        let store = Self::new();
        for request in requests {
            store.insert(request)?;
        }
        Ok(store)
    }

    /// Insert a request. Codes are unique.
    pub fn insert(&self, request: LandRequest) -> LandCertResult<()> {
        let mut inner = self.write()?;
        if inner.by_code.contains_key(&request.code) {
            tracing::warn!(code = %request.code, "Rejected land request with duplicate code");
            return Err(LandCertError::Storage(StorageError::InsertFailed {
                code: request.code,
                reason: "already exists".to_string(),
            }));
        }
        let index = inner.requests.len();
        inner.by_code.insert(request.code.clone(), index);
        inner.requests.push(request);
        Ok(())
    }

    fn read(&self) -> LandCertResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| LandCertError::Storage(StorageError::LockPoisoned))
    }

    fn write(&self) -> LandCertResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| LandCertError::Storage(StorageError::LockPoisoned))
    }
}

impl RequestStore for InMemoryRequestStore {
    fn request_get(&self, code: &RequestCode) -> LandCertResult<Option<LandRequest>> {
        let inner = self.read()?;
        Ok(inner
            .by_code
            .get(code)
            .map(|&index| inner.requests[index].clone()))
    }

    fn request_list(&self) -> LandCertResult<Vec<LandRequest>> {
        Ok(self.read()?.requests.clone())
    }

    fn request_count(&self) -> LandCertResult<usize> {
        Ok(self.read()?.requests.len())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::{InMemoryRequestStore, RequestStore};
    use chrono::{TimeZone, Utc};
    use landcert_core::{CropId, Farm, LandCertError, LandRequest, RequestCode, StorageError};

    fn make_request(code: &str) -> LandRequest {
        LandRequest {
            code: RequestCode::new(code),
            crop: CropId::new("wheat"),
            farm: Farm {
                name: format!("farm-{}", code),
            },
            gpx_timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            polygons: vec![],
        }
    }

    #[test]
    fn test_insert_get() {
        let store = InMemoryRequestStore::new();
        let request = make_request("A2024");

        store.insert(request.clone()).unwrap();
        let retrieved = store.request_get(&RequestCode::new("A2024")).unwrap();

        assert_eq!(retrieved, Some(request));
    }

    #[test]
    fn test_insert_duplicate() {
        let store = InMemoryRequestStore::new();
        store.insert(make_request("A2024")).unwrap();

        let result = store.insert(make_request("A2024"));

        assert!(matches!(
            result,
            Err(LandCertError::Storage(StorageError::InsertFailed { .. }))
        ));
        assert_eq!(store.request_count().unwrap(), 1);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store =
            InMemoryRequestStore::from_requests(["C", "A", "B"].into_iter().map(make_request))
                .unwrap();

        let codes: Vec<String> = store
            .request_list()
            .unwrap()
            .into_iter()
            .map(|r| r.code.to_string())
            .collect();

        assert_eq!(codes, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_get_many_skips_unknown_codes() {
        let store =
            InMemoryRequestStore::from_requests(["A", "B"].into_iter().map(make_request)).unwrap();

        let found = store
            .request_get_many(&[RequestCode::new("B"), RequestCode::new("X")])
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "B");
    }

    #[test]
    fn test_clones_share_data() {
        let store = InMemoryRequestStore::new();
        let handle = store.clone();
        store.insert(make_request("A")).unwrap();
        assert_eq!(handle.request_count().unwrap(), 1);
    }
}
