//! Async request store trait.
//!
//! Async alternative to the synchronous `RequestStore`, for services whose
//! request collection sits behind an async driver.

use crate::{InMemoryRequestStore, RequestStore};
use ::async_trait::async_trait;
use landcert_core::{LandCertResult, LandRequest, RequestCode};

/// Async read access to land requests.
#[async_trait]
pub trait AsyncRequestStore: Send + Sync {
    /// Get a request by code.
    async fn request_get(&self, code: &RequestCode) -> LandCertResult<Option<LandRequest>>;

    /// Get several requests by code. Unknown codes are skipped.
    async fn request_get_many(&self, codes: &[RequestCode]) -> LandCertResult<Vec<LandRequest>>;

    /// List every request in a stable order.
    async fn request_list(&self) -> LandCertResult<Vec<LandRequest>>;

    /// Number of stored requests.
    async fn request_count(&self) -> LandCertResult<usize>;
}

#[async_trait]
impl AsyncRequestStore for InMemoryRequestStore {
    async fn request_get(&self, code: &RequestCode) -> LandCertResult<Option<LandRequest>> {
        RequestStore::request_get(self, code)
    }

    async fn request_get_many(&self, codes: &[RequestCode]) -> LandCertResult<Vec<LandRequest>> {
        RequestStore::request_get_many(self, codes)
    }

    async fn request_list(&self) -> LandCertResult<Vec<LandRequest>> {
        RequestStore::request_list(self)
    }

    async fn request_count(&self) -> LandCertResult<usize> {
        RequestStore::request_count(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use landcert_core::{CropId, Farm};

    fn make_request(code: &str) -> LandRequest {
        LandRequest {
            code: RequestCode::new(code),
            crop: CropId::new("wheat"),
            farm: Farm {
                name: "farm".to_string(),
            },
            gpx_timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            polygons: vec![],
        }
    }

    #[tokio::test]
    async fn test_async_get_and_list() {
        let store =
            InMemoryRequestStore::from_requests([make_request("A"), make_request("B")]).unwrap();
        let store: &dyn AsyncRequestStore = &store;

        let found = store.request_get(&RequestCode::new("B")).await.unwrap();
        assert_eq!(found.map(|r| r.code), Some(RequestCode::new("B")));
        assert_eq!(store.request_list().await.unwrap().len(), 2);
        assert_eq!(store.request_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_async_get_many_skips_unknown_codes() {
        let store =
            InMemoryRequestStore::from_requests([make_request("A"), make_request("B")]).unwrap();
        let store: &dyn AsyncRequestStore = &store;

        let found = store
            .request_get_many(&[RequestCode::new("X"), RequestCode::new("A")])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, "A");
    }
}
