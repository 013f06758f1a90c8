//! Store-backed entry points.
//!
//! `ConflictResolver` reads from a synchronous `RequestStore` and offers a
//! blocking call plus async wrappers with a timeout. `AsyncConflictResolver`
//! reads from an `AsyncRequestStore`.

use crate::pipeline;
use landcert_core::{
    ConflictRecord, LandCertError, LandCertResult, LandRequest, PipelineError, RequestCode,
    ResolverConfig,
};
use landcert_storage::{AsyncRequestStore, RequestStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

/// Codes the target's polygons intersect with, first-seen order, target excluded.
fn neighbour_codes(target: &LandRequest) -> Vec<RequestCode> {
    let mut seen = HashSet::new();
    target
        .polygons
        .iter()
        .flat_map(|polygon| &polygon.intersections)
        .map(|intersection| &intersection.land_intersects_with)
        .filter(|code| **code != target.code && seen.insert(*code))
        .cloned()
        .collect()
}

fn task_failed(err: JoinError) -> LandCertError {
    LandCertError::Pipeline(PipelineError::TaskFailed {
        reason: err.to_string(),
    })
}

fn timed_out(code: RequestCode, timeout: Duration) -> LandCertError {
    tracing::warn!(
        code = %code,
        timeout_ms = timeout.as_millis() as u64,
        "Conflict resolution timed out"
    );
    LandCertError::Pipeline(PipelineError::TimedOut { code, timeout })
}

// ============================================================================
// SYNC STORE RESOLVER
// ============================================================================

/// Resolves conflict records against a [`RequestStore`].
#[derive(Clone)]
pub struct ConflictResolver {
    store: Arc<dyn RequestStore>,
    config: ResolverConfig,
}

impl std::fmt::Debug for ConflictResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConflictResolver {
    /// Create a resolver. Fails on invalid configuration.
    pub fn new(store: Arc<dyn RequestStore>, config: ResolverConfig) -> LandCertResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Requests the pipeline needs for `target`.
    ///
    /// With push-down only the target and the requests it points at are
    /// fetched. An unknown target yields an empty working set.
    fn load(&self, target: &RequestCode) -> LandCertResult<Vec<LandRequest>> {
        if !self.config.push_down_target_filter {
            return self.store.request_list();
        }
        let Some(request) = self.store.request_get(target)? else {
            return Ok(Vec::new());
        };
        let neighbours = self.store.request_get_many(&neighbour_codes(&request))?;
        let mut requests = Vec::with_capacity(neighbours.len() + 1);
        requests.push(request);
        requests.extend(neighbours);
        Ok(requests)
    }

    /// Resolve the conflict record for `code`. `Ok(None)` when there is none.
    pub fn resolve_conflicts(&self, code: &RequestCode) -> LandCertResult<Option<ConflictRecord>> {
        let span = tracing::info_span!("resolve_conflicts", code = %code);
        let _enter = span.enter();

        let requests = self.load(code)?;
        let record = pipeline::run(&requests, code, &self.config)?;
        tracing::debug!(
            loaded = requests.len(),
            lands = record.as_ref().map_or(0, |r| r.lands.len()),
            details = record.as_ref().map_or(0, |r| r.intersections_data.len()),
            "Resolved conflicts"
        );
        Ok(record)
    }

    /// Every conflict record in the store, one per code.
    pub fn resolve_all(&self) -> LandCertResult<Vec<ConflictRecord>> {
        let span = tracing::info_span!("resolve_all");
        let _enter = span.enter();

        let requests = self.store.request_list()?;
        let records = pipeline::run_all(&requests, &self.config)?;
        tracing::debug!(loaded = requests.len(), records = records.len(), "Resolved all conflicts");
        Ok(records)
    }

    /// Run [`Self::resolve_conflicts`] on a blocking task under the
    /// configured timeout.
    ///
    /// On timeout the result is discarded; the blocking task finishes in the
    /// background since it cannot be interrupted.
    pub async fn resolve_conflicts_async(
        &self,
        code: RequestCode,
    ) -> LandCertResult<Option<ConflictRecord>> {
        let timeout = self.config.resolve_timeout();
        let resolver = self.clone();
        let task_code = code.clone();
        let task = tokio::task::spawn_blocking(move || resolver.resolve_conflicts(&task_code));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => Err(task_failed(err)),
            Err(_) => Err(timed_out(code, timeout)),
        }
    }

    /// Resolve several codes concurrently. Results follow the input order.
    pub async fn resolve_many(
        &self,
        codes: Vec<RequestCode>,
    ) -> Vec<LandCertResult<Option<ConflictRecord>>> {
        let handles: Vec<_> = codes
            .into_iter()
            .map(|code| {
                let resolver = self.clone();
                tokio::spawn(async move { resolver.resolve_conflicts_async(code).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.unwrap_or_else(|err| Err(task_failed(err))));
        }
        results
    }
}

// ============================================================================
// ASYNC STORE RESOLVER
// ============================================================================

/// Resolves conflict records against an [`AsyncRequestStore`].
///
/// Loading and the pipeline run both count against the timeout.
#[derive(Clone)]
pub struct AsyncConflictResolver {
    store: Arc<dyn AsyncRequestStore>,
    config: ResolverConfig,
}

impl std::fmt::Debug for AsyncConflictResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncConflictResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AsyncConflictResolver {
    pub fn new(store: Arc<dyn AsyncRequestStore>, config: ResolverConfig) -> LandCertResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    async fn load(&self, target: &RequestCode) -> LandCertResult<Vec<LandRequest>> {
        if !self.config.push_down_target_filter {
            return self.store.request_list().await;
        }
        let Some(request) = self.store.request_get(target).await? else {
            return Ok(Vec::new());
        };
        let neighbours = self
            .store
            .request_get_many(&neighbour_codes(&request))
            .await?;
        let mut requests = Vec::with_capacity(neighbours.len() + 1);
        requests.push(request);
        requests.extend(neighbours);
        Ok(requests)
    }

    async fn resolve_inner(&self, code: RequestCode) -> LandCertResult<Option<ConflictRecord>> {
        let requests = self.load(&code).await?;
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || {
            let span = tracing::info_span!("resolve_conflicts", code = %code);
            let _enter = span.enter();
            pipeline::run(&requests, &code, &config)
        })
        .await
        .map_err(task_failed)?
    }

    /// Resolve the conflict record for `code` under the configured timeout.
    pub async fn resolve_conflicts(
        &self,
        code: &RequestCode,
    ) -> LandCertResult<Option<ConflictRecord>> {
        let timeout = self.config.resolve_timeout();
        match tokio::time::timeout(timeout, self.resolve_inner(code.clone())).await {
            Ok(result) => result,
            Err(_) => Err(timed_out(code.clone(), timeout)),
        }
    }

    /// Every conflict record in the store, one per code.
    pub async fn resolve_all(&self) -> LandCertResult<Vec<ConflictRecord>> {
        let requests = self.store.request_list().await?;
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || pipeline::run_all(&requests, &config))
            .await
            .map_err(task_failed)?
    }
}
