//! Subcommand implementations. Each returns the text printed on stdout.

use crate::error::CliError;
use landcert_conflict::ConflictResolver;
use landcert_core::{LandRequest, RequestCode, ResolverConfig};
use landcert_storage::InMemoryRequestStore;
use std::path::Path;
use std::sync::Arc;

/// Read a JSON array of land requests.
pub fn read_requests(path: &Path) -> Result<Vec<LandRequest>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::ReadRequests {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ParseRequests {
        path: path.to_path_buf(),
        source,
    })
}

fn resolver(
    requests: Vec<LandRequest>,
    config: ResolverConfig,
) -> Result<ConflictResolver, CliError> {
    tracing::info!(requests = requests.len(), "Loading land requests");
    let store = InMemoryRequestStore::from_requests(requests)?;
    Ok(ConflictResolver::new(Arc::new(store), config)?)
}

/// The conflict record for `code` as pretty JSON, `null` when empty.
pub async fn resolve(
    requests: Vec<LandRequest>,
    code: RequestCode,
    config: ResolverConfig,
) -> Result<String, CliError> {
    let resolver = resolver(requests, config)?;
    let record = resolver.resolve_conflicts_async(code.clone()).await?;
    match &record {
        Some(record) => tracing::info!(
            code = %code,
            lands = record.lands.len(),
            details = record.intersections_data.len(),
            "Conflicts found"
        ),
        None => tracing::info!(code = %code, "No conflicts"),
    }
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Every conflict record as a pretty JSON array.
pub async fn resolve_all(
    requests: Vec<LandRequest>,
    config: ResolverConfig,
) -> Result<String, CliError> {
    let resolver = resolver(requests, config)?;
    let records = tokio::task::spawn_blocking(move || resolver.resolve_all())
        .await
        .map_err(|e| {
            landcert_core::LandCertError::from(landcert_core::PipelineError::TaskFailed {
                reason: e.to_string(),
            })
        })??;
    tracing::info!(records = records.len(), "Resolved all requests");
    Ok(serde_json::to_string_pretty(&records)?)
}
