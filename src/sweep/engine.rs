//! Cleanup orchestration: enumerate, filter, delete.
//!
//! A run walks the whole catalog, picks the candidates with the policy and
//! deletes them one at a time. A failed listing aborts the run before any
//! delete; a failed delete is recorded and the run moves on to the next
//! candidate.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::{
    diagnostics::Diagnostics,
    enumerator::{EnumerationLimits, enumerate_all},
    policy::Policy,
};
use crate::{
    catalog::{CatalogError, CatalogWriter, ItemId},
    observability::metrics,
};

/// Errors that abort a cleanup run.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Invalid cleanup policy: {0}")]
    Config(String),

    #[error("Catalog enumeration failed: {0}")]
    Enumeration(#[from] CatalogError),
}

/// A candidate that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub id: ItemId,
    pub reason: String,
    /// HTTP status of the failed delete, if the remote answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl DeleteFailure {
    fn new(id: ItemId, error: &CatalogError) -> Self {
        Self {
            id,
            reason: error.to_string(),
            status: error.status(),
        }
    }
}

/// Summary of a completed cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupResult {
    /// Number of candidates the policy selected.
    pub found: usize,
    /// Number of candidates deleted.
    pub deleted: usize,
    pub failures: Vec<DeleteFailure>,
    pub duration_ms: u64,
}

impl CleanupResult {
    /// Every candidate was deleted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Runs cleanups against one catalog.
#[derive(Debug, Clone)]
pub struct CleanupEngine<C> {
    client: C,
    limits: EnumerationLimits,
}

impl<C: CatalogWriter> CleanupEngine<C> {
    pub fn new(client: C, limits: EnumerationLimits) -> Self {
        Self { client, limits }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn limits(&self) -> EnumerationLimits {
        self.limits
    }

    /// Read-only view over the same catalog.
    pub fn diagnostics(&self) -> Diagnostics<&C> {
        Diagnostics::new(&self.client, self.limits)
    }

    /// Delete every item matching `policy`, using the current time.
    pub async fn cleanup(&self, policy: &Policy) -> Result<CleanupResult, CleanupError> {
        self.cleanup_at(policy, Utc::now()).await
    }

    /// Delete every item matching `policy` as of `now`.
    pub async fn cleanup_at(
        &self,
        policy: &Policy,
        now: DateTime<Utc>,
    ) -> Result<CleanupResult, CleanupError> {
        let start = Instant::now();

        if !policy.has_markers() {
            metrics::record_run("config_error");
            return Err(CleanupError::Config(
                "at least one marker tag is required".to_string(),
            ));
        }

        tracing::info!(
            markers = ?policy.marker_tags(),
            max_age_minutes = policy.max_age().map(|d| d.num_minutes()),
            "Starting catalog cleanup"
        );

        let listing = enumerate_all(&self.client, self.limits.page_size, self.limits.max_pages)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "Catalog enumeration failed, nothing deleted");
                metrics::record_run("enumeration_error");
            })?;

        let candidates = policy.candidates(&listing.items, now);
        tracing::info!(
            listed = listing.items.len(),
            pages = listing.pages_fetched,
            truncated = listing.truncated,
            found = candidates.len(),
            "Selected cleanup candidates"
        );

        let mut result = CleanupResult {
            found: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            match self.client.delete(&candidate.id).await {
                Ok(()) => {
                    tracing::debug!(item_id = %candidate.id, title = %candidate.title, "Deleted item");
                    metrics::record_deletion();
                    result.deleted += 1;
                }
                Err(e) => {
                    if e.is_not_found() {
                        tracing::info!(item_id = %candidate.id, "Item already gone");
                    } else {
                        tracing::warn!(item_id = %candidate.id, error = %e, "Failed to delete item");
                    }
                    metrics::record_delete_failure();
                    result.failures.push(DeleteFailure::new(candidate.id, &e));
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        metrics::record_run(if result.is_complete() {
            "success"
        } else {
            "partial"
        });

        tracing::info!(
            found = result.found,
            deleted = result.deleted,
            failed = result.failed(),
            duration_ms = result.duration_ms,
            "Catalog cleanup complete"
        );

        Ok(result)
    }
}
