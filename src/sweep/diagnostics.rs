//! Read-only inspection of the catalog.
//!
//! [`Diagnostics`] only needs a [`CatalogReader`], so nothing reachable from
//! here can delete.

use std::pin::pin;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;

use super::{
    engine::CleanupError,
    enumerator::{EnumerationLimits, enumerate_all, pages},
    policy::Policy,
};
use crate::catalog::{Candidate, CatalogItem, CatalogReader, CatalogResult};

#[derive(Debug, Clone)]
pub struct Diagnostics<R> {
    reader: R,
    limits: EnumerationLimits,
}

impl<R: CatalogReader> Diagnostics<R> {
    pub fn new(reader: R, limits: EnumerationLimits) -> Self {
        Self { reader, limits }
    }

    /// Candidates a cleanup would delete right now.
    pub async fn scan(&self, policy: &Policy) -> Result<Vec<Candidate>, CleanupError> {
        self.scan_at(policy, Utc::now()).await
    }

    /// Candidates a cleanup would delete at `now`.
    pub async fn scan_at(
        &self,
        policy: &Policy,
        now: DateTime<Utc>,
    ) -> Result<Vec<Candidate>, CleanupError> {
        if !policy.has_markers() {
            return Err(CleanupError::Config(
                "at least one marker tag is required".to_string(),
            ));
        }

        let listing =
            enumerate_all(&self.reader, self.limits.page_size, self.limits.max_pages).await?;
        let candidates = policy.candidates(&listing.items, now);

        tracing::info!(
            listed = listing.items.len(),
            truncated = listing.truncated,
            found = candidates.len(),
            "Catalog scan complete"
        );

        Ok(candidates)
    }

    /// The first `n` listed items, unfiltered.
    ///
    /// Stops fetching as soon as `n` items are in hand.
    pub async fn sample(&self, n: usize) -> CatalogResult<Vec<CatalogItem>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let page_size = u32::try_from(n)
            .unwrap_or(u32::MAX)
            .min(self.limits.page_size);
        let mut page_stream = pin!(pages(&self.reader, page_size, self.limits.max_pages));
        let mut items = Vec::with_capacity(n);

        while items.len() < n {
            let Some(page) = page_stream.try_next().await? else {
                break;
            };
            let wanted = n - items.len();
            items.extend(page.items.into_iter().take(wanted));
        }

        tracing::debug!(requested = n, returned = items.len(), "Catalog sample taken");
        Ok(items)
    }
}
