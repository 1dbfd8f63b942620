//! Scheduled cleanup worker.
//!
//! Runs one cleanup pass, sleeps for the configured interval, and repeats
//! until the task is cancelled. A failing pass is logged and the next one runs
//! on schedule.

use serde::Serialize;

use super::{
    engine::{CleanupEngine, CleanupError, CleanupResult},
    policy::Policy,
};
use crate::{
    catalog::{Candidate, CatalogWriter},
    config::WorkerConfig,
};

/// What a single worker pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Candidates that would have been deleted.
    DryRun { candidates: Vec<Candidate> },
    Cleanup(CleanupResult),
}

/// Starts the cleanup worker.
///
/// Returns immediately when the worker is disabled; otherwise runs until the
/// task is cancelled.
pub async fn start_cleanup_worker<C: CatalogWriter>(
    engine: CleanupEngine<C>,
    policy: Policy,
    config: WorkerConfig,
) {
    if !config.enabled {
        tracing::info!("Cleanup worker disabled by configuration");
        return;
    }

    let dry_run_msg = if config.dry_run { " (DRY RUN)" } else { "" };

    tracing::info!(
        interval_secs = config.interval_secs,
        markers = ?policy.marker_tags(),
        max_age_minutes = policy.max_age().map(|d| d.num_minutes()),
        dry_run = config.dry_run,
        "Starting cleanup worker{}",
        dry_run_msg
    );

    let interval = config.interval();

    loop {
        match run_pass(&engine, &policy, config.dry_run).await {
            Ok(PassOutcome::DryRun { candidates }) => {
                for candidate in &candidates {
                    tracing::info!(
                        item_id = %candidate.id,
                        title = %candidate.title,
                        "DRY RUN: Would delete item"
                    );
                }
                tracing::info!(
                    found = candidates.len(),
                    dry_run = true,
                    "Cleanup pass complete{}",
                    dry_run_msg
                );
            }
            Ok(PassOutcome::Cleanup(result)) => {
                if result.found > 0 {
                    tracing::info!(
                        found = result.found,
                        deleted = result.deleted,
                        failed = result.failed(),
                        duration_ms = result.duration_ms,
                        "Cleanup pass complete"
                    );
                } else {
                    tracing::debug!("Cleanup pass complete, nothing to delete");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running cleanup pass");
            }
        }

        tokio::time::sleep(interval).await;
    }
}

/// Run one pass: a full cleanup, or a scan when `dry_run` is set.
pub async fn run_pass<C: CatalogWriter>(
    engine: &CleanupEngine<C>,
    policy: &Policy,
    dry_run: bool,
) -> Result<PassOutcome, CleanupError> {
    if dry_run {
        let candidates = engine.diagnostics().scan(policy).await?;
        return Ok(PassOutcome::DryRun { candidates });
    }

    engine.cleanup(policy).await.map(PassOutcome::Cleanup)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        catalog::ItemId,
        sweep::{
            EnumerationLimits,
            testing::{ScriptedCatalog, item},
        },
    };

    fn engine() -> CleanupEngine<Arc<ScriptedCatalog>> {
        let catalog = ScriptedCatalog::with_pages(vec![vec![
            item(1, "auto-delete-1h"),
            item(2, "summer"),
        ]]);
        CleanupEngine::new(Arc::new(catalog), EnumerationLimits::default())
    }

    fn policy() -> Policy {
        Policy::new(["auto-delete-1h"])
    }

    #[tokio::test]
    async fn test_dry_run_pass_deletes_nothing() {
        let engine = engine();

        let outcome = run_pass(&engine, &policy(), true).await.unwrap();

        match outcome {
            PassOutcome::DryRun { candidates } => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates[0].id, ItemId::from(1));
            }
            other => panic!("expected dry run, got {:?}", other),
        }
        assert!(engine.client().deletes().is_empty());
    }

    #[tokio::test]
    async fn test_live_pass_deletes() {
        let engine = engine();

        let outcome = run_pass(&engine, &policy(), false).await.unwrap();

        let PassOutcome::Cleanup(result) = outcome else {
            panic!("expected cleanup result");
        };
        assert_eq!(result.deleted, 1);
        assert_eq!(engine.client().deletes(), vec![ItemId::from(1)]);
    }

    #[tokio::test]
    async fn test_disabled_worker_returns_immediately() {
        let engine = engine();
        let catalog = engine.client().clone();

        start_cleanup_worker(engine, policy(), WorkerConfig::default()).await;

        assert_eq!(catalog.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_worker_runs_first_pass_immediately() {
        let engine = engine();
        let catalog = engine.client().clone();
        let config = WorkerConfig {
            enabled: true,
            interval_secs: 3600,
            dry_run: false,
        };

        let finished = tokio::time::timeout(
            Duration::from_millis(200),
            start_cleanup_worker(engine, policy(), config),
        )
        .await;

        assert!(finished.is_err(), "worker loop should not return");
        assert_eq!(catalog.list_calls(), 1);
        assert_eq!(catalog.deletes(), vec![ItemId::from(1)]);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(PassOutcome::DryRun { candidates: vec![] }).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "dry_run", "candidates": []}));
    }
}
