//! Batch driver for the enrichment stage.
//!
//! Runs every raw record through the orchestrator with bounded concurrency
//! and a start-rate limit, isolating per-record failures.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::PersistenceResult;
use crate::pipeline::orchestrator::Orchestrator;
use crate::pipeline::rate_limit::RateLimiter;
use crate::pipeline::usage::CallTotals;
use crate::stores::snapshot::{SnapshotKind, SnapshotStore};
use crate::types::record::{EnrichedRecord, FailureRecord, RawRecord};

/// Counts reported at the end of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub raw: usize,
    pub enriched: usize,
    pub failed: usize,
    pub calls: CallTotals,
}

/// Everything a batch produced.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// In completion order, not input order.
    pub enriched: Vec<EnrichedRecord>,
    pub failed: Vec<FailureRecord>,
    pub summary: BatchSummary,
}

/// Enriches a batch of raw records.
pub struct BatchDriver {
    orchestrator: Arc<Orchestrator>,
    limiter: Arc<RateLimiter>,
    concurrency: usize,
}

impl BatchDriver {
    /// Build a driver using the orchestrator's rate and concurrency settings.
    pub fn new(orchestrator: Orchestrator) -> Self {
        let config = orchestrator.config();
        let limiter = RateLimiter::new(config.rate_limit, config.rate_interval);
        let concurrency = config.concurrency.max(1);

        Self {
            orchestrator: Arc::new(orchestrator),
            limiter: Arc::new(limiter),
            concurrency,
        }
    }

    /// Replace the rate limiter (e.g. to share one across drivers).
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Enrich every record. Never fails as a whole.
    pub async fn run(&self, records: Vec<RawRecord>) -> BatchOutcome {
        let total = records.len();
        info!(
            total,
            concurrency = self.concurrency,
            rate_limit = self.limiter.limit(),
            rate_interval_secs = self.limiter.interval().as_secs_f64(),
            "Starting enrichment batch"
        );

        let mut results = stream::iter(records)
            .map(|record| async move {
                let result = self
                    .limiter
                    .run(|| self.orchestrator.enrich(&record))
                    .await;
                (record, result)
            })
            .buffer_unordered(self.concurrency);

        let mut outcome = BatchOutcome::default();
        while let Some((record, result)) = results.next().await {
            match result {
                Ok(enriched) => outcome.enriched.push(enriched),
                Err(error) => {
                    warn!(
                        identifier = %record.identifier,
                        error = %error,
                        "Record failed enrichment"
                    );
                    outcome.failed.push(FailureRecord {
                        record,
                        error: error.to_string(),
                    });
                }
            }

            info!(
                completed = outcome.enriched.len() + outcome.failed.len(),
                total,
                enriched = outcome.enriched.len(),
                failed = outcome.failed.len(),
                "Enrichment progress"
            );
        }

        outcome.summary = BatchSummary {
            raw: total,
            enriched: outcome.enriched.len(),
            failed: outcome.failed.len(),
            calls: self.orchestrator.counters().totals(),
        };

        info!(
            raw = outcome.summary.raw,
            enriched = outcome.summary.enriched,
            failed = outcome.summary.failed,
            fast_calls = outcome.summary.calls.fast,
            smart_calls = outcome.summary.calls.smart,
            "Enrichment batch complete"
        );

        outcome
    }

    /// Run and persist: the enriched snapshot always, the failure snapshot
    /// only when something failed.
    pub async fn run_and_persist(
        &self,
        records: Vec<RawRecord>,
        store: &SnapshotStore,
        version: &str,
    ) -> PersistenceResult<BatchOutcome> {
        let outcome = self.run(records).await;

        store
            .write(SnapshotKind::Enriched, version, &outcome.enriched)
            .await?;
        if !outcome.failed.is_empty() {
            store
                .write(SnapshotKind::FailedEnriched, version, &outcome.failed)
                .await?;
        }

        Ok(outcome)
    }
}
