//! Batch driver: isolation, summary and persistence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_client::SchemaSpec;
use async_trait::async_trait;
use serde_json::Value;

use seed_pipeline::error::GenerationResult;
use seed_pipeline::pipeline::schemas::{DETAILS, ENRICHMENT, FILTERS};
use seed_pipeline::testing::{details_json, filters_json, sample_raw_record, MockModel, MockReply};
use seed_pipeline::{
    BatchDriver, CallCounters, EnrichConfig, EnrichedRecord, FailureRecord, ModelClient,
    ModelTiers, Orchestrator, RateLimiter, SnapshotKind, SnapshotStore, Taxonomy,
};

const BAD: &str = "Site Name: \"broken\"";

fn fast_model() -> MockModel {
    MockModel::new("fast")
        .with_reply(DETAILS, details_json("Tool", "Ship it", "A tool."))
        .with_reply(FILTERS, filters_json("dev", &["libraries"], &["frontend"]))
        .when_prompt_contains(DETAILS, BAD, MockReply::fail("500"))
}

fn smart_model() -> MockModel {
    MockModel::new("smart").when_prompt_contains(ENRICHMENT, BAD, MockReply::fail("500"))
}

fn models() -> (Arc<MockModel>, Arc<MockModel>) {
    (Arc::new(fast_model()), Arc::new(smart_model()))
}

fn new_driver(config: EnrichConfig) -> (BatchDriver, Arc<MockModel>, Arc<MockModel>) {
    let (fast, smart) = models();
    let orchestrator = Orchestrator::new(
        ModelTiers::new(fast.clone(), smart.clone()),
        Arc::new(Taxonomy::default()),
        config,
        Arc::new(CallCounters::new()),
    );
    (BatchDriver::new(orchestrator), fast, smart)
}

fn records(ids: &[&str]) -> Vec<seed_pipeline::RawRecord> {
    ids.iter().map(|id| sample_raw_record(id)).collect()
}

#[tokio::test]
async fn test_failed_record_does_not_stop_batch() {
    let (driver, _fast, smart) = new_driver(EnrichConfig::default());

    let outcome = driver.run(records(&["alpha", "broken", "gamma"])).await;

    assert_eq!(outcome.summary.raw, 3);
    assert_eq!(outcome.summary.enriched, 2);
    assert_eq!(outcome.summary.failed, 1);
    assert_eq!(outcome.enriched.len() + outcome.failed.len(), 3);

    let failed = &outcome.failed[0];
    assert_eq!(failed.record.identifier, "broken");
    assert!(failed.error.contains("exhausted after 3 attempts"));

    let mut ids: Vec<_> = outcome
        .enriched
        .iter()
        .map(|r| r.identifier().to_string())
        .collect();
    ids.sort();
    assert_eq!(ids, ["alpha", "gamma"]);

    // broken: 2 fast in state 1, then 2 smart strict calls
    assert_eq!(smart.calls_for(ENRICHMENT).len(), 2);
    assert_eq!(outcome.summary.calls.fast, 6);
    assert_eq!(outcome.summary.calls.smart, 2);
}

#[tokio::test]
async fn test_empty_batch() {
    let (driver, fast, _smart) = new_driver(EnrichConfig::default());

    let outcome = driver.run(Vec::new()).await;

    assert_eq!(outcome.summary.raw, 0);
    assert!(outcome.enriched.is_empty());
    assert_eq!(fast.call_count(), 0);
}

#[tokio::test]
async fn test_rate_limit_spaces_record_starts() {
    let config = EnrichConfig::default()
        .with_rate_limit(2, Duration::from_millis(300))
        .with_concurrency(5);
    let (driver, _fast, _smart) = new_driver(config);

    let started = Instant::now();
    let outcome = driver.run(records(&["a", "b", "c", "d", "e"])).await;

    assert_eq!(outcome.summary.enriched, 5);
    // 2 starts per window: a, b at once, c, d after one window, e after two
    assert!(started.elapsed() >= Duration::from_millis(590));
}

/// Fast model that tracks how many details calls are in flight.
///
/// State 1 issues exactly one details call per record, so the peak is the
/// peak number of records being enriched at once.
struct GaugedModel {
    inner: MockModel,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl ModelClient for GaugedModel {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn generate_value(&self, schema: &SchemaSpec, prompt: &str) -> GenerationResult<Value> {
        if schema.name != DETAILS {
            return self.inner.generate_value(schema, prompt).await;
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let result = self.inner.generate_value(schema, prompt).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[tokio::test]
async fn test_concurrency_caps_records_in_flight() {
    let gauged = Arc::new(GaugedModel {
        inner: fast_model(),
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let orchestrator = Orchestrator::new(
        ModelTiers::new(gauged.clone(), Arc::new(smart_model())),
        Arc::new(Taxonomy::default()),
        EnrichConfig::default().with_concurrency(2),
        Arc::new(CallCounters::new()),
    );
    let driver = BatchDriver::new(orchestrator).with_limiter(Arc::new(RateLimiter::unlimited()));

    let outcome = driver.run(records(&["a", "b", "c", "d", "e", "f"])).await;

    assert_eq!(outcome.summary.enriched, 6);
    assert_eq!(gauged.peak.load(Ordering::SeqCst), 2);
    assert_eq!(gauged.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_shared_limiter_is_used() {
    let (driver, _fast, _smart) = new_driver(EnrichConfig::default());
    let driver = driver.with_limiter(Arc::new(RateLimiter::unlimited()));

    let outcome = driver.run(records(&["a"])).await;
    assert_eq!(outcome.summary.enriched, 1);
}

#[tokio::test]
async fn test_persist_writes_failure_snapshot_only_when_needed() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    let (driver, _fast, _smart) = new_driver(EnrichConfig::default());
    driver
        .run_and_persist(records(&["alpha"]), &store, "20240601T000000")
        .await
        .unwrap();

    assert!(store.path_for(SnapshotKind::Enriched, "20240601T000000").exists());
    assert!(!store.path_for(SnapshotKind::FailedEnriched, "20240601T000000").exists());

    let (driver, _fast, _smart) = new_driver(EnrichConfig::default());
    driver
        .run_and_persist(records(&["alpha", "broken"]), &store, "20240602T000000")
        .await
        .unwrap();

    let (version, enriched) = store
        .read_latest::<EnrichedRecord>(SnapshotKind::Enriched)
        .await
        .unwrap();
    assert_eq!(version, "20240602T000000");
    assert_eq!(enriched.len(), 1);
    assert_eq!(enriched[0].codename(), "Tool");
    assert_eq!(enriched[0].enrichment().tags(), ["libraries"]);

    let (_, failed) = store
        .read_latest::<FailureRecord>(SnapshotKind::FailedEnriched)
        .await
        .unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].record, sample_raw_record("broken"));
}
