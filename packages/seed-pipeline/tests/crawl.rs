//! Crawl driver with a scripted scraper.

use std::time::Duration;

use seed_pipeline::crawl::{crawl, crawl_and_save, prepare_seeds};
use seed_pipeline::testing::{sample_raw_record, MockScraper};
use seed_pipeline::{CrawlConfig, RawRecord, SnapshotKind, SnapshotStore};

fn config() -> CrawlConfig {
    CrawlConfig::new().with_retry_delay(Duration::ZERO)
}

#[test]
fn test_prepare_seeds_dedupes_and_rejects() {
    let (valid, invalid) = prepare_seeds(&[
        " https://a.example.com/ ",
        "https://a.example.com",
        "",
        "ftp://files.example.com/",
        "not a url",
        "https://b.example.com/docs",
    ]);

    assert_eq!(valid, ["https://a.example.com/", "https://b.example.com/docs"]);
    assert_eq!(invalid.len(), 2);
    assert!(invalid.iter().all(|a| a.attempts == 0));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let scraper = MockScraper::new()
        .with_page(sample_raw_record("alpha"))
        .fail_times("https://alpha.example.com/", 2);

    let report = crawl(&scraper, &["https://alpha.example.com/"], &config()).await;

    assert_eq!(report.records, vec![sample_raw_record("alpha")]);
    assert!(report.abandoned.is_empty());
    assert_eq!(scraper.calls_for("https://alpha.example.com/"), 3);
}

#[tokio::test]
async fn test_url_is_abandoned_after_max_attempts() {
    let scraper = MockScraper::new()
        .with_page(sample_raw_record("alpha"))
        .with_page(sample_raw_record("beta"))
        .fail_times("https://alpha.example.com/", 3);

    let report = crawl(
        &scraper,
        &["https://alpha.example.com/", "https://beta.example.com/"],
        &config(),
    )
    .await;

    assert_eq!(report.records, vec![sample_raw_record("beta")]);
    assert_eq!(report.abandoned.len(), 1);
    assert_eq!(report.abandoned[0].url, "https://alpha.example.com/");
    assert_eq!(report.abandoned[0].attempts, 3);
    assert_eq!(scraper.calls_for("https://alpha.example.com/"), 3);
}

#[tokio::test]
async fn test_crawl_and_save_writes_raw_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());
    let scraper = MockScraper::new().with_page(sample_raw_record("alpha"));

    let report = crawl_and_save(
        &scraper,
        &["https://alpha.example.com/", "https://missing.example.com/"],
        &config().with_max_attempts(1),
        &store,
        "20240601T000000",
    )
    .await
    .unwrap();

    assert_eq!(report.abandoned.len(), 1);
    assert!(report.abandoned[0].error.contains("404"));

    let (version, records) = store.read_latest::<RawRecord>(SnapshotKind::Raw).await.unwrap();
    assert_eq!(version, "20240601T000000");
    assert_eq!(records, vec![sample_raw_record("alpha")]);
}
