//! Crawl stage: seed URLs in, raw records out.

pub mod http;

pub use http::{extract_record, HttpScraper};

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::error::{CrawlError, PersistenceResult};
use crate::stores::snapshot::{SnapshotKind, SnapshotStore};
use crate::traits::scraper::PageScraper;
use crate::types::config::CrawlConfig;
use crate::types::record::RawRecord;

/// A seed URL that never produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbandonedUrl {
    pub url: String,
    pub attempts: u32,
    pub error: String,
}

/// Result of crawling a seed list.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub records: Vec<RawRecord>,
    pub abandoned: Vec<AbandonedUrl>,
}

/// Trim, validate and deduplicate seed URLs, keeping first occurrences.
///
/// Returns the usable URLs and the ones rejected as invalid.
pub fn prepare_seeds<S: AsRef<str>>(urls: &[S]) -> (Vec<String>, Vec<AbandonedUrl>) {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for raw in urls {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let normalized = url.to_string();
                if seen.insert(normalized.clone()) {
                    valid.push(normalized);
                }
            }
            _ => invalid.push(AbandonedUrl {
                url: trimmed.to_string(),
                attempts: 0,
                error: CrawlError::InvalidUrl {
                    url: trimmed.to_string(),
                }
                .to_string(),
            }),
        }
    }

    (valid, invalid)
}

/// Scrape one URL, retrying up to `config.max_attempts` times.
pub async fn scrape_with_retry<S>(
    scraper: &S,
    url: &str,
    config: &CrawlConfig,
) -> Result<RawRecord, AbandonedUrl>
where
    S: PageScraper + ?Sized,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match scraper.scrape(url).await {
            Ok(record) => return Ok(record),
            Err(e) if attempt < max_attempts => {
                warn!(url, attempt, error = %e, "Scrape failed, retrying");
                if !config.retry_delay.is_zero() {
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
            Err(e) => {
                warn!(url, attempts = attempt, error = %e, "Abandoning URL");
                return Err(AbandonedUrl {
                    url: url.to_string(),
                    attempts: attempt,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Crawl every seed URL with bounded concurrency.
///
/// Failed URLs are reported in the result, never fatal.
pub async fn crawl<S, U>(scraper: &S, urls: &[U], config: &CrawlConfig) -> CrawlReport
where
    S: PageScraper + ?Sized,
    U: AsRef<str>,
{
    let (seeds, invalid) = prepare_seeds(urls);
    info!(
        seeds = seeds.len(),
        invalid = invalid.len(),
        concurrency = config.concurrency,
        "Starting crawl"
    );

    let mut report = CrawlReport {
        records: Vec::with_capacity(seeds.len()),
        abandoned: invalid,
    };

    let mut results = stream::iter(seeds)
        .map(|url| async move { scrape_with_retry(scraper, &url, config).await })
        .buffer_unordered(config.concurrency.max(1));

    while let Some(result) = results.next().await {
        match result {
            Ok(record) => {
                info!(url = %record.source_url, identifier = %record.identifier, "Scraped page");
                report.records.push(record);
            }
            Err(abandoned) => report.abandoned.push(abandoned),
        }
    }

    info!(
        scraped = report.records.len(),
        abandoned = report.abandoned.len(),
        "Crawl finished"
    );
    report
}

/// Crawl and persist the records as a `raw` snapshot.
pub async fn crawl_and_save<S, U>(
    scraper: &S,
    urls: &[U],
    config: &CrawlConfig,
    store: &SnapshotStore,
    version: &str,
) -> PersistenceResult<CrawlReport>
where
    S: PageScraper + ?Sized,
    U: AsRef<str>,
{
    let report = crawl(scraper, urls, config).await;
    store.write(SnapshotKind::Raw, version, &report.records).await?;
    Ok(report)
}
