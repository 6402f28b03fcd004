//! Page scraping trait for the crawl stage.

use async_trait::async_trait;

use crate::error::CrawlResult;
use crate::types::record::RawRecord;

/// Turns one seed URL into a raw record.
///
/// A single call is a single attempt; retries belong to the crawl driver.
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> CrawlResult<RawRecord>;
}
