//! Seed stage: logo upload plus catalog upsert.
//!
//! For each enriched record:
//! 1. fetch the logo and upload it under `seed-{codename}-{index}-logo.png`,
//!    retrying with exponential backoff, then falling back to a placeholder
//! 2. get-or-create every referenced label, tag and category
//! 3. build a product row
//!
//! Rows are then deduplicated by codename (last wins) and upserted in
//! fixed-size batches. Per-record failures go to a failure report.

#[cfg(feature = "postgres")]
pub mod postgres;
pub mod supabase;

#[cfg(feature = "postgres")]
pub use postgres::PostgresCatalog;
pub use supabase::{HttpImageFetcher, SupabaseStorage};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PersistenceResult, SeedError, SeedResult};
use crate::pipeline::validate::Validator;
use crate::stores::snapshot::{SnapshotKind, SnapshotStore};
use crate::traits::storage::{Catalog, ImageFetcher, ObjectStore, TaxonomyTable};
use crate::types::config::SeedConfig;
use crate::types::record::{EnrichedRecord, ProductRow, SeedFailure};
use crate::types::taxonomy::Taxonomy;

const LOGO_CONTENT_TYPE: &str = "image/png";

/// Storage key for a record's logo.
pub fn logo_key(codename: &str, index: usize) -> String {
    format!("seed-{}-{}-logo.png", codename, index)
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    /// Rows written by successful upsert batches.
    pub seeded: usize,
    /// Rows dropped because a later record had the same codename.
    pub duplicates: usize,
    pub failures: Vec<SeedFailure>,
}

/// Keep one row per codename: the last occurrence's value at the first
/// occurrence's position. Returns the kept rows and how many were dropped.
pub fn dedupe_by_codename<T>(rows: Vec<(ProductRow, T)>) -> (Vec<(ProductRow, T)>, usize) {
    let total = rows.len();
    let mut unique: IndexMap<String, (ProductRow, T)> = IndexMap::with_capacity(total);
    for (row, extra) in rows {
        unique.insert(row.codename.clone(), (row, extra));
    }
    let kept: Vec<_> = unique.into_values().collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Drives the seed stage against pluggable sinks.
pub struct Seeder {
    store: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn ImageFetcher>,
    catalog: Arc<dyn Catalog>,
    config: SeedConfig,
    taxonomy: Arc<Taxonomy>,
}

impl Seeder {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn ImageFetcher>,
        catalog: Arc<dyn Catalog>,
        config: SeedConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            catalog,
            config,
            taxonomy: Arc::new(Taxonomy::default()),
        }
    }

    /// Taxonomy that snapshot records are re-checked against.
    pub fn with_taxonomy(mut self, taxonomy: Arc<Taxonomy>) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    async fn try_upload(&self, url: &str, key: &str) -> SeedResult<()> {
        if url.trim().is_empty() {
            return Err(SeedError::Fetch {
                url: url.to_string(),
                reason: "no logo URL".to_string(),
            });
        }
        let bytes = self.fetcher.fetch(url).await?;
        self.store
            .upload(&self.config.bucket, key, bytes, LOGO_CONTENT_TYPE)
            .await
    }

    async fn upload_placeholder(&self, key: &str) -> SeedResult<()> {
        let bytes = tokio::fs::read(&self.config.placeholder_path)
            .await
            .map_err(|e| SeedError::Placeholder {
                key: key.to_string(),
                reason: format!("{}: {}", self.config.placeholder_path.display(), e),
            })?;

        self.store
            .upload(&self.config.bucket, key, bytes, LOGO_CONTENT_TYPE)
            .await
            .map_err(|e| SeedError::Placeholder {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Upload the image at `url` under `key`.
    ///
    /// Retries `upload_retries` times with `backoff_base * 2^attempt`
    /// between attempts, then uploads the placeholder once. Only a
    /// placeholder failure is an error.
    pub async fn upload_logo(&self, url: &str, key: &str) -> SeedResult<String> {
        let retries = self.config.upload_retries.max(1);

        for attempt in 1..=retries {
            match self.try_upload(url, key).await {
                Ok(()) => {
                    debug!(url, key, attempt, "Logo uploaded");
                    return Ok(self.store.public_url(&self.config.bucket, key));
                }
                Err(e) => {
                    warn!(url, key, attempt, error = %e, "Logo upload attempt failed");
                    if attempt < retries {
                        let delay = self.config.backoff_base * 2u32.saturating_pow(attempt);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }

        info!(url, key, "Falling back to placeholder logo");
        self.upload_placeholder(key).await?;
        Ok(self.store.public_url(&self.config.bucket, key))
    }

    async fn ensure_taxonomy(&self, record: &EnrichedRecord) -> SeedResult<()> {
        let enrichment = record.enrichment();
        for label in enrichment.labels() {
            self.catalog.ensure_entity(TaxonomyTable::Labels, label).await?;
        }
        for tag in enrichment.tags() {
            self.catalog.ensure_entity(TaxonomyTable::Tags, tag).await?;
        }
        self.catalog
            .ensure_entity(TaxonomyTable::Categories, enrichment.category())
            .await
    }

    /// Upload the logo and register taxonomy rows for one record.
    pub async fn prepare(&self, index: usize, record: &EnrichedRecord) -> SeedResult<ProductRow> {
        let key = logo_key(record.codename(), index);
        let logo_src = self.upload_logo(&record.source().logo_url, &key).await?;
        self.ensure_taxonomy(record).await?;

        let enrichment = record.enrichment();
        Ok(ProductRow {
            codename: enrichment.codename().to_string(),
            punchline: enrichment.punchline().to_string(),
            description: enrichment.description().to_string(),
            product_website: record.source().source_url.clone(),
            logo_src,
            categories: enrichment.category().to_string(),
            labels: enrichment.labels().to_vec(),
            tags: enrichment.tags().to_vec(),
            full_name: record.source().submitted_by.clone(),
            user_id: self.config.owner_id,
            email: self.config.contact_email.clone(),
            twitter_handle: self.config.twitter_handle.clone(),
            view_count: 0,
            approved: true,
        })
    }

    /// Seed every record. Per-record and per-batch failures are reported,
    /// never propagated.
    pub async fn seed(&self, records: Vec<EnrichedRecord>) -> SeedReport {
        let total = records.len();
        info!(total, bucket = %self.config.bucket, "Starting seed");

        let prepared: Vec<(usize, EnrichedRecord, SeedResult<ProductRow>)> =
            stream::iter(records.into_iter().enumerate())
                .map(|(index, record)| async move {
                    let row = self.prepare(index, &record).await;
                    (index, record, row)
                })
                .buffered(self.config.concurrency.max(1))
                .collect()
                .await;

        let mut report = SeedReport::default();
        let mut rows = Vec::with_capacity(prepared.len());
        for (index, record, row) in prepared {
            match row {
                Ok(row) => rows.push((row, record)),
                Err(e) => {
                    warn!(index, identifier = %record.identifier(), error = %e, "Skipping record");
                    report.failures.push(SeedFailure {
                        record,
                        error: e.to_string(),
                    });
                }
            }
        }

        let (unique, duplicates) = dedupe_by_codename(rows);
        report.duplicates = duplicates;

        let batch_size = self.config.batch_size.max(1);
        let mut batch_no = 0;
        let mut pending = unique.into_iter().peekable();
        while pending.peek().is_some() {
            batch_no += 1;
            let batch: Vec<(ProductRow, EnrichedRecord)> =
                pending.by_ref().take(batch_size).collect();
            let product_rows: Vec<ProductRow> = batch.iter().map(|(row, _)| row.clone()).collect();

            match self.catalog.upsert_products(&product_rows).await {
                Ok(()) => {
                    info!(batch = batch_no, rows = product_rows.len(), "Upserted products batch");
                    report.seeded += product_rows.len();
                }
                Err(e) => {
                    warn!(
                        batch = batch_no,
                        rows = product_rows.len(),
                        error = %e,
                        "Products batch failed"
                    );
                    let error = e.to_string();
                    report
                        .failures
                        .extend(batch.into_iter().map(|(_, record)| SeedFailure {
                            record,
                            error: error.clone(),
                        }));
                }
            }
        }

        info!(
            seeded = report.seeded,
            duplicates = report.duplicates,
            failed = report.failures.len(),
            "Seeding completed"
        );
        report
    }

    /// Seed the newest enriched snapshot and write the failure report.
    ///
    /// Records that no longer pass strict validation are reported as
    /// failures and never reach storage.
    pub async fn seed_latest(
        &self,
        snapshots: &SnapshotStore,
        version: &str,
    ) -> PersistenceResult<SeedReport> {
        let (source_version, records) = snapshots
            .read_latest::<EnrichedRecord>(SnapshotKind::Enriched)
            .await?;
        info!(
            source_version = %source_version,
            count = records.len(),
            "Seeding enriched snapshot"
        );

        let validator = Validator::new(&self.taxonomy);
        let mut rejected = Vec::new();
        let mut checked = Vec::with_capacity(records.len());
        for record in records {
            match record.revalidate(&validator) {
                Ok(valid) => checked.push(valid),
                Err(e) => {
                    warn!(
                        identifier = %record.identifier(),
                        error = %e,
                        "Snapshot record failed validation"
                    );
                    rejected.push(SeedFailure {
                        record,
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut report = self.seed(checked).await;
        rejected.append(&mut report.failures);
        report.failures = rejected;
        snapshots
            .write(SnapshotKind::FailedSeed, version, &report.failures)
            .await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(codename: &str, punchline: &str) -> ProductRow {
        ProductRow {
            codename: codename.to_string(),
            punchline: punchline.to_string(),
            description: String::new(),
            product_website: String::new(),
            logo_src: String::new(),
            categories: "dev".to_string(),
            labels: vec![],
            tags: vec![],
            full_name: String::new(),
            user_id: None,
            email: String::new(),
            twitter_handle: String::new(),
            view_count: 0,
            approved: true,
        }
    }

    #[test]
    fn test_upload_logo_returns_public_url() {
        use crate::testing::{MemoryCatalog, MemoryImageFetcher, MemoryObjectStore};

        let store = Arc::new(MemoryObjectStore::new());
        let fetcher = Arc::new(
            MemoryImageFetcher::new().with_image("https://a.dev/logo.png", vec![1, 2, 3]),
        );
        let seeder = Seeder::new(
            store.clone(),
            fetcher,
            Arc::new(MemoryCatalog::new()),
            SeedConfig::new(),
        );

        let url = tokio_test::block_on(
            seeder.upload_logo("https://a.dev/logo.png", "seed-a-0-logo.png"),
        )
        .unwrap();

        assert_eq!(url, "memory://product-logos/seed-a-0-logo.png");
        assert_eq!(store.object("product-logos", "seed-a-0-logo.png"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_logo_key() {
        assert_eq!(logo_key("Cult UI", 3), "seed-Cult UI-3-logo.png");
    }

    #[test]
    fn test_dedupe_last_write_wins() {
        let rows = vec![
            (row("a", "first"), 0),
            (row("b", "only"), 1),
            (row("a", "second"), 2),
        ];
        let (kept, dropped) = dedupe_by_codename(rows);

        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].0.codename, "a");
        assert_eq!(kept[0].0.punchline, "second");
        assert_eq!(kept[0].1, 2);
        assert_eq!(kept[1].0.codename, "b");
    }
}
