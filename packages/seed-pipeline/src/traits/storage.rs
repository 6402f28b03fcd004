//! Sinks used by the seed stage.

use async_trait::async_trait;

use crate::error::SeedResult;
use crate::types::record::ProductRow;

/// Downloads logo images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> SeedResult<Vec<u8>>;
}

/// Bucketed object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `bucket/key`, replacing any existing object.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> SeedResult<()>;

    /// Publicly reachable URL for `bucket/key`.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Taxonomy lookup tables in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyTable {
    Categories,
    Labels,
    Tags,
}

impl TaxonomyTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            TaxonomyTable::Categories => "categories",
            TaxonomyTable::Labels => "labels",
            TaxonomyTable::Tags => "tags",
        }
    }
}

/// The product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Get-or-create a taxonomy row by name. Idempotent.
    async fn ensure_entity(&self, table: TaxonomyTable, name: &str) -> SeedResult<()>;

    /// Insert or replace rows keyed by codename.
    async fn upsert_products(&self, rows: &[ProductRow]) -> SeedResult<()>;
}
