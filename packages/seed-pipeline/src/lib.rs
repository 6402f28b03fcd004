//! Directory Seeding Pipeline
//!
//! Populates the resource directory's catalog from a list of product URLs
//! in three stages, each persisting a timestamped JSON snapshot:
//!
//! 1. **Crawl** - scrape title, description, logo and headings per URL
//! 2. **Enrich** - assign a codename, punchline, description, category,
//!    tags and labels with LLM calls constrained by a fixed taxonomy
//! 3. **Seed** - upload logos to object storage and upsert product rows
//!
//! # Design Philosophy
//!
//! - Model output is never trusted: every candidate is checked against the
//!   taxonomy before it leaves the orchestrator
//! - Recovery is a sequence of different strategies, not blind retries
//! - One bad record never fails a batch
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use seed_pipeline::{
//!     BatchDriver, CallCounters, EnrichConfig, ModelTiers, Orchestrator, Taxonomy,
//! };
//! use seed_pipeline::testing::MockModel;
//!
//! let models = ModelTiers::new(
//!     Arc::new(MockModel::new("fast")),
//!     Arc::new(MockModel::new("smart")),
//! );
//! let orchestrator = Orchestrator::new(
//!     models,
//!     Arc::new(Taxonomy::default()),
//!     EnrichConfig::default(),
//!     Arc::new(CallCounters::default()),
//! );
//!
//! let outcome = BatchDriver::new(orchestrator).run(raw_records).await;
//! println!("{} enriched, {} failed", outcome.summary.enriched, outcome.summary.failed);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for models, scrapers, storage and the catalog
//! - [`types`] - Records, taxonomy, model outputs and configuration
//! - [`pipeline`] - Enrichment orchestrator, validation and batching
//! - [`crawl`] - Seed URL scraping with retries
//! - [`seed`] - Logo upload and catalog upsert
//! - [`stores`] - Versioned snapshot files
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod crawl;
pub mod error;
pub mod pipeline;
pub mod seed;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    AttemptError, CrawlError, EnrichmentError, GenerationError, PersistenceError, SeedError,
    TaxonomyError, ValidationError,
};
pub use traits::{
    model::{ModelClient, ModelClientExt},
    scraper::PageScraper,
    storage::{Catalog, ImageFetcher, ObjectStore, TaxonomyTable},
};
pub use types::{
    candidate::{DetailsOutput, EnrichmentCandidate, FiltersOutput, LabelTagFix, ValidCandidate},
    config::{CrawlConfig, EnrichConfig, FixPromptInput, ModelSelection, ModelTier, SeedConfig},
    record::{EnrichedRecord, FailureRecord, ProductRow, RawRecord, SeedFailure},
    taxonomy::{Taxonomy, UNDEFINED_CATEGORY},
};

// Re-export pipeline components
pub use pipeline::{
    AttemptContext, AttemptState, BatchDriver, BatchOutcome, BatchSummary, CallCounters,
    CallTotals, ModelTiers, Orchestrator, RateLimiter, SchemaSet, Validator,
};

// Re-export stages
pub use crawl::{crawl, crawl_and_save, AbandonedUrl, CrawlReport, HttpScraper};
pub use seed::{HttpImageFetcher, SeedReport, Seeder, SupabaseStorage};

#[cfg(feature = "postgres")]
pub use seed::PostgresCatalog;

pub use stores::{new_version, SnapshotKind, SnapshotStore};

// Re-export testing utilities
pub use testing::{MockModel, MockScraper};
