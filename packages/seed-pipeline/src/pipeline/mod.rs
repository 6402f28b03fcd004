//! Enrichment pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Prompt construction and output schemas
//! - Parallel fast-tier calls with a smart-tier label/tag repair
//! - Ordered fallback across attempt states
//! - Taxonomy validation (lenient filtering, strict checking)
//! - Rate-limited, bounded-concurrency batches

pub mod batch;
pub mod orchestrator;
pub mod prompts;
pub mod rate_limit;
pub mod schemas;
pub mod usage;
pub mod validate;

pub use batch::{BatchDriver, BatchOutcome, BatchSummary};
pub use orchestrator::{AttemptContext, AttemptState, ModelTiers, Orchestrator};
pub use rate_limit::RateLimiter;
pub use schemas::SchemaSet;
pub use usage::{CallCounters, CallTotals};
pub use validate::{Validator, MAX_LABELS, MAX_TAGS};
