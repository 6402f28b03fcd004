//! Typed errors for the seeding pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Binaries wrap these
//! with context at the edges.

use std::path::PathBuf;

use thiserror::Error;

/// A single structured-generation call failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport or provider failure
    #[error("{model}: {message}")]
    Backend { model: String, message: String },

    /// Output parsed but does not fit the requested schema
    #[error("{model} returned output that does not match `{schema}`: {reason}")]
    Malformed {
        model: String,
        schema: String,
        reason: String,
    },

    /// Output was missing or an empty object
    #[error("{model} returned an empty `{schema}` object")]
    Empty { model: String, schema: String },

    /// Call exceeded the configured per-call timeout
    #[error("{model} timed out generating `{schema}`")]
    Timeout { model: String, schema: String },
}

/// A candidate (or filters output) violates the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown category: {0:?}")]
    UnknownCategory(String),

    #[error("unknown tags: {0:?}")]
    UnknownTags(Vec<String>),

    #[error("unknown labels: {0:?}")]
    UnknownLabels(Vec<String>),

    #[error("too many tags: {count} (max {max})")]
    TooManyTags { count: usize, max: usize },

    #[error("too many labels: {count} (max {max})")]
    TooManyLabels { count: usize, max: usize },
}

/// Why one attempt state failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// A record could not be enriched.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// Every attempt state ran and failed
    #[error("enrichment of {identifier} exhausted after {attempts} attempts: {last_error}")]
    Exhausted {
        identifier: String,
        attempts: usize,
        #[source]
        last_error: AttemptError,
    },
}

/// Taxonomy definitions that break their own invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("label group {0:?} is not a category")]
    UnknownGroup(String),

    #[error("taxonomy has no {0}")]
    Empty(&'static str),
}

/// Errors that can occur while fetching a seed page.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Connection timeout
    #[error("timeout crawling: {url}")]
    Timeout { url: String },
}

/// Errors raised while uploading logos or writing catalog rows.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to upload {key}: {reason}")]
    Upload { key: String, reason: String },

    /// The fallback image could not be read or stored either
    #[error("placeholder upload for {key} failed: {reason}")]
    Placeholder { key: String, reason: String },

    #[error("catalog error: {0}")]
    Catalog(String),
}

/// Snapshot file errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}", path = path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no {kind} snapshot in {dir}", dir = dir.display())]
    NotFound { kind: String, dir: PathBuf },
}

/// Result type alias for generation calls.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;

/// Result type alias for seed operations.
pub type SeedResult<T> = std::result::Result<T, SeedError>;

/// Result type alias for snapshot operations.
pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;
