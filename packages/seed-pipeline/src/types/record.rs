//! Records flowing between the pipeline stages.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::ValidCandidate;
use crate::error::ValidationError;
use crate::pipeline::validate::Validator;

/// One scraped page, as produced by the crawl stage.
///
/// Immutable input to enrichment; every later record carries it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Slug derived from the page title; unique key candidate.
    pub identifier: String,

    /// Page the record was scraped from.
    pub source_url: String,

    pub short_title: String,

    /// Meta description, at most 500 characters.
    pub short_description: String,

    /// Headline text scraped from the page. Long and noisy.
    #[serde(default)]
    pub extracted_text: String,

    /// Absolute URL of the best logo candidate.
    #[serde(default)]
    pub logo_url: String,

    #[serde(default)]
    pub submitted_by: String,
}

impl RawRecord {
    pub fn new(identifier: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source_url: source_url.into(),
            short_title: String::new(),
            short_description: String::new(),
            extracted_text: String::new(),
            logo_url: String::new(),
            submitted_by: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.short_title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = description.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.extracted_text = text.into();
        self
    }

    pub fn with_logo(mut self, url: impl Into<String>) -> Self {
        self.logo_url = url.into();
        self
    }

    pub fn with_submitter(mut self, name: impl Into<String>) -> Self {
        self.submitted_by = name.into();
        self
    }
}

/// A raw record with a validated taxonomy assignment.
///
/// Serialized flat: the raw fields and the enrichment fields side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    source: RawRecord,

    #[serde(flatten)]
    enrichment: ValidCandidate,
}

impl EnrichedRecord {
    pub fn new(source: RawRecord, enrichment: ValidCandidate) -> Self {
        Self { source, enrichment }
    }

    pub fn source(&self) -> &RawRecord {
        &self.source
    }

    pub fn enrichment(&self) -> &ValidCandidate {
        &self.enrichment
    }

    pub fn identifier(&self) -> &str {
        &self.source.identifier
    }

    pub fn codename(&self) -> &str {
        self.enrichment.codename()
    }

    /// Run strict validation again, e.g. on a record read from a snapshot.
    pub fn revalidate(&self, validator: &Validator<'_>) -> Result<Self, ValidationError> {
        let enrichment = validator.validate(self.enrichment.clone().into_candidate())?;
        Ok(Self::new(self.source.clone(), enrichment))
    }
}

/// A raw record that exhausted every enrichment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(flatten)]
    pub record: RawRecord,

    /// Display form of the last attempt's error.
    pub error: String,
}

/// An enriched record the seed stage could not store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    #[serde(flatten)]
    pub record: EnrichedRecord,

    pub error: String,
}

/// Row written to the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub codename: String,
    pub punchline: String,
    pub description: String,
    pub product_website: String,
    pub logo_src: String,
    pub categories: String,
    pub labels: Vec<String>,
    pub tags: Vec<String>,
    pub full_name: String,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub twitter_handle: String,
    pub view_count: i32,
    pub approved: bool,
}
