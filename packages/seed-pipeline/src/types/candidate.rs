//! Model outputs and the candidate assembled from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output of the "details" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetailsOutput {
    /// A concise and memorable name for the product.
    pub codename: String,

    /// A short, catchy phrase that carries the value proposition.
    pub punchline: String,

    /// A brief explanation highlighting key features and benefits.
    pub description: String,
}

/// Output of the "filters" call. Values are unconstrained strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FiltersOutput {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub labels: Vec<String>,
}

/// Output of the label/tag repair call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LabelTagFix {
    pub tags: Vec<String>,
    pub labels: Vec<String>,
}

/// Full enrichment as produced by one attempt, before strict validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EnrichmentCandidate {
    pub category: String,
    pub tags: Vec<String>,
    pub labels: Vec<String>,
    pub codename: String,
    pub punchline: String,
    pub description: String,
}

/// A candidate that passed strict validation.
///
/// Built by the validator, or deserialized from an enriched snapshot. A
/// deserialized one is unchecked until [`EnrichedRecord::revalidate`] runs
/// on it, as the seed stage does on load. Fields are read-only.
///
/// [`EnrichedRecord::revalidate`]: crate::types::record::EnrichedRecord::revalidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidCandidate {
    category: String,
    tags: Vec<String>,
    labels: Vec<String>,
    codename: String,
    punchline: String,
    description: String,
}

impl ValidCandidate {
    pub(crate) fn from_checked(candidate: EnrichmentCandidate) -> Self {
        Self {
            category: candidate.category,
            tags: candidate.tags,
            labels: candidate.labels,
            codename: candidate.codename,
            punchline: candidate.punchline,
            description: candidate.description,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn codename(&self) -> &str {
        &self.codename
    }

    pub fn punchline(&self) -> &str {
        &self.punchline
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Back to a mutable candidate, e.g. to feed a repair prompt.
    pub fn into_candidate(self) -> EnrichmentCandidate {
        EnrichmentCandidate {
            category: self.category,
            tags: self.tags,
            labels: self.labels,
            codename: self.codename,
            punchline: self.punchline,
            description: self.description,
        }
    }
}
