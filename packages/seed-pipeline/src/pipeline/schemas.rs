//! Model-facing output schemas.

use ai_client::SchemaSpec;

use crate::types::candidate::{DetailsOutput, EnrichmentCandidate, FiltersOutput, LabelTagFix};
use crate::types::taxonomy::Taxonomy;

pub const DETAILS: &str = "product_details";
pub const FILTERS: &str = "product_filters";
pub const LABEL_TAG_FIX: &str = "label_tag_fix";
pub const ENRICHMENT: &str = "product_enrichment";

/// The four schemas, built once per orchestrator.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    /// codename, punchline, description
    pub details: SchemaSpec,
    /// category plus unconstrained tag and label strings
    pub filters: SchemaSpec,
    pub label_tag_fix: SchemaSpec,
    /// Full record with taxonomy enums
    pub strict: SchemaSpec,
}

impl SchemaSet {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        Self {
            details: SchemaSpec::of::<DetailsOutput>(DETAILS),
            filters: SchemaSpec::of::<FiltersOutput>(FILTERS),
            label_tag_fix: SchemaSpec::of::<LabelTagFix>(LABEL_TAG_FIX),
            strict: strict_schema(taxonomy),
        }
    }
}

/// Enrichment schema with category, tag and label enums from `taxonomy`.
pub fn strict_schema(taxonomy: &Taxonomy) -> SchemaSpec {
    SchemaSpec::of::<EnrichmentCandidate>(ENRICHMENT)
        .restrict_enum("category", taxonomy.categories().iter().cloned())
        .restrict_enum("tags", taxonomy.tags().iter().cloned())
        .restrict_enum("labels", taxonomy.all_labels().iter().cloned())
}
