//! Taxonomy validation. Pure; no I/O.
//!
//! Two modes:
//! - **lenient** ([`Validator::filter_tags`], [`Validator::filter_labels`]):
//!   drop unknown values and truncate to the caps, preserving order.
//! - **strict** ([`Validator::validate`]): any unknown value or over-cap
//!   array fails the candidate.

use crate::error::ValidationError;
use crate::types::candidate::{EnrichmentCandidate, ValidCandidate};
use crate::types::taxonomy::Taxonomy;

/// Default tag cap.
pub const MAX_TAGS: usize = 4;

/// Default label cap.
pub const MAX_LABELS: usize = 3;

/// Validates candidates against one taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    taxonomy: &'a Taxonomy,
    max_tags: usize,
    max_labels: usize,
}

impl<'a> Validator<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self {
            taxonomy,
            max_tags: MAX_TAGS,
            max_labels: MAX_LABELS,
        }
    }

    pub fn with_caps(mut self, max_tags: usize, max_labels: usize) -> Self {
        self.max_tags = max_tags;
        self.max_labels = max_labels;
        self
    }

    /// Membership check for raw filters output. Caps are not checked here.
    pub fn check_membership(
        &self,
        tags: &[String],
        labels: &[String],
    ) -> Result<(), ValidationError> {
        let unknown_tags = unknown(tags, |t| self.taxonomy.is_tag(t));
        if !unknown_tags.is_empty() {
            return Err(ValidationError::UnknownTags(unknown_tags));
        }

        let unknown_labels = unknown(labels, |l| self.taxonomy.is_label(l));
        if !unknown_labels.is_empty() {
            return Err(ValidationError::UnknownLabels(unknown_labels));
        }

        Ok(())
    }

    /// Allowed tags in original order, canonicalized, at most `max_tags`.
    pub fn filter_tags(&self, tags: &[String]) -> Vec<String> {
        tags.iter()
            .filter_map(|t| self.taxonomy.tag(t))
            .take(self.max_tags)
            .map(str::to_string)
            .collect()
    }

    /// Allowed labels in original order, canonicalized, at most `max_labels`.
    pub fn filter_labels(&self, labels: &[String]) -> Vec<String> {
        labels
            .iter()
            .filter_map(|l| self.taxonomy.label(l))
            .take(self.max_labels)
            .map(str::to_string)
            .collect()
    }

    /// Strict check: category, then tags, then labels, then caps.
    ///
    /// Enum values come back lowercase; a candidate that is already valid
    /// is returned unchanged. Empty text fields are accepted.
    pub fn validate(
        &self,
        candidate: EnrichmentCandidate,
    ) -> Result<ValidCandidate, ValidationError> {
        let category = self
            .taxonomy
            .category(&candidate.category)
            .ok_or_else(|| ValidationError::UnknownCategory(candidate.category.clone()))?
            .to_string();

        let unknown_tags = unknown(&candidate.tags, |t| self.taxonomy.is_tag(t));
        if !unknown_tags.is_empty() {
            return Err(ValidationError::UnknownTags(unknown_tags));
        }

        let unknown_labels = unknown(&candidate.labels, |l| self.taxonomy.is_label(l));
        if !unknown_labels.is_empty() {
            return Err(ValidationError::UnknownLabels(unknown_labels));
        }

        if candidate.tags.len() > self.max_tags {
            return Err(ValidationError::TooManyTags {
                count: candidate.tags.len(),
                max: self.max_tags,
            });
        }
        if candidate.labels.len() > self.max_labels {
            return Err(ValidationError::TooManyLabels {
                count: candidate.labels.len(),
                max: self.max_labels,
            });
        }

        let tags = canonical(&candidate.tags, |t| self.taxonomy.tag(t));
        let labels = canonical(&candidate.labels, |l| self.taxonomy.label(l));

        Ok(ValidCandidate::from_checked(EnrichmentCandidate {
            category,
            tags,
            labels,
            ..candidate
        }))
    }
}

fn unknown(values: &[String], known: impl Fn(&str) -> bool) -> Vec<String> {
    values.iter().filter(|v| !known(v.as_str())).cloned().collect()
}

fn canonical<'t>(values: &[String], lookup: impl Fn(&str) -> Option<&'t str>) -> Vec<String> {
    values
        .iter()
        .map(|v| lookup(v.as_str()).map_or_else(|| v.clone(), str::to_string))
        .collect()
}
