//! Enrichment orchestrator.
//!
//! Turns one [`RawRecord`] into an [`EnrichedRecord`] by walking an ordered
//! list of attempt states. Each state is a different recovery strategy, not
//! a repeat of the same call:
//!
//! ```text
//! SeparateRequests ──fail──▶ FixPrompt ──fail──▶ FallbackModel ──fail──▶ Exhausted
//!        │                       │                     │
//!        └──────── ok ───────────┴──────── ok ─────────┴──▶ EnrichedRecord
//! ```
//!
//! 1. **SeparateRequests**: fast-tier "details" and "filters" calls in
//!    parallel. Out-of-taxonomy tags/labels get one smart-tier repair call.
//!    Values are then filtered and truncated, the category defaults to
//!    `"undefined"`, and the result is strictly validated.
//! 2. **FixPrompt**: one smart-tier call with the strict schema and a
//!    full-repair prompt.
//! 3. **FallbackModel**: one smart-tier call with the strict schema and the
//!    one-shot enrichment prompt.
//!
//! Any generation or validation failure ends the current state and advances
//! to the next. Nothing is retried inside a state.

use std::sync::Arc;

use ai_client::SchemaSpec;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{AttemptError, EnrichmentError, GenerationError, GenerationResult};
use crate::pipeline::prompts;
use crate::pipeline::schemas::SchemaSet;
use crate::pipeline::usage::CallCounters;
use crate::pipeline::validate::Validator;
use crate::traits::model::{ModelClient, ModelClientExt};
use crate::types::candidate::{
    DetailsOutput, EnrichmentCandidate, FiltersOutput, LabelTagFix, ValidCandidate,
};
use crate::types::config::{EnrichConfig, FixPromptInput, ModelTier};
use crate::types::record::{EnrichedRecord, RawRecord};
use crate::types::taxonomy::{Taxonomy, UNDEFINED_CATEGORY};

/// The fast and smart model for a run.
#[derive(Clone)]
pub struct ModelTiers {
    pub fast: Arc<dyn ModelClient>,
    pub smart: Arc<dyn ModelClient>,
}

impl ModelTiers {
    pub fn new(fast: Arc<dyn ModelClient>, smart: Arc<dyn ModelClient>) -> Self {
        Self { fast, smart }
    }

    pub fn get(&self, tier: ModelTier) -> &dyn ModelClient {
        match tier {
            ModelTier::Fast => self.fast.as_ref(),
            ModelTier::Smart => self.smart.as_ref(),
        }
    }
}

impl std::fmt::Debug for ModelTiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelTiers")
            .field("fast", &self.fast.model_name())
            .field("smart", &self.smart.model_name())
            .finish()
    }
}

/// One recovery strategy in the attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptState {
    SeparateRequests,
    FixPrompt,
    FallbackModel,
}

impl AttemptState {
    pub const SEQUENCE: [AttemptState; 3] = [
        AttemptState::SeparateRequests,
        AttemptState::FixPrompt,
        AttemptState::FallbackModel,
    ];

    pub fn first() -> Self {
        AttemptState::SeparateRequests
    }

    /// The state to try after this one fails.
    pub fn next(self) -> Option<Self> {
        match self {
            AttemptState::SeparateRequests => Some(AttemptState::FixPrompt),
            AttemptState::FixPrompt => Some(AttemptState::FallbackModel),
            AttemptState::FallbackModel => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttemptState::SeparateRequests => "separate_requests",
            AttemptState::FixPrompt => "fix_prompt",
            AttemptState::FallbackModel => "fallback_model",
        }
    }
}

/// Per-record bookkeeping across attempts.
#[derive(Debug, Clone, Default)]
pub struct AttemptContext {
    /// 1-based number of the attempt in progress.
    pub attempt: usize,
    pub fast_calls: u32,
    pub smart_calls: u32,
    /// Candidate assembled by the first state, valid or not.
    pub last_candidate: Option<EnrichmentCandidate>,
}

impl AttemptContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn note_call(&mut self, tier: ModelTier) {
        match tier {
            ModelTier::Fast => self.fast_calls += 1,
            ModelTier::Smart => self.smart_calls += 1,
        }
    }
}

/// Drives one record through the attempt states.
///
/// Holds no per-record state; a single instance serves every concurrent
/// record in a batch.
pub struct Orchestrator {
    models: ModelTiers,
    taxonomy: Arc<Taxonomy>,
    schemas: SchemaSet,
    config: EnrichConfig,
    counters: Arc<CallCounters>,
}

impl Orchestrator {
    pub fn new(
        models: ModelTiers,
        taxonomy: Arc<Taxonomy>,
        config: EnrichConfig,
        counters: Arc<CallCounters>,
    ) -> Self {
        let schemas = SchemaSet::new(&taxonomy);
        Self {
            models,
            taxonomy,
            schemas,
            config,
            counters,
        }
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn counters(&self) -> &Arc<CallCounters> {
        &self.counters
    }

    fn validator(&self) -> Validator<'_> {
        Validator::new(&self.taxonomy).with_caps(self.config.max_tags, self.config.max_labels)
    }

    /// Enrich one record, advancing through the attempt states until one
    /// yields a valid candidate or `max_attempts` states have failed.
    pub async fn enrich(&self, record: &RawRecord) -> Result<EnrichedRecord, EnrichmentError> {
        let max_attempts = self.config.max_attempts.clamp(1, AttemptState::SEQUENCE.len());
        let mut ctx = AttemptContext::new();
        let mut state = AttemptState::first();

        loop {
            ctx.attempt += 1;
            debug!(
                identifier = %record.identifier,
                attempt = ctx.attempt,
                state = state.name(),
                "Starting enrichment attempt"
            );

            match self.run_state(state, record, &mut ctx).await {
                Ok(valid) => {
                    info!(
                        identifier = %record.identifier,
                        attempt = ctx.attempt,
                        state = state.name(),
                        fast_calls = ctx.fast_calls,
                        smart_calls = ctx.smart_calls,
                        "Record enriched"
                    );
                    return Ok(EnrichedRecord::new(record.clone(), valid));
                }
                Err(error) => {
                    warn!(
                        identifier = %record.identifier,
                        attempt = ctx.attempt,
                        state = state.name(),
                        error = %error,
                        "Enrichment attempt failed"
                    );

                    match state.next().filter(|_| ctx.attempt < max_attempts) {
                        Some(next) => state = next,
                        None => {
                            return Err(EnrichmentError::Exhausted {
                                identifier: record.identifier.clone(),
                                attempts: ctx.attempt,
                                last_error: error,
                            })
                        }
                    }
                }
            }
        }
    }

    /// Run a single state's handler.
    pub async fn run_state(
        &self,
        state: AttemptState,
        record: &RawRecord,
        ctx: &mut AttemptContext,
    ) -> Result<ValidCandidate, AttemptError> {
        match state {
            AttemptState::SeparateRequests => self.separate_requests(record, ctx).await,
            AttemptState::FixPrompt => self.fix_prompt(record, ctx).await,
            AttemptState::FallbackModel => self.fallback_model(record, ctx).await,
        }
    }

    /// State 1: parallel details + filters, optional repair, combine, validate.
    pub async fn separate_requests(
        &self,
        record: &RawRecord,
        ctx: &mut AttemptContext,
    ) -> Result<ValidCandidate, AttemptError> {
        let details_prompt = prompts::details_prompt(record, &self.taxonomy);
        let filters_prompt = prompts::filters_prompt(record, &self.taxonomy);

        self.issue(ModelTier::Fast, ctx);
        self.issue(ModelTier::Fast, ctx);
        let (details, filters) = tokio::try_join!(
            self.call::<DetailsOutput>(ModelTier::Fast, &self.schemas.details, &details_prompt),
            self.call::<FiltersOutput>(ModelTier::Fast, &self.schemas.filters, &filters_prompt),
        )?;

        let validator = self.validator();
        let (tags, labels) = match validator.check_membership(&filters.tags, &filters.labels) {
            Ok(()) => (filters.tags, filters.labels),
            Err(violation) => {
                debug!(
                    identifier = %record.identifier,
                    violation = %violation,
                    "Repairing filters output"
                );
                let prompt =
                    prompts::label_tag_fix_prompt(&filters.tags, &filters.labels, &self.taxonomy);
                self.issue(ModelTier::Smart, ctx);
                let fix: LabelTagFix = self
                    .call(ModelTier::Smart, &self.schemas.label_tag_fix, &prompt)
                    .await?;
                (fix.tags, fix.labels)
            }
        };

        let category = filters
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNDEFINED_CATEGORY.to_string());

        let candidate = EnrichmentCandidate {
            category,
            tags: validator.filter_tags(&tags),
            labels: validator.filter_labels(&labels),
            codename: details.codename,
            punchline: details.punchline,
            description: details.description,
        };
        ctx.last_candidate = Some(candidate.clone());

        Ok(validator.validate(candidate)?)
    }

    /// State 2: smart-tier full repair with the strict schema.
    pub async fn fix_prompt(
        &self,
        record: &RawRecord,
        ctx: &mut AttemptContext,
    ) -> Result<ValidCandidate, AttemptError> {
        let failed_output = match self.config.fix_prompt_input {
            FixPromptInput::EmptyPlaceholder => Value::Object(Default::default()),
            FixPromptInput::PriorCandidate => ctx
                .last_candidate
                .as_ref()
                .and_then(|c| serde_json::to_value(c).ok())
                .unwrap_or_else(|| Value::Object(Default::default())),
        };
        let prompt = prompts::fix_prompt(record, &self.taxonomy, &failed_output);

        self.strict_call(&prompt, ctx).await
    }

    /// State 3: smart-tier one-shot enrichment with the strict schema.
    pub async fn fallback_model(
        &self,
        record: &RawRecord,
        ctx: &mut AttemptContext,
    ) -> Result<ValidCandidate, AttemptError> {
        let prompt = prompts::enrichment_prompt(record, &self.taxonomy);
        self.strict_call(&prompt, ctx).await
    }

    async fn strict_call(
        &self,
        prompt: &str,
        ctx: &mut AttemptContext,
    ) -> Result<ValidCandidate, AttemptError> {
        self.issue(ModelTier::Smart, ctx);
        let candidate: EnrichmentCandidate = self
            .call(ModelTier::Smart, &self.schemas.strict, prompt)
            .await?;
        Ok(self.validator().validate(candidate)?)
    }

    /// Count a call at issue time, whether or not it succeeds.
    fn issue(&self, tier: ModelTier, ctx: &mut AttemptContext) {
        ctx.note_call(tier);
        self.counters.record(tier);
    }

    async fn call<T>(
        &self,
        tier: ModelTier,
        schema: &SchemaSpec,
        prompt: &str,
    ) -> GenerationResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.models.get(tier);
        let generation = client.generate(schema, prompt);

        match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, generation)
                .await
                .map_err(|_| GenerationError::Timeout {
                    model: client.model_name().to_string(),
                    schema: schema.name.clone(),
                })?,
            None => generation.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_sequence() {
        let mut state = AttemptState::first();
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            seen.push(next);
            state = next;
        }
        assert_eq!(seen, AttemptState::SEQUENCE);
    }

    #[test]
    fn test_state_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            AttemptState::SEQUENCE.iter().map(AttemptState::name).collect();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_context_counts_by_tier() {
        let mut ctx = AttemptContext::new();
        ctx.note_call(ModelTier::Fast);
        ctx.note_call(ModelTier::Fast);
        ctx.note_call(ModelTier::Smart);
        assert_eq!((ctx.fast_calls, ctx.smart_calls), (2, 1));
    }
}
