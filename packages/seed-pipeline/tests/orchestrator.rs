//! Orchestrator behavior against scripted models.

use std::sync::Arc;
use std::time::Duration;

use seed_pipeline::error::{AttemptError, EnrichmentError, GenerationError, ValidationError};
use seed_pipeline::pipeline::schemas::{DETAILS, ENRICHMENT, FILTERS, LABEL_TAG_FIX};
use seed_pipeline::testing::{
    candidate_json, details_json, filters_json, fix_json, sample_raw_record, MockModel, MockReply,
};
use seed_pipeline::{
    CallCounters, EnrichConfig, FixPromptInput, ModelTiers, Orchestrator, RawRecord, Taxonomy,
};

fn orchestrator(
    fast: &Arc<MockModel>,
    smart: &Arc<MockModel>,
    config: EnrichConfig,
) -> Orchestrator {
    Orchestrator::new(
        ModelTiers::new(fast.clone(), smart.clone()),
        Arc::new(Taxonomy::default()),
        config,
        Arc::new(CallCounters::default()),
    )
}

fn pixelperfect() -> RawRecord {
    RawRecord::new("pixelperfect", "https://pixelperfect.example.com/")
        .with_title("PixelPerfect")
        .with_description(
            "A comprehensive design tool for creating pixel-perfect UI components and prototypes.",
        )
        .with_text(
            "PixelPerfect - Design stunning UIs - Create precise prototypes - Perfect your design workflow",
        )
}

fn good_fast() -> MockModel {
    MockModel::new("fast")
        .with_reply(
            DETAILS,
            details_json(
                "Pixel Perfect UI",
                "Perfect Your Pixels",
                "A comprehensive design tool for pixel-perfect UI components.",
            ),
        )
        .with_reply(
            FILTERS,
            filters_json("design", &["design systems", "ui kits", "icons"], &["ui", "tools"]),
        )
}

#[tokio::test]
async fn test_first_state_success_uses_two_fast_calls() {
    let fast = Arc::new(good_fast());
    let smart = Arc::new(MockModel::new("smart"));
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    let e = enriched.enrichment();
    assert_eq!(e.codename(), "Pixel Perfect UI");
    assert_eq!(e.punchline(), "Perfect Your Pixels");
    assert_eq!(e.category(), "design");
    assert_eq!(e.tags(), ["design systems", "ui kits", "icons"]);
    assert_eq!(e.labels(), ["ui", "tools"]);
    assert_eq!(enriched.source(), &pixelperfect());

    assert_eq!(fast.calls_for(DETAILS).len(), 1);
    assert_eq!(fast.calls_for(FILTERS).len(), 1);
    assert_eq!(smart.call_count(), 0);

    let totals = orchestrator.counters().totals();
    assert_eq!((totals.fast, totals.smart), (2, 0));
}

#[tokio::test]
async fn test_prompts_carry_record_and_taxonomy() {
    let fast = Arc::new(good_fast());
    let smart = Arc::new(MockModel::new("smart"));
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    orchestrator.enrich(&pixelperfect()).await.unwrap();

    let filters_prompt = &fast.calls_for(FILTERS)[0].prompt;
    assert!(filters_prompt.contains("Site Name: \"pixelperfect\""));
    assert!(filters_prompt.contains("\"design systems\""));
    assert!(filters_prompt.contains("typography"));
}

#[tokio::test]
async fn test_out_of_taxonomy_tag_gets_one_repair_call() {
    let fast = Arc::new(
        good_fast().with_reply(FILTERS, filters_json("design", &["ui-kit", "icons"], &["ui"])),
    );
    let smart = Arc::new(
        MockModel::new("smart")
            .with_reply(LABEL_TAG_FIX, fix_json(&["ui kits", "icons"], &["ui"])),
    );
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    assert_eq!(enriched.enrichment().tags(), ["ui kits", "icons"]);
    assert_eq!(enriched.enrichment().labels(), ["ui"]);

    let repairs = smart.calls_for(LABEL_TAG_FIX);
    assert_eq!(repairs.len(), 1);
    assert!(repairs[0].prompt.contains("\"ui-kit\""));
    assert_eq!(smart.call_count(), 1);

    let totals = orchestrator.counters().totals();
    assert_eq!((totals.fast, totals.smart), (2, 1));
}

#[tokio::test]
async fn test_repair_output_is_filtered_not_trusted() {
    let fast = Arc::new(
        good_fast().with_reply(FILTERS, filters_json("dev", &["react"], &["front-end"])),
    );
    let smart = Arc::new(
        MockModel::new("smart")
            .with_reply(LABEL_TAG_FIX, fix_json(&["reactjs", "hooks"], &["frontend", "web"])),
    );
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    assert_eq!(enriched.enrichment().category(), "dev");
    assert_eq!(enriched.enrichment().tags(), ["reactjs"]);
    assert_eq!(enriched.enrichment().labels(), ["frontend"]);
}

#[tokio::test]
async fn test_over_cap_filters_are_truncated_without_repair() {
    let fast = Arc::new(good_fast().with_reply(
        FILTERS,
        filters_json(
            "DEV",
            &["Libraries", "frameworks", "components", "state", "databases", "api"],
            &["frontend", "backend", "devops", "ui"],
        ),
    ));
    let smart = Arc::new(MockModel::new("smart"));
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    let e = enriched.enrichment();
    assert_eq!(e.category(), "dev");
    assert_eq!(e.tags(), ["libraries", "frameworks", "components", "state"]);
    assert_eq!(e.labels(), ["frontend", "backend", "devops"]);
    assert_eq!(smart.call_count(), 0);
}

#[tokio::test]
async fn test_missing_category_falls_through_to_fix_prompt() {
    let fast = Arc::new(good_fast().with_reply(
        FILTERS,
        serde_json::json!({ "category": null, "tags": ["icons"], "labels": ["icons"] }),
    ));
    let smart = Arc::new(MockModel::new("smart").with_reply(
        ENRICHMENT,
        candidate_json("PixelPerfect", "design", &["icons"], &["icons"]),
    ));
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    assert_eq!(enriched.enrichment().category(), "design");
    assert_eq!(enriched.codename(), "PixelPerfect");
    assert_eq!(smart.calls_for(ENRICHMENT).len(), 1);

    let totals = orchestrator.counters().totals();
    assert_eq!((totals.fast, totals.smart), (2, 1));
}

#[tokio::test]
async fn test_repair_then_bad_category_uses_one_fix_call() {
    let fast = Arc::new(
        good_fast().with_reply(FILTERS, filters_json("designer", &["ui-kit"], &["ui"])),
    );
    let smart = Arc::new(
        MockModel::new("smart")
            .with_reply(LABEL_TAG_FIX, fix_json(&["ui kits"], &["ui"]))
            .with_reply(
                ENRICHMENT,
                candidate_json("PixelPerfect", "design", &["ui kits"], &["ui"]),
            ),
    );
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    assert_eq!(enriched.enrichment().category(), "design");
    assert_eq!(enriched.enrichment().tags(), ["ui kits"]);
    assert_eq!(smart.calls_for(LABEL_TAG_FIX).len(), 1);
    assert_eq!(smart.calls_for(ENRICHMENT).len(), 1);
    assert_eq!(smart.call_count(), 2);

    let totals = orchestrator.counters().totals();
    assert_eq!((totals.fast, totals.smart), (2, 2));
}

#[tokio::test]
async fn test_fix_prompt_can_show_prior_candidate() {
    let fast = Arc::new(good_fast().with_reply(FILTERS, filters_json("", &["icons"], &["icons"])));
    let smart = Arc::new(MockModel::new("smart").with_reply(
        ENRICHMENT,
        candidate_json("PixelPerfect", "design", &["icons"], &["icons"]),
    ));
    let config = EnrichConfig::default().with_fix_prompt_input(FixPromptInput::PriorCandidate);
    let orchestrator = orchestrator(&fast, &smart, config);

    orchestrator.enrich(&pixelperfect()).await.unwrap();

    let fix = &smart.calls_for(ENRICHMENT)[0].prompt;
    assert!(fix.contains("\"category\": \"undefined\""));
    assert!(fix.contains("\"codename\": \"Pixel Perfect UI\""));
}

#[tokio::test]
async fn test_empty_placeholder_hides_prior_candidate() {
    let fast = Arc::new(good_fast().with_reply(FILTERS, filters_json("", &["icons"], &["icons"])));
    let smart = Arc::new(MockModel::new("smart").with_reply(
        ENRICHMENT,
        candidate_json("PixelPerfect", "design", &["icons"], &["icons"]),
    ));
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    orchestrator.enrich(&pixelperfect()).await.unwrap();

    let fix = &smart.calls_for(ENRICHMENT)[0].prompt;
    assert!(!fix.contains("Pixel Perfect UI"));
}

#[tokio::test]
async fn test_third_state_rescues_record() {
    let fast = Arc::new(MockModel::new("fast").with_failure(DETAILS, "503 overloaded"));
    let smart = Arc::new(
        MockModel::new("smart")
            .then(ENRICHMENT, MockReply::json(candidate_json("X", "nope", &[], &[])))
            .then(ENRICHMENT, MockReply::json(candidate_json("X", "media", &[], &["stock"]))),
    );
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    assert_eq!(enriched.enrichment().category(), "media");
    assert_eq!(enriched.enrichment().labels(), ["stock"]);
    assert_eq!(smart.calls_for(ENRICHMENT).len(), 2);

    let fallback = &smart.calls_for(ENRICHMENT)[1].prompt;
    assert!(fallback.contains("Site Name: \"pixelperfect\""));
}

#[tokio::test]
async fn test_exhausted_after_every_state_fails() {
    let fast = Arc::new(
        MockModel::new("fast")
            .with_failure(DETAILS, "down")
            .with_failure(FILTERS, "down"),
    );
    let smart = Arc::new(MockModel::new("smart").with_reply(
        ENRICHMENT,
        candidate_json(
            "X",
            "design",
            &["icons", "tools", "figma", "gradients", "ui kits"],
            &["ui"],
        ),
    ));
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    let error = orchestrator.enrich(&pixelperfect()).await.unwrap_err();

    match error {
        EnrichmentError::Exhausted {
            identifier,
            attempts,
            last_error,
        } => {
            assert_eq!(identifier, "pixelperfect");
            assert_eq!(attempts, 3);
            assert!(matches!(
                last_error,
                AttemptError::Validation(ValidationError::TooManyTags { count: 5, max: 4 })
            ));
        }
    }

    let totals = orchestrator.counters().totals();
    assert_eq!((totals.fast, totals.smart), (2, 2));
}

#[tokio::test]
async fn test_max_attempts_limits_states() {
    let fast = Arc::new(MockModel::new("fast").with_failure(DETAILS, "down"));
    let smart = Arc::new(MockModel::new("smart"));
    let config = EnrichConfig::default().with_max_attempts(1);
    let orchestrator = orchestrator(&fast, &smart, config);

    let error = orchestrator.enrich(&pixelperfect()).await.unwrap_err();

    let EnrichmentError::Exhausted { attempts, last_error, .. } = error;
    assert_eq!(attempts, 1);
    assert!(matches!(last_error, AttemptError::Generation(GenerationError::Backend { .. })));
    assert_eq!(smart.call_count(), 0);
}

#[tokio::test]
async fn test_empty_object_is_a_generation_failure() {
    let fast = Arc::new(good_fast().with_reply(DETAILS, serde_json::json!({})));
    let smart = Arc::new(MockModel::new("smart"));
    let config = EnrichConfig::default().with_max_attempts(1);
    let orchestrator = orchestrator(&fast, &smart, config);

    let EnrichmentError::Exhausted { last_error, .. } =
        orchestrator.enrich(&pixelperfect()).await.unwrap_err();
    assert!(matches!(last_error, AttemptError::Generation(GenerationError::Empty { .. })));
}

#[tokio::test]
async fn test_slow_call_times_out_and_advances() {
    let fast = Arc::new(
        good_fast().then(DETAILS, MockReply::Hang(Duration::from_secs(5))),
    );
    let smart = Arc::new(MockModel::new("smart").with_reply(
        ENRICHMENT,
        candidate_json("PixelPerfect", "design", &["icons"], &["icons"]),
    ));
    let config = EnrichConfig::default().with_call_timeout(Some(Duration::from_millis(50)));
    let orchestrator = orchestrator(&fast, &smart, config);

    let enriched = orchestrator.enrich(&pixelperfect()).await.unwrap();

    assert_eq!(enriched.codename(), "PixelPerfect");
    assert_eq!(smart.calls_for(ENRICHMENT).len(), 1);
}

#[tokio::test]
async fn test_counters_are_shared_across_records() {
    let fast = Arc::new(good_fast());
    let smart = Arc::new(MockModel::new("smart"));
    let orchestrator = orchestrator(&fast, &smart, EnrichConfig::default());

    for id in ["a", "b", "c"] {
        orchestrator.enrich(&sample_raw_record(id)).await.unwrap();
    }

    assert_eq!(orchestrator.counters().totals().fast, 6);
    assert_eq!(orchestrator.counters().totals().total(), 6);
}
