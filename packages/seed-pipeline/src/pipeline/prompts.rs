//! LLM prompts for enrichment.
//!
//! Templates are plain text with `{placeholder}` slots. Page content is cut
//! to a short excerpt before it is embedded to keep calls cheap.

use crate::types::record::RawRecord;
use crate::types::taxonomy::Taxonomy;

/// Content characters shown to the details call.
pub const DETAILS_EXCERPT_CHARS: usize = 300;

/// Content characters shown to the filters, enrichment and fix calls.
pub const FULL_EXCERPT_CHARS: usize = 400;

const EXAMPLE_INPUT: &str = r#"Site Name: "PixelPerfect"
Site Description: "A comprehensive design tool for creating pixel-perfect UI components and prototypes."
Site Content: "PixelPerfect - Design stunning UIs - Create precise prototypes - Perfect your design workflow""#;

const DEFINITIONS: &str = r#"Codename: A concise and memorable name for the product.
Punchline: A short, catchy phrase that encapsulates the product's value proposition.
Description: A brief explanation of the product, highlighting its key features and benefits."#;

/// Codename, punchline and description only.
pub const DETAILS_PROMPT: &str = r#"# Objective
Enrich the following product with a codename, punchline, and description.

# Example
- Input
{example}
- Output
{
  "codename": "Pixel Perfect UI",
  "punchline": "Perfect Your Pixels",
  "description": "A comprehensive design tool for creating pixel-perfect UI components and prototypes, enhancing your design workflow with precision."
}

# Definitions
Categories (broad):
- {categories}
{definitions}

# Your Turn
- Input
{input}
- Output
"#;

/// Category, labels and tags only.
pub const FILTERS_PROMPT: &str = r#"# Objective
Enrich the following product with a category, labels, and tags.

# Example
- Input
{example}
- Output
{
  "category": "design",
  "labels": ["ui", "tools"],
  "tags": ["design systems", "ui kits", "icons"]
}

# Definitions
CATEGORY OPTIONS:
- {categories}

LABEL OPTIONS:
{labels}

TAG OPTIONS:
- {tags}

# Instructions
- Ensure all tags, labels, and category are lowercase.
- Maximum of 3 tags, 2 labels, and 1 category.
- Avoid inventing new options. ONLY USE the CATEGORY OPTIONS, LABEL OPTIONS, and TAG OPTIONS.

# Your Turn
- Input
{input}
- Output
"#;

/// Correct tag and label values that fell outside the taxonomy.
pub const LABEL_TAG_FIX_PROMPT: &str = r#"# Objective
Revise the following labels and tags to match the LABEL OPTIONS and TAG OPTIONS.

LABEL OPTIONS:
- {all_labels}

TAG OPTIONS:
- {tags}

# Input
labels to fix: {labels_to_fix}
tags to fix: {tags_to_fix}

# Output
"#;

/// Everything in one call.
pub const ENRICHMENT_PROMPT: &str = r#"# Example
- Input
{example}
- Output
{
  "category": "design",
  "labels": ["ui", "tools"],
  "tags": ["design systems", "ui kits", "icons"],
  "codename": "Pixel Perfect UI",
  "punchline": "Perfect Your Pixels",
  "description": "A comprehensive design tool for creating pixel-perfect UI components and prototypes, enhancing your design workflow with precision."
}

# Objective
Enrich the following product with relevant tags, labels, category, codename, punchline, and description.

# Instructions
- Ensure all tags, labels, and category are lowercase.
- Maximum of 3 tags, 2 labels, and 1 category.
- USE ONLY the provided options for Categories, Labels, and Tags.

# Definitions
Categories (broad):
- {categories}

Labels (less broad):
{labels}

Tags (lesser broad):
- {tags}
{definitions}

# Your Turn
- Input
{input}
- Output
"#;

/// Full repair given a previous failed output.
pub const FIX_PROMPT: &str = r#"# Objective
The previous attempt to enrich the product data failed with the following output:
{failed_output}

Fix the errors in the failed output, particularly the labels and tags, and produce a corrected response that matches the expected schema.

# Instructions
- Ensure all tags, labels, and category are lowercase and selected ONLY from the provided options.
- Maximum of 3 tags, 2 labels, and 1 category.

# Definitions
Categories (broad):
- {categories}

Labels (less broad):
{labels}

Tags (lesser broad):
- {tags}
{definitions}

# Your Turn
- Input
{input}
- Output
"#;

/// Collapse whitespace runs and normalize sentence ends to a single period.
pub fn clean_content(content: &str) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return collapsed;
    }

    collapsed
        .split(". ")
        .map(|sentence| format!("{}.", sentence.trim().trim_end_matches('.')))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `limit` characters of `content`.
pub fn truncate_chars(content: &str, limit: usize) -> &str {
    match content.char_indices().nth(limit) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Truncated and cleaned content for embedding in a prompt.
pub fn excerpt(content: &str, limit: usize) -> String {
    clean_content(truncate_chars(content, limit))
}

fn json_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_default()
}

fn label_options(taxonomy: &Taxonomy) -> String {
    taxonomy
        .label_groups()
        .iter()
        .map(|(category, labels)| format!("- {}: {}", category, json_list(labels)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn input_block(record: &RawRecord, content: &str) -> String {
    let mut block = format!(
        "Site Name: \"{}\"\nSite Description: \"{}\"",
        record.identifier, record.short_description
    );
    if !content.is_empty() {
        block.push_str(&format!("\nSite Content: \"{}\"", content));
    }
    block
}

fn fill_taxonomy(template: &str, taxonomy: &Taxonomy) -> String {
    template
        .replace("{example}", EXAMPLE_INPUT)
        .replace("{definitions}", DEFINITIONS)
        .replace("{categories}", &json_list(taxonomy.categories()))
        .replace("{labels}", &label_options(taxonomy))
        .replace("{all_labels}", &json_list(taxonomy.all_labels()))
        .replace("{tags}", &json_list(taxonomy.tags()))
}

/// Prompt for the details call.
pub fn details_prompt(record: &RawRecord, taxonomy: &Taxonomy) -> String {
    let input = input_block(record, &excerpt(&record.extracted_text, DETAILS_EXCERPT_CHARS));
    fill_taxonomy(DETAILS_PROMPT, taxonomy).replace("{input}", &input)
}

/// Prompt for the filters call.
pub fn filters_prompt(record: &RawRecord, taxonomy: &Taxonomy) -> String {
    let input = input_block(record, &excerpt(&record.extracted_text, FULL_EXCERPT_CHARS));
    fill_taxonomy(FILTERS_PROMPT, taxonomy).replace("{input}", &input)
}

/// Prompt for the label/tag repair call.
pub fn label_tag_fix_prompt(tags: &[String], labels: &[String], taxonomy: &Taxonomy) -> String {
    fill_taxonomy(LABEL_TAG_FIX_PROMPT, taxonomy)
        .replace("{labels_to_fix}", &json_list(labels))
        .replace("{tags_to_fix}", &json_list(tags))
}

/// Prompt for the one-shot enrichment call.
pub fn enrichment_prompt(record: &RawRecord, taxonomy: &Taxonomy) -> String {
    let input = input_block(record, &excerpt(&record.extracted_text, FULL_EXCERPT_CHARS));
    fill_taxonomy(ENRICHMENT_PROMPT, taxonomy).replace("{input}", &input)
}

/// Prompt for the full-repair call.
///
/// Content is truncated but not cleaned.
pub fn fix_prompt(
    record: &RawRecord,
    taxonomy: &Taxonomy,
    failed_output: &serde_json::Value,
) -> String {
    let failed = serde_json::to_string_pretty(failed_output).unwrap_or_else(|_| "{}".to_string());
    let input = input_block(record, truncate_chars(&record.extracted_text, FULL_EXCERPT_CHARS));

    fill_taxonomy(FIX_PROMPT, taxonomy)
        .replace("{failed_output}", &failed)
        .replace("{input}", &input)
}
