//! Anthropic backend.
//!
//! Structured output is obtained by declaring a single tool whose
//! `input_schema` is the requested schema and forcing the model to call
//! it. The tool input is the structured object.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AiError, Result};
use crate::schema::SchemaSpec;
use crate::types::{
    strip_code_blocks, AnthropicRequest, AnthropicResponse, AnthropicTool, ContentBlock, Message,
    ToolChoice,
};
use crate::AiClient;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "anthropic";

pub(crate) fn build_request(
    client: &AiClient,
    schema: &SchemaSpec,
    prompt: &str,
) -> AnthropicRequest {
    AnthropicRequest {
        model: client.model().to_string(),
        max_tokens: client.max_tokens(),
        system: client.system_prompt().map(str::to_string),
        temperature: client.temperature(),
        messages: vec![Message::user(prompt)],
        tools: vec![AnthropicTool {
            name: schema.name.clone(),
            description: format!("Record the result as a `{}` object.", schema.name),
            input_schema: schema.schema.clone(),
        }],
        tool_choice: ToolChoice {
            choice_type: "tool",
            name: schema.name.clone(),
        },
    }
}

pub(crate) fn parse_response(response: AnthropicResponse, tool_name: &str) -> Result<Value> {
    let mut text_fallback = None;

    for block in response.content {
        match block {
            ContentBlock::ToolUse { name, input } if name == tool_name => {
                if input.as_object().map_or(true, |o| o.is_empty()) {
                    return Err(AiError::EmptyResponse(PROVIDER));
                }
                return Ok(input);
            }
            ContentBlock::Text { text } if text_fallback.is_none() => text_fallback = Some(text),
            _ => {}
        }
    }

    // Some models answer in text despite the forced tool; accept it if it is JSON.
    let text = text_fallback.ok_or(AiError::EmptyResponse(PROVIDER))?;
    let json = strip_code_blocks(&text);
    if json.is_empty() {
        return Err(AiError::EmptyResponse(PROVIDER));
    }
    serde_json::from_str(json).map_err(|e| AiError::Parse(format!("invalid JSON output: {}", e)))
}

pub(crate) async fn generate(
    client: &AiClient,
    schema: &SchemaSpec,
    prompt: &str,
) -> Result<Value> {
    let request = build_request(client, schema, prompt);
    let start = std::time::Instant::now();

    let response = client
        .http()
        .post(format!("{}/messages", client.base_url()))
        .header("x-api-key", client.api_key().expose())
        .header("anthropic-version", API_VERSION)
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, model = %request.model, "Anthropic request failed");
            AiError::from(e)
        })?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!(status = %status, error = %message, "Anthropic API error");
        return Err(AiError::Api {
            provider: PROVIDER,
            status: status.as_u16(),
            message,
        });
    }

    let body: AnthropicResponse = response
        .json()
        .await
        .map_err(|e| AiError::Parse(e.to_string()))?;

    debug!(
        model = %request.model,
        schema = %schema.name,
        duration_ms = start.elapsed().as_millis(),
        input_tokens = body.usage.as_ref().map(|u| u.input_tokens).unwrap_or_default(),
        "Anthropic structured completion"
    );

    parse_response(body, &schema.name)
}
