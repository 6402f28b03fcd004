//! OpenAI backend.
//!
//! Uses chat completions with a `json_schema` response format so the
//! model is constrained to the requested shape.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AiError, Result};
use crate::schema::SchemaSpec;
use crate::types::{
    strip_code_blocks, JsonSchemaFormat, Message, OpenAiRequest, OpenAiResponse, ResponseFormat,
};
use crate::AiClient;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "openai";

pub(crate) fn build_request(client: &AiClient, schema: &SchemaSpec, prompt: &str) -> OpenAiRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = client.system_prompt() {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));

    OpenAiRequest {
        model: client.model().to_string(),
        messages,
        temperature: client.temperature(),
        max_tokens: Some(client.max_tokens()),
        response_format: ResponseFormat {
            format_type: "json_schema",
            json_schema: JsonSchemaFormat {
                name: schema.name.clone(),
                strict: true,
                schema: schema.schema.clone(),
            },
        },
    }
}

pub(crate) fn parse_response(response: OpenAiResponse) -> Result<Value> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or(AiError::EmptyResponse(PROVIDER))?;

    if let Some(refusal) = message.refusal {
        return Err(AiError::Parse(format!("model refused: {}", refusal)));
    }

    let content = message.content.unwrap_or_default();
    let json = strip_code_blocks(&content);
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
        .post(format!("{}/chat/completions", client.base_url()))
        .bearer_auth(client.api_key().expose())
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, model = %request.model, "OpenAI request failed");
            AiError::from(e)
        })?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!(status = %status, error = %message, "OpenAI API error");
        return Err(AiError::Api {
            provider: PROVIDER,
            status: status.as_u16(),
            message,
        });
    }

    let body: OpenAiResponse = response
        .json()
        .await
        .map_err(|e| AiError::Parse(e.to_string()))?;

    debug!(
        model = %request.model,
        schema = %schema.name,
        duration_ms = start.elapsed().as_millis(),
        input_tokens = body.usage.as_ref().map(|u| u.input_tokens).unwrap_or_default(),
        "OpenAI structured completion"
    );

    parse_response(body)
}
