//! [`ModelClient`] backed by a real provider through `ai-client`.

use std::sync::Arc;
use std::time::Duration;

use ai_client::{AiClient, AiError, ApiKey, SchemaSpec};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::{GenerationError, GenerationResult};
use crate::pipeline::orchestrator::ModelTiers;
use crate::traits::model::ModelClient;
use crate::types::config::ModelSelection;

#[async_trait]
impl ModelClient for AiClient {
    fn model_name(&self) -> &str {
        self.model()
    }

    async fn generate_value(&self, schema: &SchemaSpec, prompt: &str) -> GenerationResult<Value> {
        self.generate_structured(schema, prompt)
            .await
            .map_err(|e| into_generation_error(self.model(), &schema.name, e))
    }
}

fn into_generation_error(model: &str, schema: &str, error: AiError) -> GenerationError {
    match error {
        AiError::EmptyResponse(_) => GenerationError::Empty {
            model: model.to_string(),
            schema: schema.to_string(),
        },
        AiError::Parse(reason) => GenerationError::Malformed {
            model: model.to_string(),
            schema: schema.to_string(),
            reason,
        },
        e if e.is_timeout() => GenerationError::Timeout {
            model: model.to_string(),
            schema: schema.to_string(),
        },
        e => GenerationError::Backend {
            model: model.to_string(),
            message: e.to_string(),
        },
    }
}

impl ModelTiers {
    /// Build both tiers against one provider.
    pub fn from_selection(
        selection: &ModelSelection,
        api_key: ApiKey,
        timeout: Option<Duration>,
    ) -> Self {
        let build = |model: &str| {
            let client = AiClient::new(selection.provider, api_key.clone(), model);
            match timeout {
                Some(timeout) => client.with_timeout(timeout),
                None => client,
            }
        };

        ModelTiers::new(
            Arc::new(build(&selection.fast_model)),
            Arc::new(build(&selection.smart_model)),
        )
    }
}
