//! Structured-generation trait.

use ai_client::SchemaSpec;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GenerationError, GenerationResult};

/// One model at one tier.
///
/// Stateless per call and safe to share across tasks. Implementations
/// return the raw JSON object the model produced for `schema`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, used in logs and errors.
    fn model_name(&self) -> &str;

    /// Ask for an object conforming to `schema`.
    async fn generate_value(&self, schema: &SchemaSpec, prompt: &str) -> GenerationResult<Value>;
}

/// Typed generation on top of [`ModelClient`].
#[async_trait]
pub trait ModelClientExt: ModelClient {
    /// Generate and deserialize into `T`.
    ///
    /// `null` and `{}` are [`GenerationError::Empty`]; anything that does not
    /// deserialize is [`GenerationError::Malformed`].
    async fn generate<T>(&self, schema: &SchemaSpec, prompt: &str) -> GenerationResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let value = self.generate_value(schema, prompt).await?;
        let empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            return Err(GenerationError::Empty {
                model: self.model_name().to_string(),
                schema: schema.name.clone(),
            });
        }

        serde_json::from_value(value).map_err(|e| GenerationError::Malformed {
            model: self.model_name().to_string(),
            schema: schema.name.clone(),
            reason: e.to_string(),
        })
    }
}

impl<M: ModelClient + ?Sized> ModelClientExt for M {}
