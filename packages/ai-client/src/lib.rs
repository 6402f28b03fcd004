//! Provider-agnostic structured-output client.
//!
//! One [`AiClient`] talks to exactly one provider and one model. Callers
//! hand it a [`SchemaSpec`] and a prompt and get back a JSON object that
//! the provider was asked to conform to the schema.
//!
//! # Example
//!
//! ```rust,ignore
//! use ai_client::{AiClient, Provider, SchemaSpec};
//!
//! let client = AiClient::new(Provider::Anthropic, api_key, "claude-3-haiku-20240307");
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Details { codename: String, punchline: String, description: String }
//!
//! let spec = SchemaSpec::of::<Details>("details");
//! let details: Details = client.extract(&spec, "Describe cult-ui.com").await?;
//! ```
//!
//! Backends:
//! - [`Provider::OpenAI`] - chat completions with `response_format: json_schema`
//! - [`Provider::Anthropic`] - messages API with a forced tool call

mod anthropic;
pub mod credentials;
pub mod error;
mod openai;
pub mod schema;
pub mod types;

pub use credentials::ApiKey;
pub use error::{AiError, Result};
pub use schema::SchemaSpec;
pub use types::{Message, Usage};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Environment variable that conventionally holds this provider's key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAI => openai::DEFAULT_BASE_URL,
            Provider::Anthropic => anthropic::DEFAULT_BASE_URL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(AiError::Config(format!("unknown provider: {}", other))),
        }
    }
}

/// Structured-output client bound to one provider and model.
///
/// Stateless apart from the HTTP connection pool; cheap to clone and safe
/// to share across tasks.
#[derive(Clone)]
pub struct AiClient {
    http: Client,
    provider: Provider,
    api_key: ApiKey,
    model: String,
    base_url: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: u32,
}

impl AiClient {
    /// Create a client for `provider` using `model`.
    pub fn new(provider: Provider, api_key: impl Into<ApiKey>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            provider,
            api_key: api_key.into(),
            model: model.into(),
            base_url: provider.default_base_url().to_string(),
            system_prompt: None,
            temperature: Some(0.0),
            max_tokens: 4096,
        }
    }

    /// Create from the provider's conventional environment variable.
    pub fn from_env(provider: Provider, model: impl Into<String>) -> Result<Self> {
        let key = std::env::var(provider.api_key_var())
            .map_err(|_| AiError::Config(format!("{} not set", provider.api_key_var())))?;
        let key = ApiKey::new(key);
        if key.is_empty() {
            return Err(AiError::Config(format!("{} is empty", provider.api_key_var())));
        }
        Ok(Self::new(provider, key, model))
    }

    /// Set a custom base URL (proxies, gateways, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a system prompt sent with every request.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set sampling temperature (`None` leaves the provider default).
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub(crate) fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub(crate) fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub(crate) fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Ask the model for an object conforming to `schema`.
    ///
    /// Returns the raw JSON object. Empty or non-JSON output is an error.
    pub async fn generate_structured(
        &self,
        schema: &SchemaSpec,
        prompt: &str,
    ) -> Result<serde_json::Value> {
        match self.provider {
            Provider::OpenAI => openai::generate(self, schema, prompt).await,
            Provider::Anthropic => anthropic::generate(self, schema, prompt).await,
        }
    }

    /// Typed variant of [`generate_structured`](Self::generate_structured).
    pub async fn extract<T: DeserializeOwned>(
        &self,
        schema: &SchemaSpec,
        prompt: &str,
    ) -> Result<T> {
        let value = self.generate_structured(schema, prompt).await?;
        serde_json::from_value(value)
            .map_err(|e| AiError::Parse(format!("output does not match `{}`: {}", schema.name, e)))
    }
}

impl fmt::Debug for AiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = AiClient::new(Provider::OpenAI, "sk-test", "gpt-4-turbo")
            .with_base_url("https://proxy.example.com/v1/")
            .with_max_tokens(1024);

        assert_eq!(client.provider(), Provider::OpenAI);
        assert_eq!(client.model(), "gpt-4-turbo");
        assert_eq!(client.base_url(), "https://proxy.example.com/v1");
        assert_eq!(client.max_tokens(), 1024);
    }

    #[test]
    fn test_default_base_urls() {
        let openai = AiClient::new(Provider::OpenAI, "k", "m");
        let anthropic = AiClient::new(Provider::Anthropic, "k", "m");
        assert_eq!(openai.base_url(), "https://api.openai.com/v1");
        assert_eq!(anthropic.base_url(), "https://api.anthropic.com/v1");
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = AiClient::new(Provider::Anthropic, "sk-ant-secret", "claude-3-haiku-20240307");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("claude-3-haiku"));
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!(" anthropic ".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert!("gemini".parse::<Provider>().is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = AiClient::new(Provider::OpenAI, "sk-test", "gpt-3.5-turbo")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let spec = SchemaSpec::new("details", serde_json::json!({"type": "object"}));

        let result = client.generate_structured(&spec, "hello").await;
        assert!(matches!(result, Err(AiError::Network(_))));
    }
}
