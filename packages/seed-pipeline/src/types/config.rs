//! Configuration types for the three pipeline stages.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ai_client::Provider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Model capability tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Cheaper, lower-capability model used first.
    Fast,
    /// Higher-capability model used for repair and fallback.
    Smart,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Smart => "smart",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the full-repair prompt shows as "the previous failed output".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixPromptInput {
    /// An empty object.
    #[default]
    EmptyPlaceholder,
    /// The candidate assembled by the first attempt, when there is one.
    PriorCandidate,
}

impl FromStr for FixPromptInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "empty" | "empty_placeholder" => Ok(Self::EmptyPlaceholder),
            "prior" | "prior_candidate" => Ok(Self::PriorCandidate),
            other => Err(format!("unknown fix prompt input: {}", other)),
        }
    }
}

/// Provider plus the model name for each tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub provider: Provider,
    pub fast_model: String,
    pub smart_model: String,
}

impl ModelSelection {
    /// Default models for `provider`.
    pub fn defaults_for(provider: Provider) -> Self {
        let (fast, smart) = match provider {
            Provider::Anthropic => ("claude-3-haiku-20240307", "claude-3-sonnet-20240229"),
            Provider::OpenAI => ("gpt-3.5-turbo", "gpt-4-turbo"),
        };
        Self {
            provider,
            fast_model: fast.to_string(),
            smart_model: smart.to_string(),
        }
    }

    pub fn with_fast_model(mut self, model: impl Into<String>) -> Self {
        self.fast_model = model.into();
        self
    }

    pub fn with_smart_model(mut self, model: impl Into<String>) -> Self {
        self.smart_model = model.into();
        self
    }
}

/// Configuration for the enrichment stage.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Attempt states to run per record, 1 to 3. Default: 3.
    pub max_attempts: usize,

    /// Record pipelines allowed to start per `rate_interval`. Default: 7.
    pub rate_limit: u32,

    /// Default: 10 seconds.
    pub rate_interval: Duration,

    /// Records in flight at once. Default: 2.
    pub concurrency: usize,

    /// Default: [`FixPromptInput::EmptyPlaceholder`].
    pub fix_prompt_input: FixPromptInput,

    /// Tags kept after filtering. Default: 4.
    pub max_tags: usize,

    /// Labels kept after filtering. Default: 3.
    pub max_labels: usize,

    /// Upper bound on a single model call. `None` leaves it to the client.
    pub call_timeout: Option<Duration>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit: 7,
            rate_interval: Duration::from_secs(10),
            concurrency: 2,
            fix_prompt_input: FixPromptInput::default(),
            max_tags: 4,
            max_labels: 3,
            call_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl EnrichConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamped to the number of attempt states.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.clamp(1, 3);
        self
    }

    pub fn with_rate_limit(mut self, limit: u32, interval: Duration) -> Self {
        self.rate_limit = limit;
        self.rate_interval = interval;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fix_prompt_input(mut self, input: FixPromptInput) -> Self {
        self.fix_prompt_input = input;
        self
    }

    pub fn with_caps(mut self, max_tags: usize, max_labels: usize) -> Self {
        self.max_tags = max_tags;
        self.max_labels = max_labels;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Configuration for the crawl stage.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Attempts per URL before it is abandoned. Default: 3.
    pub max_attempts: u32,

    /// Pages fetched concurrently. Default: 20.
    pub concurrency: usize,

    /// Per-request timeout. Default: 30 seconds.
    pub timeout: Duration,

    /// Pause between attempts on the same URL.
    pub retry_delay: Duration,

    /// Stored as `submitted_by` on every record.
    pub submitted_by: String,

    pub user_agent: String,

    /// Meta description length cap. Default: 500.
    pub description_limit: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            concurrency: 20,
            timeout: Duration::from_secs(30),
            retry_delay: Duration::from_millis(500),
            submitted_by: "seed-admin-user".to_string(),
            user_agent: "Mozilla/5.0 (compatible; DirectorySeedBot/0.1)".to_string(),
            description_limit: 500,
        }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_submitter(mut self, name: impl Into<String>) -> Self {
        self.submitted_by = name.into();
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

/// Configuration for the seed stage.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Storage bucket for logos. Default: `product-logos`.
    pub bucket: String,

    /// Uploaded in place of a logo that cannot be fetched or stored.
    pub placeholder_path: PathBuf,

    /// Upload attempts before falling back to the placeholder. Default: 3.
    pub upload_retries: u32,

    /// Backoff before retry `n` is `backoff_base * 2^n`. Default: 1 second.
    pub backoff_base: Duration,

    /// Rows per upsert statement. Default: 50.
    pub batch_size: usize,

    /// Records whose images are prepared concurrently. Default: 8.
    pub concurrency: usize,

    /// Owner of the seeded rows.
    pub owner_id: Option<Uuid>,

    pub contact_email: String,
    pub twitter_handle: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            bucket: "product-logos".to_string(),
            placeholder_path: PathBuf::from("./images/placeholder.png"),
            upload_retries: 3,
            backoff_base: Duration::from_secs(1),
            batch_size: 50,
            concurrency: 8,
            owner_id: None,
            contact_email: "seed@example.com".to_string(),
            twitter_handle: "@seed".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_placeholder(mut self, path: impl Into<PathBuf>) -> Self {
        self.placeholder_path = path.into();
        self
    }

    pub fn with_upload_retries(mut self, retries: u32) -> Self {
        self.upload_retries = retries.max(1);
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_owner(mut self, owner: Uuid) -> Self {
        self.owner_id = Some(owner);
        self
    }

    pub fn with_contact(
        mut self,
        email: impl Into<String>,
        twitter_handle: impl Into<String>,
    ) -> Self {
        self.contact_email = email.into();
        self.twitter_handle = twitter_handle.into();
        self
    }
}
