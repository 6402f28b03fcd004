use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ai_client::{ApiKey, Provider};
use anyhow::{anyhow, bail, Context, Result};
use dotenvy::dotenv;
use seed_pipeline::{CrawlConfig, EnrichConfig, FixPromptInput, ModelSelection, SeedConfig};
use uuid::Uuid;

/// Model provider, key and per-tier model names.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub selection: ModelSelection,
    pub api_key: ApiKey,
}

/// Supabase Storage credentials.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: ApiKey,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Absent when no provider key is set; only `enrich` needs it.
    pub llm: Option<LlmConfig>,
    pub enrich: EnrichConfig,
    pub crawl: CrawlConfig,
    pub seed: SeedConfig,
    pub storage: Option<StorageConfig>,
    pub database_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let llm = match resolve_provider(
            var("LLM_PROVIDER").as_deref(),
            var("ANTHROPIC_API_KEY").is_some(),
            var("OPENAI_API_KEY").is_some(),
        )? {
            Some(provider) => {
                let key_var = provider.api_key_var();
                let api_key = var(key_var)
                    .with_context(|| format!("{} must be set for provider {}", key_var, provider))?;

                let mut selection = ModelSelection::defaults_for(provider);
                if let Some(model) = var("FAST_MODEL") {
                    selection = selection.with_fast_model(model);
                }
                if let Some(model) = var("SMART_MODEL") {
                    selection = selection.with_smart_model(model);
                }

                Some(LlmConfig {
                    selection,
                    api_key: ApiKey::new(api_key),
                })
            }
            None => None,
        };

        let fix_input: FixPromptInput =
            parse("ENRICH_FIX_PROMPT_INPUT", FixPromptInput::EmptyPlaceholder)?;
        let enrich = EnrichConfig::default()
            .with_rate_limit(
                parse("ENRICH_RATE_LIMIT", 7u32)?,
                Duration::from_secs(parse("ENRICH_RATE_INTERVAL_SECS", 10u64)?),
            )
            .with_concurrency(parse("ENRICH_CONCURRENCY", 2usize)?)
            .with_max_attempts(parse("ENRICH_MAX_ATTEMPTS", 3usize)?)
            .with_fix_prompt_input(fix_input);

        let mut crawl = CrawlConfig::default()
            .with_max_attempts(parse("CRAWL_MAX_ATTEMPTS", 3u32)?)
            .with_concurrency(parse("CRAWL_CONCURRENCY", 20usize)?)
            .with_timeout(Duration::from_secs(parse("CRAWL_TIMEOUT_SECS", 30u64)?));
        if let Some(submitter) = var("SEED_SUBMITTER") {
            crawl = crawl.with_submitter(submitter);
        }

        let mut seed = SeedConfig::default()
            .with_upload_retries(parse("SEED_UPLOAD_RETRIES", 3u32)?)
            .with_batch_size(parse("SEED_BATCH_SIZE", 50usize)?);
        if let Some(bucket) = var("SEED_BUCKET") {
            seed = seed.with_bucket(bucket);
        }
        if let Some(path) = var("SEED_PLACEHOLDER_IMAGE") {
            seed = seed.with_placeholder(path);
        }
        if let Some(owner) = var("SEED_ADMIN_ID") {
            let owner = Uuid::parse_str(&owner).context("SEED_ADMIN_ID must be a valid UUID")?;
            seed = seed.with_owner(owner);
        }

        let storage = match (var("SUPABASE_URL"), var("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(url), Some(key)) => Some(StorageConfig {
                url,
                service_key: ApiKey::new(key),
            }),
            _ => None,
        };

        Ok(Self {
            data_dir: var("SEED_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            llm,
            enrich,
            crawl,
            seed,
            storage,
            database_url: var("DATABASE_URL"),
        })
    }

    pub fn llm(&self) -> Result<&LlmConfig> {
        self.llm
            .as_ref()
            .context("No model provider configured: set ANTHROPIC_API_KEY or OPENAI_API_KEY")
    }

    pub fn storage(&self) -> Result<&StorageConfig> {
        self.storage
            .as_ref()
            .context("SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must be set")
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().context("DATABASE_URL must be set")
    }
}

/// Pick the provider once: an explicit choice wins, then whichever key is
/// present, Anthropic first.
pub fn resolve_provider(
    explicit: Option<&str>,
    has_anthropic: bool,
    has_openai: bool,
) -> Result<Option<Provider>> {
    if let Some(name) = explicit {
        let provider = Provider::from_str(name).map_err(|e| anyhow!("LLM_PROVIDER: {}", e))?;
        return Ok(Some(provider));
    }
    Ok(match (has_anthropic, has_openai) {
        (true, _) => Some(Provider::Anthropic),
        (false, true) => Some(Provider::OpenAI),
        (false, false) => None,
    })
}

/// Non-empty value of `key`.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} is invalid ({:?}): {}", key, raw, e)),
        None => Ok(default),
    }
}

/// Read seed URLs from a file: one per line, blank lines and `#` comment
/// lines skipped.
pub fn read_url_file(contents: &str) -> Result<Vec<String>> {
    let urls: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    if urls.is_empty() {
        bail!("URL file contains no URLs");
    }
    Ok(urls)
}
