//! Supabase Storage over its REST API, plus a plain HTTP image fetcher.

use std::time::Duration;

use ai_client::ApiKey;
use async_trait::async_trait;
use tracing::debug;

use crate::error::{SeedError, SeedResult};
use crate::traits::storage::{ImageFetcher, ObjectStore};

/// Cache lifetime set on uploaded objects, in seconds.
pub const CACHE_CONTROL_SECS: u32 = 3600;

/// Supabase Storage client.
pub struct SupabaseStorage {
    client: reqwest::Client,
    base_url: String,
    service_key: ApiKey,
}

impl SupabaseStorage {
    /// `base_url` is the project URL, e.g. `https://xyz.supabase.co`.
    pub fn new(base_url: impl Into<String>, service_key: impl Into<ApiKey>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> SeedResult<()> {
        let size = bytes.len();
        let response = self
            .client
            .post(self.object_url(bucket, key))
            .bearer_auth(self.service_key.expose())
            .header("apikey", self.service_key.expose())
            .header("x-upsert", "true")
            .header("cache-control", format!("max-age={}", CACHE_CONTROL_SECS))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| SeedError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SeedError::Upload {
                key: key.to_string(),
                reason: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        debug!(bucket, key, size, "Stored object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            urlencoding::encode(key)
        )
    }
}

/// Downloads images with reqwest.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> SeedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SeedError::Fetch {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> SeedResult<Vec<u8>> {
        let fetch_error = |reason: String| SeedError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        if bytes.is_empty() {
            return Err(fetch_error("empty body".to_string()));
        }
        Ok(bytes.to_vec())
    }
}
