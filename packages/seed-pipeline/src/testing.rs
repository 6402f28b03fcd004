//! Testing utilities including mock implementations.
//!
//! These let applications (and this crate's own tests) drive the whole
//! pipeline without model calls, network access or a database.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use ai_client::SchemaSpec;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::error::{
    CrawlError, CrawlResult, GenerationError, GenerationResult, SeedError, SeedResult,
};
use crate::traits::model::ModelClient;
use crate::traits::scraper::PageScraper;
use crate::traits::storage::{Catalog, ImageFetcher, ObjectStore, TaxonomyTable};
use crate::types::record::{ProductRow, RawRecord};

/// What a mock model answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(Value),
    /// Fails with [`GenerationError::Backend`].
    Fail(String),
    /// Sleeps this long, then answers `{}`.
    Hang(Duration),
}

impl MockReply {
    pub fn json(value: Value) -> Self {
        MockReply::Json(value)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        MockReply::Fail(message.into())
    }
}

/// Record of a call made to the mock model.
#[derive(Debug, Clone)]
pub struct MockModelCall {
    pub schema: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
struct PromptRule {
    schema: String,
    needle: String,
    reply: MockReply,
}

/// A mock model with scripted replies.
///
/// Replies are looked up in order:
/// 1. rules matching the schema name and a prompt substring
/// 2. one-shot replies queued for the schema
/// 3. the schema's default reply
///
/// With none of those, the call fails.
#[derive(Default)]
pub struct MockModel {
    name: String,
    rules: Arc<RwLock<Vec<PromptRule>>>,
    queued: Arc<RwLock<HashMap<String, VecDeque<MockReply>>>>,
    defaults: Arc<RwLock<HashMap<String, MockReply>>>,
    calls: Arc<RwLock<Vec<MockModelCall>>>,
}

impl MockModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Answer every call for `schema` with `value`.
    pub fn with_reply(self, schema: impl Into<String>, value: Value) -> Self {
        self.defaults
            .write()
            .unwrap()
            .insert(schema.into(), MockReply::Json(value));
        self
    }

    /// Fail every call for `schema`.
    pub fn with_failure(self, schema: impl Into<String>, message: impl Into<String>) -> Self {
        self.defaults
            .write()
            .unwrap()
            .insert(schema.into(), MockReply::Fail(message.into()));
        self
    }

    /// Answer calls for `schema` whose prompt contains `needle`.
    pub fn when_prompt_contains(
        self,
        schema: impl Into<String>,
        needle: impl Into<String>,
        reply: MockReply,
    ) -> Self {
        self.rules.write().unwrap().push(PromptRule {
            schema: schema.into(),
            needle: needle.into(),
            reply,
        });
        self
    }

    /// Queue a reply used once, before the default.
    pub fn then(self, schema: impl Into<String>, reply: MockReply) -> Self {
        self.queued
            .write()
            .unwrap()
            .entry(schema.into())
            .or_default()
            .push_back(reply);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockModelCall> {
        self.calls.read().unwrap().clone()
    }

    /// Calls made for one schema.
    pub fn calls_for(&self, schema: &str) -> Vec<MockModelCall> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.schema == schema)
            .cloned()
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn pick(&self, schema: &str, prompt: &str) -> Option<MockReply> {
        let rule = self
            .rules
            .read()
            .unwrap()
            .iter()
            .find(|r| r.schema == schema && prompt.contains(&r.needle))
            .map(|r| r.reply.clone());
        if rule.is_some() {
            return rule;
        }

        let queued = self
            .queued
            .write()
            .unwrap()
            .get_mut(schema)
            .and_then(VecDeque::pop_front);
        if queued.is_some() {
            return queued;
        }

        self.defaults.read().unwrap().get(schema).cloned()
    }
}

#[async_trait]
impl ModelClient for MockModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn generate_value(&self, schema: &SchemaSpec, prompt: &str) -> GenerationResult<Value> {
        self.calls.write().unwrap().push(MockModelCall {
            schema: schema.name.clone(),
            prompt: prompt.to_string(),
        });

        match self.pick(&schema.name, prompt) {
            Some(MockReply::Json(value)) => Ok(value),
            Some(MockReply::Fail(message)) => Err(GenerationError::Backend {
                model: self.name.clone(),
                message,
            }),
            Some(MockReply::Hang(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(json!({}))
            }
            None => Err(GenerationError::Backend {
                model: self.name.clone(),
                message: format!("no mock reply for {}", schema.name),
            }),
        }
    }
}

/// A mock scraper serving predefined records.
#[derive(Default)]
pub struct MockScraper {
    pages: Arc<RwLock<HashMap<String, RawRecord>>>,

    /// Remaining failures per URL before it starts succeeding
    flaky: Arc<RwLock<HashMap<String, u32>>>,

    calls: Arc<RwLock<Vec<String>>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `record` for its `source_url`.
    pub fn with_page(self, record: RawRecord) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(record.source_url.clone(), record);
        self
    }

    /// Fail the first `times` requests for `url`.
    pub fn fail_times(self, url: impl Into<String>, times: u32) -> Self {
        self.flaky.write().unwrap().insert(url.into(), times);
        self
    }

    /// URLs requested, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageScraper for MockScraper {
    async fn scrape(&self, url: &str) -> CrawlResult<RawRecord> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(remaining) = self.flaky.write().unwrap().get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(CrawlError::Http("mock connection refused".to_string()));
            }
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| CrawlError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// In-memory object store.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<IndexMap<String, Vec<u8>>>>,
    uploads: Arc<RwLock<Vec<String>>>,
    failing: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .unwrap()
            .get(&format!("{}/{}", bucket, key))
            .cloned()
    }

    /// Upload attempts as `bucket/key`, including failed ones.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.read().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> SeedResult<()> {
        let path = format!("{}/{}", bucket, key);
        self.uploads.write().unwrap().push(path.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(SeedError::Upload {
                key: key.to_string(),
                reason: "mock storage unavailable".to_string(),
            });
        }

        self.objects.write().unwrap().insert(path, bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("memory://{}/{}", bucket, key)
    }
}

/// In-memory image source.
#[derive(Default)]
pub struct MemoryImageFetcher {
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    flaky: Arc<RwLock<HashMap<String, u32>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MemoryImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.write().unwrap().insert(url.into(), bytes);
        self
    }

    /// Fail the first `times` fetches of `url`.
    pub fn fail_times(self, url: impl Into<String>, times: u32) -> Self {
        self.flaky.write().unwrap().insert(url.into(), times);
        self
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl ImageFetcher for MemoryImageFetcher {
    async fn fetch(&self, url: &str) -> SeedResult<Vec<u8>> {
        self.calls.write().unwrap().push(url.to_string());

        if let Some(remaining) = self.flaky.write().unwrap().get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SeedError::Fetch {
                    url: url.to_string(),
                    reason: "mock timeout".to_string(),
                });
            }
        }

        self.images
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| SeedError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404".to_string(),
            })
    }
}

/// In-memory catalog.
#[derive(Default)]
pub struct MemoryCatalog {
    entities: Arc<RwLock<HashMap<TaxonomyTable, Vec<String>>>>,
    products: Arc<RwLock<IndexMap<String, ProductRow>>>,
    batches: Arc<RwLock<Vec<usize>>>,

    /// 1-based upsert calls that should fail
    failing_batches: Arc<RwLock<HashSet<usize>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th upsert call (1-based).
    pub fn fail_batch(self, n: usize) -> Self {
        self.failing_batches.write().unwrap().insert(n);
        self
    }

    pub fn entities(&self, table: TaxonomyTable) -> Vec<String> {
        self.entities
            .read()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn product(&self, codename: &str) -> Option<ProductRow> {
        self.products.read().unwrap().get(codename).cloned()
    }

    pub fn products(&self) -> Vec<ProductRow> {
        self.products.read().unwrap().values().cloned().collect()
    }

    /// Row count of every upsert call, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.read().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn ensure_entity(&self, table: TaxonomyTable, name: &str) -> SeedResult<()> {
        let mut entities = self.entities.write().unwrap();
        let names = entities.entry(table).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        Ok(())
    }

    async fn upsert_products(&self, rows: &[ProductRow]) -> SeedResult<()> {
        let call = {
            let mut batches = self.batches.write().unwrap();
            batches.push(rows.len());
            batches.len()
        };

        if self.failing_batches.read().unwrap().contains(&call) {
            return Err(SeedError::Catalog(format!("mock batch {} rejected", call)));
        }

        let mut products = self.products.write().unwrap();
        for row in rows {
            products.insert(row.codename.clone(), row.clone());
        }
        Ok(())
    }
}

/// A raw record with a title, description and logo derived from `id`.
pub fn sample_raw_record(id: &str) -> RawRecord {
    RawRecord::new(id, format!("https://{}.example.com/", id))
        .with_title(format!("{} title", id))
        .with_description(format!("{} is a tool for building things.", id))
        .with_text(format!("Build with {}. Ship faster.", id))
        .with_logo(format!("https://{}.example.com/logo.png", id))
        .with_submitter("seed-admin-user")
}

/// A "details" reply.
pub fn details_json(codename: &str, punchline: &str, description: &str) -> Value {
    json!({
        "codename": codename,
        "punchline": punchline,
        "description": description,
    })
}

/// A "filters" reply.
pub fn filters_json(category: &str, tags: &[&str], labels: &[&str]) -> Value {
    json!({
        "category": category,
        "tags": tags,
        "labels": labels,
    })
}

/// A label/tag repair reply.
pub fn fix_json(tags: &[&str], labels: &[&str]) -> Value {
    json!({
        "tags": tags,
        "labels": labels,
    })
}

/// A full enrichment reply.
pub fn candidate_json(codename: &str, category: &str, tags: &[&str], labels: &[&str]) -> Value {
    json!({
        "category": category,
        "tags": tags,
        "labels": labels,
        "codename": codename,
        "punchline": format!("{} punchline", codename),
        "description": format!("{} description", codename),
    })
}
