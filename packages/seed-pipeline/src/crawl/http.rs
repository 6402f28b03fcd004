//! Plain HTTP page scraper.
//!
//! Fetches the page with reqwest and reads metadata with the `scraper`
//! crate. No JavaScript rendering, so client-rendered pages yield only
//! what their static HTML carries.

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{CrawlError, CrawlResult};
use crate::traits::scraper::PageScraper;
use crate::types::config::CrawlConfig;
use crate::types::record::RawRecord;

/// Used when the page has no meta description.
pub const NO_DESCRIPTION: &str = "No Description";

/// Used when the page has no image at all.
pub const DEFAULT_LOGO: &str = "./icon.png";

/// Scraper over reqwest.
pub struct HttpScraper {
    client: reqwest::Client,
    submitted_by: String,
    description_limit: usize,
}

impl HttpScraper {
    pub fn new(config: &CrawlConfig) -> CrawlResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| CrawlError::Http(e.to_string()))?;

        Ok(Self {
            client,
            submitted_by: config.submitted_by.clone(),
            description_limit: config.description_limit,
        })
    }

    async fn fetch_html(&self, url: &Url) -> CrawlResult<String> {
        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::Timeout {
                    url: url.to_string(),
                }
            } else {
                CrawlError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| CrawlError::Http(e.to_string()))
    }
}

#[async_trait]
impl PageScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> CrawlResult<RawRecord> {
        let parsed = Url::parse(url).map_err(|_| CrawlError::InvalidUrl {
            url: url.to_string(),
        })?;

        let html = self.fetch_html(&parsed).await?;
        debug!(url = %parsed, bytes = html.len(), "Fetched page");

        Ok(extract_record(&parsed, &html, &self.submitted_by, self.description_limit))
    }
}

/// Build a raw record from a page's HTML.
pub fn extract_record(
    page_url: &Url,
    html: &str,
    submitted_by: &str,
    description_limit: usize,
) -> RawRecord {
    let document = Html::parse_document(html);

    let title = first_text(&document, "title").unwrap_or_default();
    let identifier = if title.is_empty() {
        slugify(page_url.host_str().unwrap_or_default())
    } else {
        slugify(&title)
    };

    let description = meta_content(&document, "meta[name='description']")
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let description: String = description.chars().take(description_limit).collect();

    let logo = meta_content(&document, "meta[property='og:image']")
        .or_else(|| meta_content(&document, "meta[name='twitter:image']"))
        .or_else(|| attr(&document, "img", "src"))
        .unwrap_or_else(|| DEFAULT_LOGO.to_string());

    let headings: Vec<String> = ["h1", "h2", "h3"]
        .iter()
        .flat_map(|tag| all_text(&document, tag))
        .collect();

    RawRecord {
        identifier,
        source_url: page_url.to_string(),
        short_title: title,
        short_description: description,
        extracted_text: headings.join(" "),
        logo_url: resolve_logo(page_url, &logo),
        submitted_by: submitted_by.to_string(),
    }
}

/// Whitespace runs become `-`, then lowercase.
pub fn slugify(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase()
}

/// Absolute logo URL, resolving relative paths against the page.
pub fn resolve_logo(page_url: &Url, logo: &str) -> String {
    if logo.starts_with("http") {
        return logo.to_string();
    }
    page_url
        .join(logo)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| logo.to_string())
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

fn all_text(document: &Html, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn attr(document: &Html, css: &str, name: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(name))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    attr(document, css, "content")
}
