//! CMS Content Client
//!
//! Fetches typed content from the headless CMS REST API. Global lookups
//! (site config, FAQ categories) sit behind a Moka cache with a 5 minute TTL;
//! pages get a shorter TTL so editorial changes show up quickly.
//!
//! Absent content is `Ok(None)` / an empty list, never an error.

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::content::types::{flatten_entry, FaqCategory, FaqItem, Page, SiteConfig};
use crate::contact::ContactSubmission;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("CMS request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("CMS responded with status {0}")]
    Status(u16),

    #[error("CMS payload could not be decoded: {0}")]
    Decode(String),
}

/// Everything the site reads from (or writes to) the CMS.
///
/// The HTTP implementation is [`CmsClient`]; tests substitute an in-process fake.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get_page(&self, slug: &str) -> Result<Option<Page>, ContentError>;

    async fn get_faq_categories(&self) -> Result<Vec<FaqCategory>, ContentError>;

    /// FAQ items, optionally restricted to one category slug.
    async fn get_faq_items(&self, category: Option<&str>) -> Result<Vec<FaqItem>, ContentError>;

    async fn get_site_config(&self) -> Result<Option<SiteConfig>, ContentError>;

    /// Create a contact message. The CMS lifecycle hook sends the notification e-mail.
    async fn submit_contact(&self, submission: &ContactSubmission) -> Result<(), ContentError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

const SITE_CONFIG_KEY: &str = "site-config";
const FAQ_CATEGORIES_KEY: &str = "faq-categories";

pub struct CmsClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    pages: Cache<String, Option<Page>>,
    site_config: Cache<&'static str, Option<SiteConfig>>,
    faq_categories: Cache<&'static str, Vec<FaqCategory>>,
}

impl CmsClient {
    pub fn new(base_url: &str, api_token: Option<String>, timeout: Duration) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let pages = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(60))
            .build();

        let site_config = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300))
            .build();

        let faq_categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300))
            .build();

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            pages,
            site_config,
            faq_categories,
        })
    }

    /// GET a CMS path. A 404 is reported as `Ok(None)`.
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>, ContentError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url).query(query);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let start = std::time::Instant::now();
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("CMS GET {} -> {} in {:?}", path, status, start.elapsed());

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes).map_err(|e| ContentError::Decode(e.to_string()))?;
        Ok(Some(value))
    }

    /// GET a collection and decode every entry of its `data` array.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ContentError> {
        let body = match self.fetch(path, query).await? {
            Some(body) => body,
            None => return Ok(Vec::new()),
        };
        decode_list(body)
    }
}

/// Decode `{ "data": [ ... ] }` into typed entries. Entries that do not
/// decode are skipped with a warning; the rest of the list survives.
pub(crate) fn decode_list<T: DeserializeOwned>(mut body: Value) -> Result<Vec<T>, ContentError> {
    let entries = match body.get_mut("data").map(Value::take) {
        Some(Value::Array(entries)) => entries,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(_) => return Err(ContentError::Decode("`data` is not an array".to_string())),
    };

    let decoded = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(flatten_entry(entry)) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping undecodable CMS entry");
                None
            }
        })
        .collect();
    Ok(decoded)
}

/// Decode `{ "data": { ... } }` into a single typed entry.
pub(crate) fn decode_single<T: DeserializeOwned>(mut body: Value) -> Result<Option<T>, ContentError> {
    match body.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => Ok(None),
        Some(entry) => serde_json::from_value(flatten_entry(entry))
            .map(Some)
            .map_err(|e| ContentError::Decode(e.to_string())),
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn get_page(&self, slug: &str) -> Result<Option<Page>, ContentError> {
        if let Some(cached) = self.pages.get(slug).await {
            tracing::debug!("Cache hit for page {}", slug);
            return Ok(cached);
        }

        let pages: Vec<Page> = self
            .fetch_list(
                "/api/pages",
                &[
                    ("filters[slug][$eq]", slug),
                    ("populate", "deep"),
                    ("pagination[pageSize]", "1"),
                ],
            )
            .await?;

        let page = pages.into_iter().next();
        self.pages.insert(slug.to_string(), page.clone()).await;
        Ok(page)
    }

    async fn get_faq_categories(&self) -> Result<Vec<FaqCategory>, ContentError> {
        if let Some(cached) = self.faq_categories.get(FAQ_CATEGORIES_KEY).await {
            return Ok(cached);
        }

        let categories: Vec<FaqCategory> = self
            .fetch_list("/api/faq-categories", &[("sort", "order:asc")])
            .await?;

        self.faq_categories.insert(FAQ_CATEGORIES_KEY, categories.clone()).await;
        Ok(categories)
    }

    async fn get_faq_items(&self, category: Option<&str>) -> Result<Vec<FaqItem>, ContentError> {
        let mut query = vec![
            ("sort", "order:asc"),
            ("populate", "category"),
            ("pagination[pageSize]", "200"),
        ];
        if let Some(slug) = category {
            query.push(("filters[category][slug][$eq]", slug));
        }
        self.fetch_list("/api/faqs", &query).await
    }

    async fn get_site_config(&self) -> Result<Option<SiteConfig>, ContentError> {
        if let Some(cached) = self.site_config.get(SITE_CONFIG_KEY).await {
            return Ok(cached);
        }

        let config = match self.fetch("/api/site-config", &[("populate", "deep")]).await? {
            Some(body) => decode_single(body)?,
            None => None,
        };

        self.site_config.insert(SITE_CONFIG_KEY, config.clone()).await;
        Ok(config)
    }

    async fn submit_contact(&self, submission: &ContactSubmission) -> Result<(), ContentError> {
        let url = format!("{}/api/contact-messages", self.base_url);
        let mut request = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "data": submission }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status.as_u16()));
        }
        Ok(())
    }
}
