// ABOUTME: Blocking HTTP client for the dev.to articles API
// ABOUTME: Lists, creates, and updates articles; maps failures to RemoteError

use crate::error::RemoteError;
use crate::model::{Article, Published, RemoteArticle};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://dev.to";
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_SIZE: u32 = 200;

/// Where articles are published.
pub trait ArticleStore {
    /// Every article on the account, de-duplicated by title.
    fn list_all(&self) -> Result<Vec<RemoteArticle>, RemoteError>;
    fn create(&self, article: &Article) -> Result<Published, RemoteError>;
    fn update(&self, id: u64, article: &Article) -> Result<Published, RemoteError>;
}

pub(crate) fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

/// Sends a prepared request and decodes a 200/201 JSON response.
pub(crate) fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
    let response = request.send()?;

    let status = response.status().as_u16();
    if !matches!(status, 200 | 201) {
        let message = response.text().unwrap_or_default();
        return Err(RemoteError::from_status(status, truncate_str(&message, 200)));
    }

    Ok(response.json()?)
}

pub struct DevtoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DevtoClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(DevtoClient {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_API_BASE.into())
                .trim_end_matches('/')
                .to_string(),
            api_key,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .header("User-Agent", "devto-sync/0.2 (Rust)")
    }

    fn article_payload(article: &Article) -> Result<serde_json::Value, RemoteError> {
        let document = article
            .to_document()
            .map_err(|e| RemoteError::BadRequest(format!("could not serialize article: {}", e)))?;
        Ok(json!({ "article": { "body_markdown": document } }))
    }
}

impl ArticleStore for DevtoClient {
    fn list_all(&self) -> Result<Vec<RemoteArticle>, RemoteError> {
        let mut articles: Vec<RemoteArticle> = Vec::new();
        let mut by_title: HashMap<String, usize> = HashMap::new();
        let mut page = 1u32;

        loop {
            let request = self
                .client
                .get(self.url("/api/articles/me/all"))
                .query(&[("page", page), ("per_page", PAGE_SIZE)]);
            let batch: Vec<RemoteArticle> = send_json(self.with_headers(request))?;
            debug!(page, count = batch.len(), "fetched article page");

            if batch.is_empty() {
                break;
            }

            for article in batch {
                match by_title.get(&article.title) {
                    Some(&idx) => articles[idx] = article,
                    None => {
                        by_title.insert(article.title.clone(), articles.len());
                        articles.push(article);
                    }
                }
            }
            page += 1;
        }

        Ok(articles)
    }

    fn create(&self, article: &Article) -> Result<Published, RemoteError> {
        let request = self
            .client
            .post(self.url("/api/articles"))
            .json(&Self::article_payload(article)?);
        send_json(self.with_headers(request))
    }

    fn update(&self, id: u64, article: &Article) -> Result<Published, RemoteError> {
        let request = self
            .client
            .put(self.url(&format!("/api/articles/{}", id)))
            .json(&Self::article_payload(article)?);
        send_json(self.with_headers(request))
    }
}
