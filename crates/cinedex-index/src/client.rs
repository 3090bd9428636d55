//! Blocking REST client for the destination search service.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use cinedex_core::config::LoadSettings;
use cinedex_core::error::{Error, Result};
use cinedex_core::retry;
use cinedex_core::traits::BulkWriter;
use cinedex_core::types::MovieDoc;

use crate::bulk::render_payload;
use crate::mapping::index_body;

pub struct SearchClient {
    client: Client,
    base: String,
    max_retries: usize,
}

impl SearchClient {
    pub fn new(settings: &LoadSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Index(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: settings.endpoint.trim_end_matches('/').to_string(),
            max_retries: settings.max_retries,
        })
    }

    pub fn index_exists(&self, name: &str) -> Result<bool> {
        let url = format!("{}/{name}", self.base);
        let resp = self
            .client
            .head(&url)
            .send()
            .map_err(|e| Error::Index(format!("exists check failed: {e}")))?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::Index(format!("exists check returned {status}"))),
        }
    }

    pub fn create_index(&self, name: &str, dim: usize) -> Result<()> {
        let url = format!("{}/{name}", self.base);
        let resp = self
            .client
            .put(&url)
            .json(&index_body(dim))
            .send()
            .map_err(|e| Error::Index(format!("index create failed: {e}")))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
        Err(Error::Index(format!("index create returned {status}: {body}")))
    }

    /// Exists-check then create when missing. Returns true when created.
    pub fn ensure_index(&self, name: &str, dim: usize) -> Result<bool> {
        if self.index_exists(name)? {
            return Ok(false);
        }
        self.create_index(name, dim)?;
        Ok(true)
    }
}

impl BulkWriter for SearchClient {
    fn bulk_write(&self, index: &str, docs: &[MovieDoc]) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let payload = render_payload(index, docs)?;
        let url = format!("{}/_bulk", self.base);

        let mut attempt = 0usize;
        loop {
            let result = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(payload.clone())
                .send();
            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: BulkResponse = resp
                            .json()
                            .map_err(|e| Error::Index(format!("malformed bulk response: {e}")))?;
                        if parsed.errors {
                            return Err(Error::Index(first_item_error(&parsed.items)));
                        }
                        return Ok(docs.len());
                    }

                    let body = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
                    if retry::should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        thread::sleep(retry::backoff(attempt));
                        continue;
                    }
                    return Err(Error::Index(format!("bulk write returned {status}: {body}")));
                }
                Err(err) => {
                    if retry::is_retryable_error(&err) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        thread::sleep(retry::backoff(attempt));
                        continue;
                    }
                    return Err(Error::Index(err.to_string()));
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

fn first_item_error(items: &[Value]) -> String {
    for item in items {
        if let Some(error) = item.pointer("/index/error") {
            return format!("bulk item rejected: {error}");
        }
    }
    "bulk response flagged errors".to_string()
}
