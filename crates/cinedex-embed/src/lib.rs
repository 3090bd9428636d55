//! Embedding providers.
//!
//! `RemoteEmbedder` talks to an OpenAI-compatible `/embeddings` endpoint with
//! a blocking client and capped exponential backoff for transient failures.
//! `FakeEmbedder` is a deterministic hash-based stand-in selected via
//! `APP_USE_FAKE_EMBEDDINGS=1` so tests never touch the network.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use cinedex_core::config::LoadSettings;
use cinedex_core::error::{Error, Result};
use cinedex_core::retry;
use cinedex_core::traits::Embedder;

pub struct RemoteEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dim: usize,
    max_retries: usize,
}

impl RemoteEmbedder {
    pub fn new(settings: &LoadSettings) -> Result<Self> {
        let api_key = settings
            .embed_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::InvalidConfig("embedding.api_key is required for the remote provider".to_string())
            })?;

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {api_key}");
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::InvalidConfig("embedding.api_key is not a valid header value".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Provider(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!("{}/embeddings", settings.embed_endpoint.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            model: settings.embed_model.clone(),
            dim: settings.dim,
            max_retries: settings.max_retries,
        })
    }
}

impl Embedder for RemoteEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut attempt = 0usize;
        loop {
            let request = EmbeddingRequest {
                model: &self.model,
                input: [text],
                dimensions: Some(self.dim),
            };
            match self.client.post(&self.endpoint).json(&request).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let mut parsed: EmbeddingResponse = resp
                            .json()
                            .map_err(|e| Error::Provider(format!("malformed embedding response: {e}")))?;
                        parsed.data.sort_by_key(|entry| entry.index);
                        let vector = parsed
                            .data
                            .into_iter()
                            .map(|entry| entry.embedding)
                            .next()
                            .ok_or_else(|| Error::Provider("provider returned no embedding".to_string()))?;
                        if vector.len() != self.dim {
                            return Err(Error::Provider(format!(
                                "dim mismatch: got {} expected {}",
                                vector.len(),
                                self.dim
                            )));
                        }
                        return Ok(vector);
                    }

                    let body = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
                    if retry::should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        thread::sleep(retry::backoff(attempt));
                        continue;
                    }
                    return Err(Error::Provider(format!(
                        "embedding request failed ({status}): {body}"
                    )));
                }
                Err(err) => {
                    if retry::is_retryable_error(&err) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        thread::sleep(retry::backoff(attempt));
                        continue;
                    }
                    return Err(Error::Provider(err.to_string()));
                }
            }
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Deterministic hash-bucket embedder. A pure function of the input text,
/// L2-normalized, any dimension.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

pub fn get_default_embedder(settings: &LoadSettings) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        println!("🧪 Using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(settings.dim)));
    }
    Ok(Box::new(RemoteEmbedder::new(settings)?))
}
