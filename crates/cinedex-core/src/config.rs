//! Configuration loading and the settings struct threaded through the loader.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! `LoadSettings` is built once at startup and passed explicitly; nothing in
//! the pipeline reads the environment ad hoc.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Everything the loader needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    /// Search service base URL, e.g. `http://localhost:9200`.
    pub endpoint: String,
    /// Service region, reported at startup for operator sanity.
    pub region: String,
    /// Destination index name.
    pub index: String,
    /// Documents per bulk request.
    pub batch_size: usize,
    /// Embedding dimensionality (D).
    pub dim: usize,
    /// Embedding provider base URL (OpenAI-compatible).
    pub embed_endpoint: String,
    /// Embedding model identifier.
    pub embed_model: String,
    /// Bearer token for the embedding provider, if required.
    pub embed_api_key: Option<String>,
    /// Retry budget for transient provider/index failures.
    pub max_retries: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

pub const DEFAULT_BATCH_SIZE: usize = 11;
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;
pub const DEFAULT_MAX_RETRIES: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl LoadSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint: String = config
            .get("endpoint")
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let region: String = config
            .get("region")
            .unwrap_or_else(|_| "us-east-1".to_string());
        let index: String = config
            .get("index")
            .unwrap_or_else(|_| "movies".to_string());
        let settings = Self {
            endpoint,
            region,
            index,
            batch_size: config.get("loader.batch_size").unwrap_or(DEFAULT_BATCH_SIZE),
            dim: config.get("embedding.dim").unwrap_or(DEFAULT_EMBEDDING_DIM),
            embed_endpoint: config
                .get("embedding.endpoint")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            embed_model: config
                .get("embedding.model")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            embed_api_key: config.get("embedding.api_key").ok(),
            max_retries: config.get("loader.max_retries").unwrap_or(DEFAULT_MAX_RETRIES),
            timeout_secs: config.get("loader.timeout_secs").unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Settings pointed at a local dev stack, used by tests and examples.
    pub fn default_local() -> Self {
        Self {
            endpoint: "http://localhost:9200".to_string(),
            region: "us-east-1".to_string(),
            index: "movies".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            dim: DEFAULT_EMBEDDING_DIM,
            embed_endpoint: "https://api.openai.com/v1".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            embed_api_key: None,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Re-check the invariants after any override (CLI flags included).
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig("endpoint must not be empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("loader.batch_size must be >= 1".to_string()));
        }
        if self.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
