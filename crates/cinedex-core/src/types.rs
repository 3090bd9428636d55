//! Domain types shared by the loader, embedder and index client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A movie record parsed from one line of the NDJSON source.
///
/// `title` is required, `plot` is optional. Every other field of the source
/// object (directors, genres, year, rating, ...) lands in `extra` and passes
/// through to the index unmodified. The `v_*` vector fields are absent on
/// input and injected by the loader before bulk write; `None` is skipped on
/// serialization so un-embedded fields never appear in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDoc {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_title: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_plot: Option<Vec<f32>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieDoc {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            plot: None,
            v_title: None,
            v_plot: None,
            extra: Map::new(),
        }
    }
}

/// Counters reported after a load run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data records read from the source (action headers excluded).
    pub records: usize,
    /// Bulk-action header lines recognized and discarded.
    pub headers_skipped: usize,
    /// Bulk requests issued, tail flush included.
    pub batches: usize,
    /// Documents acknowledged by the search service.
    pub indexed: usize,
}
