//! Bulk payload assembly.
//!
//! The `_bulk` body is NDJSON: one freshly built action header per document
//! followed by the serialized document, with a trailing newline. Headers from
//! the input file are never reused; each one here carries the target index
//! and a deterministic `_id` so a rerun overwrites instead of duplicating.

use std::hash::{Hash, Hasher};

use serde_json::json;
use twox_hash::XxHash64;

use cinedex_core::error::{Error, Result};
use cinedex_core::types::MovieDoc;

/// Deterministic document id: a hash of the record content, vectors excluded.
/// Re-embedding identical text yields identical vectors, so hashing the
/// source fields alone is enough to keep reruns idempotent.
pub fn doc_id(doc: &MovieDoc) -> String {
    let mut hasher = XxHash64::with_seed(0);
    doc.title.hash(&mut hasher);
    if let Some(plot) = &doc.plot {
        plot.hash(&mut hasher);
    }
    for (key, value) in &doc.extra {
        key.hash(&mut hasher);
        value.to_string().hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

/// Render the NDJSON body for one batch.
pub fn render_payload(index: &str, docs: &[MovieDoc]) -> Result<String> {
    let mut body = String::new();
    for doc in docs {
        let action = json!({ "index": { "_index": index, "_id": doc_id(doc) } });
        body.push_str(&action.to_string());
        body.push('\n');
        let line = serde_json::to_string(doc)
            .map_err(|e| Error::Index(format!("failed to serialize document: {e}")))?;
        body.push_str(&line);
        body.push('\n');
    }
    Ok(body)
}
