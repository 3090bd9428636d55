//! Index mapping for the movies index.
//!
//! Text fields get a `keyword` sub-field for exact matching; the `v_*`
//! fields are `knn_vector` so the index can serve nearest-neighbor queries.

use serde_json::{json, Value};

/// Body for an index-create request with knn enabled and the movie mapping.
pub fn index_body(dim: usize) -> Value {
    json!({
        "settings": {
            "index.knn": true
        },
        "mappings": {
            "properties": {
                "title": {
                    "type": "text",
                    "fields": { "keyword": { "type": "keyword" } }
                },
                "plot": { "type": "text" },
                "v_title": {
                    "type": "knn_vector",
                    "dimension": dim
                },
                "v_plot": {
                    "type": "knn_vector",
                    "dimension": dim
                }
            }
        }
    })
}
