use crate::error::Result;
use crate::types::MovieDoc;

pub trait Embedder: Send + Sync {
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// Compute the embedding for one input text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

pub trait BulkWriter: Send + Sync {
    /// Submit one batch of enriched documents; returns the number indexed.
    fn bulk_write(&self, index: &str, docs: &[MovieDoc]) -> Result<usize>;
}
