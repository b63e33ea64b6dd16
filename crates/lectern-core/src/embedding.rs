//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding providers
///
/// Every vector returned by one embedder has the same dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning one vector per input in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Get the embedding model ID
    fn model_id(&self) -> &str;
}
