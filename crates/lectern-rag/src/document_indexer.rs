//! Embeds chunks and stores them in a vector store

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use lectern_core::{Chunk, Embedder, Error, Result, VectorDocument, VectorStore};

/// Result of an indexing operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingResult {
    pub chunks_indexed: usize,
    pub dimension: Option<usize>,
}

/// Chunk indexer that works with any Embedder and VectorStore
pub struct ChunkIndexer<E: Embedder, V: VectorStore> {
    embedder: Arc<E>,
    vector_store: Arc<V>,
}

impl<E: Embedder, V: VectorStore> ChunkIndexer<E, V> {
    /// Create a new chunk indexer
    pub fn new(embedder: Arc<E>, vector_store: Arc<V>) -> Self {
        Self {
            embedder,
            vector_store,
        }
    }

    /// Embed every chunk and store them in chunk order
    pub async fn index_chunks(&self, chunks: &[Chunk]) -> Result<IndexingResult> {
        if chunks.is_empty() {
            return Ok(IndexingResult {
                chunks_indexed: 0,
                dimension: self.vector_store.dimension(),
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let documents: Vec<VectorDocument> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorDocument {
                id: format!("chunk-{}", chunk.index),
                chunk: chunk.clone(),
                embedding,
            })
            .collect();

        let ids = self.vector_store.store_batch(documents).await?;

        info!(
            chunks = ids.len(),
            model = self.embedder.model_id(),
            "Indexed transcript chunks"
        );

        Ok(IndexingResult {
            chunks_indexed: ids.len(),
            dimension: self.vector_store.dimension(),
        })
    }
}
