//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Chunk, Result};

/// A chunk stored in the vector store together with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A chunk returned by a similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Search result from vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunks: Vec<ScoredChunk>,
    pub total: usize,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: None,
        }
    }
}

/// Trait for vector stores
///
/// A store is scoped to one transcript session. Results are ordered by
/// descending score, ties resolved by insertion order.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store multiple documents in insertion order
    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>>;

    /// Search using a query embedding
    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult>;

    /// Get a document by ID
    async fn get(&self, id: &str) -> Result<Option<VectorDocument>>;

    /// Get the total number of documents
    async fn count(&self) -> Result<usize>;

    /// Embedding dimension fixed by the first stored document
    fn dimension(&self) -> Option<usize>;

    /// Release the store and any backing storage
    async fn close(&self) -> Result<()>;

    /// Check whether the store still accepts operations
    fn is_open(&self) -> bool;
}
