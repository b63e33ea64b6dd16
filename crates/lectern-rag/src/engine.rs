//! Transcript session: the retriever handle over one session index

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use lectern_core::{
    Embedder, Error, RAGQuery, RAGResult, Result, Retriever, SearchConfig, VectorStore,
};

use crate::vector_store::SessionVectorStore;

/// One transcript's index plus the fixed result count used to query it
///
/// Created by the notes pipeline and reused for every follow-up question on
/// the same transcript. Call `close()` when the session ends.
pub struct TranscriptSession<E: Embedder> {
    store: Arc<SessionVectorStore>,
    embedder: Arc<E>,
    top_k: usize,
    created_at: DateTime<Utc>,
}

impl<E: Embedder + 'static> TranscriptSession<E> {
    pub(crate) fn new(store: Arc<SessionVectorStore>, embedder: Arc<E>, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            top_k,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        self.store.session_id()
    }

    pub fn store(&self) -> &SessionVectorStore {
        &self.store
    }

    /// Retrieve using the session's own k
    pub async fn retrieve_for(&self, query: &str) -> Result<RAGResult> {
        let query = RAGQuery {
            query: query.to_string(),
            top_k: self.top_k,
        };
        self.retrieve(&query).await
    }

    /// Tear down the index and remove its backing storage
    pub async fn close(&self) -> Result<()> {
        self.store.close().await
    }
}

#[async_trait]
impl<E: Embedder + 'static> Retriever for TranscriptSession<E> {
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
        if !self.store.is_open() {
            return Err(Error::SessionClosed);
        }

        let vector = self.embedder.embed(&query.query).await?;
        let search_config = SearchConfig {
            top_k: query.top_k,
            score_threshold: None,
        };

        let search_result = self.store.search_by_vector(&vector, &search_config).await?;
        debug!(
            session_id = %self.id(),
            requested = query.top_k,
            returned = search_result.total,
            "Retrieved transcript chunks"
        );

        let context = self.build_context(&search_result.chunks);

        Ok(RAGResult {
            chunks: search_result.chunks,
            context,
        })
    }

    fn top_k(&self) -> usize {
        self.top_k
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        let count = self.store.count().await?;

        Ok(json!({
            "session_id": self.id(),
            "created_at": self.created_at.to_rfc3339(),
            "chunks": count,
            "top_k": self.top_k,
            "dimension": self.store.dimension(),
            "embedding_model": self.embedder.model_id(),
            "backing_dir": self.store.backing_dir().map(|d| d.display().to_string()),
        }))
    }

    fn is_ready(&self) -> bool {
        self.store.is_open()
    }
}
