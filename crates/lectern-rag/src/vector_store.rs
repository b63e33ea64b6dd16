//! Session-scoped vector store

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

use lectern_core::{
    VectorStore, VectorDocument, ScoredChunk, SearchResult, SearchConfig,
    Error, Result,
};

const SNAPSHOT_FILE: &str = "index.json";

#[derive(Default)]
struct StoreState {
    documents: Vec<VectorDocument>,
    dimension: Option<usize>,
}

/// In-memory cosine-similarity index owned by one transcript session
///
/// The store owns a private temporary directory holding a JSON snapshot of
/// its entries. `close()` removes that directory; dropping the store does
/// the same.
pub struct SessionVectorStore {
    session_id: String,
    state: RwLock<StoreState>,
    backing_dir: Mutex<Option<TempDir>>,
}

impl SessionVectorStore {
    /// Create a new store with a fresh session id
    pub fn new() -> Result<Self> {
        Self::with_session_id(Uuid::new_v4().to_string())
    }

    /// Create a new store whose backing directory lives under `parent`
    pub fn in_dir(parent: &Path) -> Result<Self> {
        Self::allocate(Uuid::new_v4().to_string(), Some(parent))
    }

    /// Create a new store for the given session id
    pub fn with_session_id(session_id: impl Into<String>) -> Result<Self> {
        Self::allocate(session_id.into(), None)
    }

    fn allocate(session_id: String, parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("lectern-index-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };

        debug!(session_id = %session_id, dir = %dir.path().display(), "Allocated session index");

        Ok(Self {
            session_id,
            state: RwLock::new(StoreState::default()),
            backing_dir: Mutex::new(Some(dir)),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Directory backing this store, or None once closed
    pub fn backing_dir(&self) -> Option<PathBuf> {
        self.backing_dir
            .lock()
            .ok()
            .and_then(|dir| dir.as_ref().map(|d| d.path().to_path_buf()))
    }

    /// Path of the JSON snapshot inside the backing directory
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.backing_dir().map(|dir| dir.join(SNAPSHOT_FILE))
    }

    fn ensure_open(&self) -> Result<PathBuf> {
        self.backing_dir().ok_or(Error::SessionClosed)
    }

    /// Simple cosine similarity calculation
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    fn lock_error<T>(e: T) -> Error
    where
        T: std::fmt::Display,
    {
        Error::VectorStore(format!("Lock error: {}", e))
    }

    /// Write the current entries to the snapshot file
    async fn persist(&self, dir: PathBuf) -> Result<()> {
        let bytes = {
            let state = self.state.read().map_err(Self::lock_error)?;
            serde_json::to_vec(&state.documents)?
        };

        tokio::fs::write(dir.join(SNAPSHOT_FILE), bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for SessionVectorStore {
    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let dir = self.ensure_open()?;

        let ids = {
            let mut state = self.state.write().map_err(Self::lock_error)?;

            let mut dimension = state.dimension;
            for document in &documents {
                let len = document.embedding.len();
                if len == 0 {
                    return Err(Error::VectorStore(format!(
                        "Document {} has an empty embedding",
                        document.id
                    )));
                }
                match dimension {
                    Some(expected) if expected != len => {
                        return Err(Error::VectorStore(format!(
                            "Embedding dimension mismatch for {}: expected {}, got {}",
                            document.id, expected, len
                        )));
                    }
                    _ => dimension = Some(len),
                }
            }

            state.dimension = dimension;
            let ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();
            state.documents.extend(documents);
            ids
        };

        self.persist(dir).await?;
        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        self.ensure_open()?;
        let state = self.state.read().map_err(Self::lock_error)?;

        if let Some(expected) = state.dimension {
            if expected != vector.len() {
                return Err(Error::VectorStore(format!(
                    "Query dimension mismatch: expected {}, got {}",
                    expected,
                    vector.len()
                )));
            }
        }

        let mut results: Vec<ScoredChunk> = state
            .documents
            .iter()
            .map(|doc| ScoredChunk {
                chunk: doc.chunk.clone(),
                score: Self::cosine_similarity(vector, &doc.embedding),
            })
            .filter(|scored| match config.score_threshold {
                Some(threshold) => scored.score >= threshold,
                None => true,
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(config.top_k);

        let total = results.len();

        Ok(SearchResult {
            chunks: results,
            total,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<VectorDocument>> {
        self.ensure_open()?;
        let state = self.state.read().map_err(Self::lock_error)?;
        Ok(state.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_open()?;
        let state = self.state.read().map_err(Self::lock_error)?;
        Ok(state.documents.len())
    }

    fn dimension(&self) -> Option<usize> {
        self.state.read().ok().and_then(|state| state.dimension)
    }

    async fn close(&self) -> Result<()> {
        let dir = {
            let mut guard = self.backing_dir.lock().map_err(Self::lock_error)?;
            guard.take()
        };

        if let Ok(mut state) = self.state.write() {
            state.documents.clear();
        }

        match dir {
            Some(dir) => {
                debug!(session_id = %self.session_id, "Removing session index");
                dir.close()?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.backing_dir
            .lock()
            .map(|dir| dir.is_some())
            .unwrap_or(false)
    }
}
