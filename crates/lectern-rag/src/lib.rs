//! Transcript retrieval and answering for Lectern
//!
//! Chunks a transcript, indexes it in a session-scoped vector store and
//! answers questions against it, with a general-model fallback when the
//! transcript has nothing to say.

pub mod chunker;
pub mod classifier;
pub mod document_indexer;
pub mod engine;
pub mod pipeline;
pub mod vector_store;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests;

pub use chunker::{chunk_text, reassemble, TextChunker};
pub use classifier::{PhraseClassifier, NO_ANSWER_PHRASES};
pub use document_indexer::{ChunkIndexer, IndexingResult};
pub use engine::TranscriptSession;
pub use pipeline::{NotesPipeline, NOTES_INSTRUCTION};
pub use vector_store::SessionVectorStore;
