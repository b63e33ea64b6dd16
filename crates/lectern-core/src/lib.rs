//! Core traits and types for Lectern
//!
//! This crate defines the capability-facing interfaces used across Lectern:
//! LLM providers, embedders, vector stores, retrievers and answer classifiers.
//! Keeping them here lets the pipeline run against deterministic stubs in tests.

pub mod llm;
pub mod embedding;
pub mod rag;
pub mod vector_store;
pub mod error;
pub mod types;


pub use error::{Error, Result};
pub use llm::{LLMProvider, GenerationConfig, GenerationResult, DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE};
pub use embedding::Embedder;
pub use rag::{
    Answer, AnswerClassifier, MatchPolicy, RAGQuery, RAGResult, Retriever, FALLBACK_NOTICE,
};
pub use vector_store::{VectorStore, VectorDocument, ScoredChunk, SearchResult, SearchConfig};
pub use types::*;
