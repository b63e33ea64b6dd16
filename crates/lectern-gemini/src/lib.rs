//! Google Gemini integration for Lectern
//!
//! This crate provides the Gemini implementation of the LLMProvider and
//! Embedder traits over the generateContent and embedContent REST endpoints.

mod client;
mod config;


pub use client::GeminiClient;
pub use config::{GeminiConfig, DEFAULT_API_URL, DEFAULT_EMBEDDING_MODEL};

// Re-export core types for convenience
pub use lectern_core::{
    Embedder, LLMProvider, GenerationConfig, GenerationResult, Error, Result,
};
